//! Prop-schema validation and geometry coercion for UI control trees.
//!
//! Pipeline: a control's property bag is optionally coerced into canonical
//! geometry shapes ([`normalize`]), then validated against the control's
//! composed schema ([`registry::SchemaRegistry`]) which layers shared mixins
//! ([`mixins`]) under the catalog's base schema ([`compose`]).
pub mod catalog;
pub mod compose;
pub mod error;
pub mod mixins;
pub mod normalize;
pub mod path_de;
pub mod registry;
pub mod schema;
pub mod validate;
pub mod value;

pub use catalog::{Catalog, JsonCatalog, StaticCatalog};
pub use compose::compose;
pub use error::{CatalogError, CoercionError, ContractError, DepthExceeded, SchemaError, ValidationError, Violations};
pub use normalize::coerce_props;
pub use registry::SchemaRegistry;
pub use schema::{AdditionalPolicy, ObjectSchema, PrimitiveKind, SchemaNode};
pub use validate::{ensure_valid, validate, ValidationOptions, Validator};
pub use value::{PropertyBag, Value};
