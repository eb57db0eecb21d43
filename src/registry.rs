//! Per-control composed schemas and the validation entry points.
//!
//! A [`SchemaRegistry`] is built once around a [`Catalog`] and passed by
//! reference. Composed schemas are cached on first use; building happens
//! outside the lock and the first inserted schema wins, so concurrent
//! callers always observe the same `Arc`.
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::catalog::Catalog;
use crate::compose::compose;
use crate::error::{ContractError, ValidationError, Violations};
use crate::mixins;
use crate::normalize::coerce_props;
use crate::schema::SchemaNode;
use crate::validate::{ValidationOptions, Validator};
use crate::value::PropertyBag;

pub struct SchemaRegistry {
    catalog: Box<dyn Catalog>,
    cache: RwLock<HashMap<String, Arc<SchemaNode>>>,
    max_depth: usize,
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("controls", &self.catalog.control_types())
            .field("cached", &self.cached_len())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

impl SchemaRegistry {
    pub fn new(catalog: impl Catalog + 'static) -> Self {
        Self {
            catalog: Box::new(catalog),
            cache: RwLock::new(HashMap::new()),
            max_depth: crate::validate::DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn catalog(&self) -> &dyn Catalog {
        self.catalog.as_ref()
    }

    pub fn options(&self, strict: bool) -> ValidationOptions {
        ValidationOptions::lenient().with_strict(strict).with_max_depth(self.max_depth)
    }

    // ---------------------------- schemas ---------------------------- //

    /// Composed schema: the control's base over `[layout, universal, hints]`.
    pub fn schema_for(&self, control_type: &str) -> Option<Arc<SchemaNode>> {
        if let Some(hit) = self.read_cache().get(control_type) {
            tracing::trace!(control_type, "schema cache hit");
            return Some(Arc::clone(hit));
        }

        let base = self.catalog.control_schema(control_type)?;
        let hints = mixins::catch_all(self.catalog.prop_hints(control_type));
        let built = Arc::new(compose(&base, &[mixins::layout(), mixins::universal(), hints]));

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        let schema = cache.entry(control_type.to_string()).or_insert_with(|| {
            tracing::debug!(control_type, "composed control schema");
            built
        });
        Some(Arc::clone(schema))
    }

    /// Compose and cache every catalog control. Returns how many are cached.
    pub fn warm(&self) -> usize {
        for control_type in self.catalog.control_types() {
            self.schema_for(&control_type);
        }
        self.cached_len()
    }

    pub fn cached_len(&self) -> usize {
        self.read_cache().len()
    }

    fn read_cache(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Arc<SchemaNode>>> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    // --------------------------- validation -------------------------- //

    /// Errors for `bag` rooted at `{control_type}.props`. Unknown control
    /// types have nothing to check against and yield no errors.
    pub fn validate_props(&self, control_type: &str, bag: &PropertyBag, strict: bool) -> Vec<ValidationError> {
        let Some(schema) = self.schema_for(control_type) else {
            tracing::debug!(control_type, "no schema for control type, skipping validation");
            return Vec::new();
        };
        Validator::new(self.options(strict)).collect_props(bag, &schema, &props_path(control_type))
    }

    pub fn ensure_valid_props(&self, control_type: &str, bag: &PropertyBag, strict: bool) -> Result<(), ContractError> {
        let Some(schema) = self.schema_for(control_type) else {
            tracing::debug!(control_type, "no schema for control type, skipping validation");
            return Ok(());
        };
        self.ensure_bag(bag, &schema, props_path(control_type), strict)
    }

    /// Errors for the geometry map of a child placed inside a frame.
    pub fn validate_frame_child(&self, frame: &PropertyBag, strict: bool) -> Vec<ValidationError> {
        Validator::new(self.options(strict)).collect_props(frame, &mixins::frame_child(), "frame")
    }

    pub fn ensure_valid_frame_child(&self, frame: &PropertyBag, strict: bool) -> Result<(), ContractError> {
        self.ensure_bag(frame, &mixins::frame_child(), "frame".to_string(), strict)
    }

    fn ensure_bag(&self, bag: &PropertyBag, schema: &SchemaNode, subject: String, strict: bool) -> Result<(), ContractError> {
        let errors = Validator::new(self.options(strict)).check_props(bag, schema, &subject)?;
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ContractError::Invalid { subject, violations: Violations::from(errors) })
        }
    }

    /// Mutation path: coerce geometry props, validate, and return the coerced bag.
    pub fn prepare_props(&self, control_type: &str, bag: &PropertyBag, strict: bool) -> Result<PropertyBag, ContractError> {
        let coerced = coerce_props(bag)?;
        self.ensure_valid_props(control_type, &coerced, strict)?;
        Ok(coerced)
    }
}

fn props_path(control_type: &str) -> String {
    format!("{control_type}.props")
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::schema::{AdditionalPolicy, ObjectSchema};
    use crate::value::{bag_from_json, Value};
    use serde_json::json;

    fn registry() -> SchemaRegistry {
        let button = ObjectSchema::new()
            .prop("label", SchemaNode::string())
            .prop("radius", SchemaNode::range(Some(0.0), Some(999.0)))
            .additional(AdditionalPolicy::Reject)
            .into_node();
        SchemaRegistry::new(StaticCatalog::new().with("button", button, ["icon"]))
    }

    fn bag(v: serde_json::Value) -> PropertyBag {
        bag_from_json(v).unwrap()
    }

    #[test]
    fn composed_schema_includes_mixins_and_hints() {
        let reg = registry();
        let schema = reg.schema_for("button").unwrap();
        assert_eq!(schema.property("radius"), Some(&SchemaNode::range(Some(0.0), Some(999.0))));
        assert!(schema.property("width").is_some());
        assert!(schema.property("tab_index").is_some());
        assert_eq!(schema.property("icon"), Some(&SchemaNode::AnyValue));
        assert!(reg.schema_for("nope").is_none());
    }

    #[test]
    fn schemas_are_cached() {
        let reg = registry();
        assert_eq!(reg.cached_len(), 0);
        let a = reg.schema_for("button").unwrap();
        let b = reg.schema_for("button").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(reg.warm(), 1);
    }

    #[test]
    fn radius_below_minimum() {
        let errs = registry().validate_props("button", &bag(json!({"label": "OK", "radius": -1})), false);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].path, "button.props.radius");
        assert!(errs[0].message.contains("minimum"));
    }

    #[test]
    fn strictness_controls_unknown_props() {
        let reg = registry();
        let props = bag(json!({"label": "OK", "mystery": 1, "icon": "star"}));
        assert!(reg.validate_props("button", &props, false).is_empty());
        let strict = reg.validate_props("button", &props, true);
        assert_eq!(strict.len(), 1);
        assert_eq!(strict[0].path, "button.props.mystery");
    }

    #[test]
    fn unknown_control_types_pass() {
        let reg = registry();
        assert!(reg.validate_props("mystery", &bag(json!({"x": 1})), true).is_empty());
        assert!(reg.ensure_valid_props("mystery", &bag(json!({"x": 1})), true).is_ok());
    }

    #[test]
    fn ensure_valid_props_aggregates() {
        let err = registry()
            .ensure_valid_props("button", &bag(json!({"label": 3, "opacity": "x"})), false)
            .unwrap_err();
        assert_eq!(err.violations().len(), 2);
        assert!(err.to_string().starts_with("button.props failed validation with 2 error(s)"));
    }

    #[test]
    fn frame_child_validation() {
        let reg = registry();
        assert!(reg.validate_frame_child(&bag(json!({"left": 10, "width": "50%", "z": 2})), true).is_empty());
        let errs = reg.validate_frame_child(&bag(json!({"left": true})), false);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].path, "frame.left");
        assert!(reg.ensure_valid_frame_child(&bag(json!({"z": "top"})), false).is_err());
    }

    #[test]
    fn prepare_props_coerces_then_validates() {
        let reg = registry();
        let out = reg.prepare_props("button", &bag(json!({"label": "OK", "width": "120", "padding": [1, 2]})), true).unwrap();
        assert_eq!(out["width"], Value::Float(120.0));

        let err = reg.prepare_props("button", &bag(json!({"padding": [1, 2, 3]})), false).unwrap_err();
        assert!(matches!(err, ContractError::Coercion(_)));

        let err = reg.prepare_props("button", &bag(json!({"radius": "-5"})), false).unwrap_err();
        assert!(matches!(err, ContractError::Invalid { .. }));
    }

    #[test]
    fn prepare_props_keeps_array_offsets() {
        let pan = ObjectSchema::new()
            .prop("offset", SchemaNode::array_between(SchemaNode::number(), Some(2), Some(2)))
            .into_node();
        let reg = SchemaRegistry::new(StaticCatalog::new().with("pan", pan, Vec::<String>::new()));
        let raw = bag(json!({"offset": [1, 2]}));
        assert!(reg.validate_props("pan", &raw, true).is_empty());
        let out = reg.prepare_props("pan", &raw, true).unwrap();
        assert_eq!(out["offset"], Value::from(vec![1.0, 2.0]));
    }
}
