//! Sources of per-control base schemas and prop hints.
//!
//! The registry asks a [`Catalog`] for the *base* schema of a control type;
//! the shared mixins are layered on afterwards. Two implementations ship:
//! [`StaticCatalog`] (built in code) and [`JsonCatalog`] (a JSON document).
//!
//! Catalog document shape:
//!
//! ```json
//! { "controls": {
//!     "button": {
//!       "schema": { "type": "object", "properties": { "label": { "type": "string" } } },
//!       "hints": ["icon", "badge"]
//!     }
//! } }
//! ```
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::CatalogError;
use crate::schema::SchemaNode;

pub trait Catalog: Send + Sync {
    /// Base schema declared by the control itself, before mixins.
    fn control_schema(&self, control_type: &str) -> Option<Arc<SchemaNode>>;

    /// Props the runtime understands but the base schema does not model.
    fn prop_hints(&self, control_type: &str) -> &[String];

    fn control_types(&self) -> Vec<String>;
}

// ————————————————————————————————————————————————————————————————————————————
// STATIC CATALOG
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone)]
struct Entry {
    schema: Arc<SchemaNode>,
    hints: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    controls: IndexMap<String, Entry>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a control type.
    pub fn insert<I, S>(&mut self, control_type: &str, schema: impl Into<Arc<SchemaNode>>, hints: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = Entry { schema: schema.into(), hints: hints.into_iter().map(Into::into).collect() };
        self.controls.insert(control_type.to_string(), entry);
        self
    }

    pub fn with<I, S>(mut self, control_type: &str, schema: impl Into<Arc<SchemaNode>>, hints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(control_type, schema, hints);
        self
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }
}

impl Catalog for StaticCatalog {
    fn control_schema(&self, control_type: &str) -> Option<Arc<SchemaNode>> {
        self.controls.get(control_type).map(|e| Arc::clone(&e.schema))
    }

    fn prop_hints(&self, control_type: &str) -> &[String] {
        self.controls.get(control_type).map(|e| e.hints.as_slice()).unwrap_or(&[])
    }

    fn control_types(&self) -> Vec<String> {
        self.controls.keys().cloned().collect()
    }
}

// ————————————————————————————————————————————————————————————————————————————
// JSON CATALOG
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogDocument {
    controls: IndexMap<String, ControlDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ControlDocument {
    #[serde(default = "open_object")]
    schema: serde_json::Value,
    #[serde(default)]
    hints: Vec<String>,
}

fn open_object() -> serde_json::Value {
    serde_json::json!({ "type": "object" })
}

/// Catalog lowered from a JSON document. Every schema is lowered eagerly, so
/// a bad schema fails at load time rather than on first use.
#[derive(Debug, Clone)]
pub struct JsonCatalog {
    inner: StaticCatalog,
}

impl JsonCatalog {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path)
            .map_err(|source| CatalogError::Io { path: path.display().to_string(), source })?;
        let catalog = Self::from_json_str(&src)?;
        tracing::debug!(path = %path.display(), controls = catalog.inner.len(), "catalog loaded");
        Ok(catalog)
    }

    pub fn from_json_str(src: &str) -> Result<Self, CatalogError> {
        Self::from_document(crate::path_de::from_str_with_path(src)?)
    }

    pub fn from_json(value: serde_json::Value) -> Result<Self, CatalogError> {
        Self::from_document(crate::path_de::from_value_with_path(value)?)
    }

    fn from_document(doc: CatalogDocument) -> Result<Self, CatalogError> {
        let mut inner = StaticCatalog::new();
        for (control, entry) in doc.controls {
            let schema = SchemaNode::from_json_schema(&entry.schema)
                .map_err(|source| CatalogError::Schema { control: control.clone(), source })?;
            inner.insert(&control, schema, entry.hints);
        }
        Ok(Self { inner })
    }
}

impl Catalog for JsonCatalog {
    fn control_schema(&self, control_type: &str) -> Option<Arc<SchemaNode>> {
        self.inner.control_schema(control_type)
    }

    fn prop_hints(&self, control_type: &str) -> &[String] {
        self.inner.prop_hints(control_type)
    }

    fn control_types(&self) -> Vec<String> {
        self.inner.control_types()
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ObjectSchema;
    use serde_json::json;

    #[test]
    fn static_catalog_lookup() {
        let catalog = StaticCatalog::new()
            .with("button", ObjectSchema::new().prop("label", SchemaNode::string()).into_node(), ["icon"])
            .with("text", ObjectSchema::new().into_node(), Vec::<String>::new());
        assert_eq!(catalog.control_types(), ["button", "text"]);
        assert_eq!(catalog.prop_hints("button"), ["icon"]);
        assert!(catalog.prop_hints("nope").is_empty());
        assert!(catalog.control_schema("button").unwrap().property("label").is_some());
        assert!(catalog.control_schema("nope").is_none());
    }

    #[test]
    fn json_catalog_lowers_schemas() {
        let catalog = JsonCatalog::from_json(json!({
            "controls": {
                "button": {
                    "schema": {
                        "type": "object",
                        "properties": { "radius": { "type": "number", "minimum": 0, "maximum": 999 } }
                    },
                    "hints": ["icon"]
                },
                "spacer": {}
            }
        }))
        .unwrap();
        assert_eq!(
            catalog.control_schema("button").unwrap().property("radius"),
            Some(&SchemaNode::range(Some(0.0), Some(999.0)))
        );
        assert_eq!(catalog.prop_hints("button"), ["icon"]);
        assert!(catalog.control_schema("spacer").unwrap().as_object().is_some());
    }

    #[test]
    fn json_catalog_errors_carry_location() {
        let err = JsonCatalog::from_json_str(r#"{"controls": {"button": {"hints": [1]}}}"#).unwrap_err();
        assert!(matches!(err, CatalogError::Decode(ref m) if m.contains("controls.button.hints")), "{err}");

        let err = JsonCatalog::from_json(json!({
            "controls": { "button": { "schema": { "type": "object", "properties": { "x": { "type": "nope" } } } } }
        }))
        .unwrap_err();
        match err {
            CatalogError::Schema { control, source } => {
                assert_eq!(control, "button");
                assert_eq!(source.pointer, "/properties/x/type");
            }
            other => panic!("unexpected {other}"),
        }
    }

    #[test]
    fn missing_catalog_file_is_io_error() {
        let err = JsonCatalog::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }
}
