//! Shared schema fragments and the mixins every control is layered over.
//!
//! Everything here is built once and handed out as `Arc` clones, so all
//! composed control schemas point at the same fragment nodes.
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::normalize::geometry::DIMENSION_PATTERN;
use crate::schema::{ObjectSchema, SchemaNode};

// ————————————————————————————————————————————————————————————————————————————
// FRAGMENTS
// ————————————————————————————————————————————————————————————————————————————

pub static ANY: Lazy<Arc<SchemaNode>> = Lazy::new(|| SchemaNode::any().shared());
pub static NUMBER: Lazy<Arc<SchemaNode>> = Lazy::new(|| SchemaNode::number().shared());
pub static INTEGER: Lazy<Arc<SchemaNode>> = Lazy::new(|| SchemaNode::integer().shared());
pub static BOOL: Lazy<Arc<SchemaNode>> = Lazy::new(|| SchemaNode::boolean().shared());
pub static STRING: Lazy<Arc<SchemaNode>> = Lazy::new(|| SchemaNode::string().shared());

static OPEN_OBJECT: Lazy<Arc<SchemaNode>> = Lazy::new(|| ObjectSchema::new().into_node().shared());

fn numbers(keys: &[&str]) -> ObjectSchema {
    keys.iter().fold(ObjectSchema::new(), |o, k| o.prop(k, Arc::clone(&NUMBER)))
}

/// Number, CSS-ish color string, or an `r/g/b/a` map.
pub static COLOR: Lazy<Arc<SchemaNode>> = Lazy::new(|| {
    SchemaNode::any_of([
        Arc::clone(&NUMBER),
        Arc::clone(&STRING),
        numbers(&["r", "g", "b", "a", "red", "green", "blue", "alpha"]).into_node().shared(),
    ])
    .shared()
});

pub static DIMENSION: Lazy<Arc<SchemaNode>> = Lazy::new(|| {
    let pattern = SchemaNode::pattern(DIMENSION_PATTERN).expect("dimension pattern is valid");
    SchemaNode::any_of([Arc::clone(&NUMBER), pattern.shared()]).shared()
});

pub static OFFSET: Lazy<Arc<SchemaNode>> = Lazy::new(|| {
    SchemaNode::any_of([
        SchemaNode::array_between(Arc::clone(&NUMBER), Some(2), None).shared(),
        numbers(&["x", "y"]).into_node().shared(),
    ])
    .shared()
});

pub static RECT: Lazy<Arc<SchemaNode>> = Lazy::new(|| {
    SchemaNode::any_of([
        SchemaNode::array_between(Arc::clone(&NUMBER), Some(4), None).shared(),
        numbers(&["x", "y", "left", "top", "width", "height"]).into_node().shared(),
    ])
    .shared()
});

pub static ALIGNMENT: Lazy<Arc<SchemaNode>> =
    Lazy::new(|| SchemaNode::any_of([Arc::clone(&STRING), Arc::clone(&OFFSET)]).shared());

pub static PADDING: Lazy<Arc<SchemaNode>> = Lazy::new(|| {
    SchemaNode::any_of([
        Arc::clone(&NUMBER),
        SchemaNode::array_between(Arc::clone(&NUMBER), Some(1), None).shared(),
        numbers(&["left", "top", "right", "bottom"]).into_node().shared(),
    ])
    .shared()
});

/// Shared by scale and skew.
pub static AXIS_TRANSFORM: Lazy<Arc<SchemaNode>> = Lazy::new(|| {
    SchemaNode::any_of([
        Arc::clone(&NUMBER),
        SchemaNode::array_between(Arc::clone(&NUMBER), Some(1), None).shared(),
        Arc::clone(&OPEN_OBJECT),
    ])
    .shared()
});

pub static COLOR_MATRIX: Lazy<Arc<SchemaNode>> = Lazy::new(|| {
    SchemaNode::any_of([
        SchemaNode::array_between(Arc::clone(&NUMBER), Some(20), Some(20)).shared(),
        Arc::clone(&STRING),
    ])
    .shared()
});

pub static AXIS: Lazy<Arc<SchemaNode>> =
    Lazy::new(|| SchemaNode::enumeration(["horizontal", "vertical", "x", "y"]).shared());

// ————————————————————————————————————————————————————————————————————————————
// MIXINS
// ————————————————————————————————————————————————————————————————————————————

static LAYOUT: Lazy<Arc<SchemaNode>> = Lazy::new(|| {
    ObjectSchema::new()
        .prop("expand", Arc::clone(&BOOL))
        .prop("flex", Arc::clone(&INTEGER))
        .prop("width", Arc::clone(&DIMENSION))
        .prop("height", Arc::clone(&DIMENSION))
        .prop("min_width", Arc::clone(&DIMENSION))
        .prop("min_height", Arc::clone(&DIMENSION))
        .prop("max_width", Arc::clone(&DIMENSION))
        .prop("max_height", Arc::clone(&DIMENSION))
        .prop("padding", Arc::clone(&PADDING))
        .prop("margin", Arc::clone(&PADDING))
        .prop("alignment", Arc::clone(&ALIGNMENT))
        .prop("animation", Arc::clone(&OPEN_OBJECT))
        .into_node()
        .shared()
});

static UNIVERSAL: Lazy<Arc<SchemaNode>> = Lazy::new(|| {
    ObjectSchema::new()
        // runtime installs listeners only for listed events
        .prop("events", SchemaNode::array_of(Arc::clone(&STRING)))
        // style / visibility / cursor / tooltip
        .prop("bgcolor", Arc::clone(&ANY))
        .prop("background", Arc::clone(&ANY))
        .prop("color", Arc::clone(&ANY))
        .prop("text_color", Arc::clone(&ANY))
        .prop("border_color", Arc::clone(&ANY))
        .prop("border_width", Arc::clone(&NUMBER))
        .prop("radius", Arc::clone(&NUMBER))
        .prop("border_radius", Arc::clone(&NUMBER))
        .prop("elevation", Arc::clone(&NUMBER))
        .prop("opacity", Arc::clone(&NUMBER))
        .prop("visible", Arc::clone(&BOOL))
        .prop("enabled", Arc::clone(&BOOL))
        .prop("disabled", Arc::clone(&BOOL))
        .prop("cursor", Arc::clone(&STRING))
        .prop("tooltip", Arc::clone(&ANY))
        .prop("style_pack", Arc::clone(&STRING))
        .prop("style", Arc::clone(&OPEN_OBJECT))
        .prop("variant", SchemaNode::any_of([Arc::clone(&STRING), Arc::clone(&OPEN_OBJECT)]))
        .prop("modifiers", SchemaNode::array_of(Arc::clone(&ANY)))
        .prop("motion", Arc::clone(&ANY))
        .prop("slots", Arc::clone(&OPEN_OBJECT))
        .prop("state", Arc::clone(&STRING))
        // accessibility
        .prop("semantic_label", Arc::clone(&STRING))
        .prop("role", Arc::clone(&STRING))
        .prop("hint", Arc::clone(&STRING))
        // focus
        .prop("focusable", Arc::clone(&BOOL))
        .prop("autofocus", Arc::clone(&BOOL))
        .prop("tab_index", Arc::clone(&INTEGER))
        // input-like binding
        .prop("value", Arc::clone(&ANY))
        .prop("default_value", Arc::clone(&ANY))
        .prop("emit_on_change", Arc::clone(&BOOL))
        .prop("debounce_ms", Arc::clone(&INTEGER))
        .prop("dirty", Arc::clone(&BOOL))
        .prop("touched", Arc::clone(&BOOL))
        .prop("error_text", Arc::clone(&STRING))
        .prop("warnings", SchemaNode::array_of(Arc::clone(&ANY)))
        .prop("status", Arc::clone(&STRING))
        .into_node()
        .shared()
});

static FRAME_CHILD: Lazy<Arc<SchemaNode>> = Lazy::new(|| {
    let o = ["left", "top", "right", "bottom", "width", "height", "x", "y"]
        .iter()
        .fold(ObjectSchema::new(), |o, k| o.prop(k, Arc::clone(&DIMENSION)));
    o.prop("anchor", Arc::clone(&ALIGNMENT))
        .prop("alignment", Arc::clone(&ALIGNMENT))
        .prop("z", Arc::clone(&NUMBER))
        .prop("z_index", Arc::clone(&NUMBER))
        .into_node()
        .shared()
});

/// Layout props every control accepts (sizes, padding, alignment, flex).
pub fn layout() -> Arc<SchemaNode> {
    Arc::clone(&LAYOUT)
}

/// Interaction, style, accessibility and focus props shared by all controls.
pub fn universal() -> Arc<SchemaNode> {
    Arc::clone(&UNIVERSAL)
}

/// Geometry accepted on a child placed inside a frame.
pub fn frame_child() -> Arc<SchemaNode> {
    Arc::clone(&FRAME_CHILD)
}

/// Permissive mixin: `AnyValue` for each hinted prop not yet modeled precisely.
pub fn catch_all<S: AsRef<str>>(hints: &[S]) -> Arc<SchemaNode> {
    hints
        .iter()
        .fold(ObjectSchema::new(), |o, k| o.prop(k.as_ref(), Arc::clone(&ANY)))
        .into_node()
        .shared()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::{validate, ValidationOptions};
    use crate::value::Value;
    use serde_json::json;

    fn errors(schema: &SchemaNode, v: serde_json::Value) -> usize {
        validate(&Value::from(v), schema, "p", &ValidationOptions::lenient()).len()
    }

    #[test]
    fn fragments_accept_their_documented_shapes() {
        assert_eq!(errors(&DIMENSION, json!("50%")), 0);
        assert_eq!(errors(&DIMENSION, json!(12.5)), 0);
        assert_eq!(errors(&DIMENSION, json!("12em")), 1);
        assert_eq!(errors(&PADDING, json!([1, 2])), 0);
        assert_eq!(errors(&PADDING, json!({"top": 1})), 0);
        assert_eq!(errors(&ALIGNMENT, json!("center")), 0);
        assert_eq!(errors(&ALIGNMENT, json!([1])), 1);
        assert_eq!(errors(&COLOR_MATRIX, json!(vec![0; 20])), 0);
        assert_eq!(errors(&COLOR_MATRIX, json!(vec![0; 19])), 1);
        assert_eq!(errors(&AXIS, json!("vertical")), 0);
        assert_eq!(errors(&COLOR, json!({"r": 1, "g": 0.5})), 0);
        assert_eq!(errors(&RECT, json!([0, 0, 10, 10])), 0);
        assert_eq!(errors(&AXIS_TRANSFORM, json!({"x": 1})), 0);
    }

    #[test]
    fn mixins_are_shared_singletons() {
        assert!(Arc::ptr_eq(&layout(), &layout()));
        assert!(Arc::ptr_eq(&universal(), &universal()));
        assert!(universal().property("tab_index").is_some());
        assert!(layout().property("padding").is_some());
        assert!(frame_child().property("z_index").is_some());
    }

    #[test]
    fn catch_all_declares_any_value() {
        let hints = catch_all(&["icon", "badge"]);
        assert_eq!(hints.property("icon"), Some(&SchemaNode::AnyValue));
        assert_eq!(hints.as_object().unwrap().properties.len(), 2);
    }
}
