//! Layered schema composition.
//!
//! A control schema is the control's own object schema with shared mixins
//! laid underneath it. Insertion is first-writer-wins: the control's
//! declaration of a prop always beats a mixin's, and an earlier mixin beats
//! a later one. `required` and the additional-properties policy belong to
//! the base and are never touched by mixins.
use std::sync::Arc;

use crate::schema::{ObjectSchema, SchemaNode};

/// Compose `base` over `mixins`, in priority order.
///
/// Only object nodes compose: a non-object base is returned as-is and
/// non-object mixins contribute nothing.
pub fn compose(base: &SchemaNode, mixins: &[Arc<SchemaNode>]) -> SchemaNode {
    let Some(base_obj) = base.as_object() else {
        tracing::trace!("compose: non-object base left unchanged");
        return base.clone();
    };
    let layers = mixins.iter().filter_map(|m| {
        let obj = m.as_object();
        if obj.is_none() {
            tracing::trace!("compose: skipping non-object mixin");
        }
        obj
    });
    SchemaNode::ObjectOf(layer_objects(base_obj, layers))
}

/// First-writer-wins merge of object schemas. Children are shared, not copied.
pub fn layer_objects<'a>(base: &ObjectSchema, mixins: impl IntoIterator<Item = &'a ObjectSchema>) -> ObjectSchema {
    let mut out = base.clone();
    for mixin in mixins {
        for (key, schema) in &mixin.properties {
            if !out.properties.contains_key(key) {
                out.properties.insert(key.clone(), Arc::clone(schema));
            }
        }
    }
    out
}
