//! JSON-Schema dialect ⇄ [`SchemaNode`].
//!
//! Catalogs describe control props with the familiar subset of JSON Schema
//! (`type`, `properties`, `required`, `additionalProperties`, `items`,
//! `minItems`/`maxItems`, `minimum`/`maximum`, `pattern`, `enum`, `anyOf`,
//! `oneOf`). Lowering is strict about shape and reports the JSON pointer of
//! the first node it cannot understand; emission is the inverse and is what
//! the CLI prints.
use std::sync::Arc;

use serde_json::{json, Map, Value as Json};

use super::{AdditionalPolicy, ObjectSchema, Pattern, PrimitiveKind, SchemaNode};
use crate::error::SchemaError;
use crate::value::Value;

impl SchemaNode {
    pub fn from_json_schema(schema: &Json) -> Result<Self, SchemaError> {
        lower(schema, "")
    }

    pub fn to_json_schema(&self) -> Json {
        emit(self)
    }
}

// -------------------- lowering: JSON → SchemaNode --------------------

fn fail(pointer: &str, reason: impl Into<String>) -> SchemaError {
    SchemaError {
        pointer: if pointer.is_empty() { "/".to_string() } else { pointer.to_string() },
        reason: reason.into(),
    }
}

fn child_pointer(pointer: &str, token: &str) -> String {
    format!("{pointer}/{}", token.replace('~', "~0").replace('/', "~1"))
}

fn lower(schema: &Json, ptr: &str) -> Result<SchemaNode, SchemaError> {
    let obj = match schema {
        Json::Bool(true) => return Ok(SchemaNode::AnyValue),
        Json::Object(m) => m,
        _ => return Err(fail(ptr, "schema must be an object or `true`")),
    };

    // unions take precedence over everything else on the node
    if let Some(branches) = obj.get("anyOf") {
        let branches = lower_branches(branches, &child_pointer(ptr, "anyOf"))?;
        return Ok(SchemaNode::AnyOf { branches });
    }
    if let Some(branches) = obj.get("oneOf") {
        let branches = lower_branches(branches, &child_pointer(ptr, "oneOf"))?;
        return Ok(SchemaNode::OneOf { branches });
    }

    if let Some(values) = obj.get("enum") {
        let Json::Array(values) = values else {
            return Err(fail(&child_pointer(ptr, "enum"), "`enum` must be an array"));
        };
        return Ok(SchemaNode::Enum { values: values.iter().map(Value::from).collect() });
    }

    match obj.get("type") {
        None => Ok(SchemaNode::AnyValue),
        Some(Json::String(kind)) => lower_typed(kind, obj, ptr),
        Some(Json::Array(kinds)) => {
            let type_ptr = child_pointer(ptr, "type");
            let branches = kinds
                .iter()
                .enumerate()
                .map(|(i, k)| {
                    let at = child_pointer(&type_ptr, &i.to_string());
                    let name = k.as_str().ok_or_else(|| fail(&at, "type names must be strings"))?;
                    let of = PrimitiveKind::parse(name)
                        .ok_or_else(|| fail(&at, format!("unknown type `{name}`")))?;
                    Ok(Arc::new(SchemaNode::Primitive { of }))
                })
                .collect::<Result<Vec<_>, SchemaError>>()?;
            Ok(SchemaNode::AnyOf { branches })
        }
        Some(_) => Err(fail(&child_pointer(ptr, "type"), "`type` must be a string or an array")),
    }
}

fn lower_branches(branches: &Json, ptr: &str) -> Result<Vec<Arc<SchemaNode>>, SchemaError> {
    let Json::Array(xs) = branches else {
        return Err(fail(ptr, "union branches must be an array"));
    };
    xs.iter()
        .enumerate()
        .map(|(i, b)| lower(b, &child_pointer(ptr, &i.to_string())).map(Arc::new))
        .collect()
}

fn lower_typed(kind: &str, obj: &Map<String, Json>, ptr: &str) -> Result<SchemaNode, SchemaError> {
    let of = PrimitiveKind::parse(kind)
        .ok_or_else(|| fail(&child_pointer(ptr, "type"), format!("unknown type `{kind}`")))?;

    match of {
        PrimitiveKind::Number | PrimitiveKind::Integer => {
            let min = number_field(obj, "minimum", ptr)?;
            let max = number_field(obj, "maximum", ptr)?;
            if min.is_none() && max.is_none() {
                return Ok(SchemaNode::Primitive { of });
            }
            Ok(SchemaNode::NumericRange { min, max, integer: of == PrimitiveKind::Integer })
        }
        PrimitiveKind::String => match obj.get("pattern") {
            None => Ok(SchemaNode::Primitive { of }),
            Some(Json::String(src)) => Pattern::new(src)
                .map(|pattern| SchemaNode::StringPattern { pattern })
                .map_err(|e| fail(&child_pointer(ptr, "pattern"), e.to_string())),
            Some(_) => Err(fail(&child_pointer(ptr, "pattern"), "`pattern` must be a string")),
        },
        PrimitiveKind::Array => {
            let items = match obj.get("items") {
                Some(items) => Arc::new(lower(items, &child_pointer(ptr, "items"))?),
                None => Arc::new(SchemaNode::AnyValue),
            };
            Ok(SchemaNode::ArrayOf {
                items,
                min_items: count_field(obj, "minItems", ptr)?,
                max_items: count_field(obj, "maxItems", ptr)?,
            })
        }
        PrimitiveKind::Object => lower_object(obj, ptr).map(SchemaNode::ObjectOf),
        PrimitiveKind::Null | PrimitiveKind::Boolean => Ok(SchemaNode::Primitive { of }),
    }
}

fn lower_object(obj: &Map<String, Json>, ptr: &str) -> Result<ObjectSchema, SchemaError> {
    let mut out = ObjectSchema::new();

    if let Some(props) = obj.get("properties") {
        let props_ptr = child_pointer(ptr, "properties");
        let Json::Object(props) = props else {
            return Err(fail(&props_ptr, "`properties` must be an object"));
        };
        for (key, child) in props {
            let node = lower(child, &child_pointer(&props_ptr, key))?;
            out.properties.insert(key.clone(), Arc::new(node));
        }
    }

    if let Some(required) = obj.get("required") {
        let req_ptr = child_pointer(ptr, "required");
        let Json::Array(keys) = required else {
            return Err(fail(&req_ptr, "`required` must be an array"));
        };
        for (i, key) in keys.iter().enumerate() {
            let key = key
                .as_str()
                .ok_or_else(|| fail(&child_pointer(&req_ptr, &i.to_string()), "required keys must be strings"))?;
            out.required.insert(key.to_string());
        }
    }

    out.additional = match obj.get("additionalProperties") {
        None | Some(Json::Bool(true)) => AdditionalPolicy::Allow,
        Some(Json::Bool(false)) => AdditionalPolicy::Reject,
        // schema-valued additionalProperties are accepted but not enforced
        Some(Json::Object(_)) => AdditionalPolicy::Allow,
        Some(_) => {
            return Err(fail(
                &child_pointer(ptr, "additionalProperties"),
                "`additionalProperties` must be a boolean",
            ))
        }
    };
    Ok(out)
}

fn number_field(obj: &Map<String, Json>, key: &str, ptr: &str) -> Result<Option<f64>, SchemaError> {
    match obj.get(key) {
        None | Some(Json::Null) => Ok(None),
        Some(v) => v
            .as_f64()
            .map(Some)
            .ok_or_else(|| fail(&child_pointer(ptr, key), format!("`{key}` must be a number"))),
    }
}

fn count_field(obj: &Map<String, Json>, key: &str, ptr: &str) -> Result<Option<usize>, SchemaError> {
    match obj.get(key) {
        None | Some(Json::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| fail(&child_pointer(ptr, key), format!("`{key}` must be a non-negative integer"))),
    }
}

// -------------------- emission: SchemaNode → JSON --------------------

fn emit(node: &SchemaNode) -> Json {
    match node {
        SchemaNode::AnyValue => json!({}),
        SchemaNode::Primitive { of } => json!({ "type": of.as_str() }),
        SchemaNode::Enum { values } => {
            json!({ "enum": values.iter().cloned().map(Json::from).collect::<Vec<_>>() })
        }
        SchemaNode::StringPattern { pattern } => json!({ "type": "string", "pattern": pattern.as_str() }),
        SchemaNode::NumericRange { min, max, integer } => {
            let mut o = json!({ "type": if *integer { "integer" } else { "number" } });
            if let Some(m) = *min {
                o["minimum"] = json_num_pref_i64(m);
            }
            if let Some(m) = *max {
                o["maximum"] = json_num_pref_i64(m);
            }
            o
        }
        SchemaNode::ArrayOf { items, min_items, max_items } => {
            let mut o = json!({ "type": "array", "items": emit(items) });
            if let Some(mn) = *min_items {
                o["minItems"] = Json::from(mn);
            }
            if let Some(mx) = *max_items {
                o["maxItems"] = Json::from(mx);
            }
            o
        }
        SchemaNode::ObjectOf(obj) => {
            let props: Map<String, Json> =
                obj.properties.iter().map(|(k, v)| (k.clone(), emit(v))).collect();
            let mut o = json!({
                "type": "object",
                "properties": props,
                "additionalProperties": obj.additional == AdditionalPolicy::Allow,
            });
            if !obj.required.is_empty() {
                o["required"] = Json::Array(obj.required.iter().cloned().map(Json::from).collect());
            }
            o
        }
        SchemaNode::AnyOf { branches } => {
            json!({ "anyOf": branches.iter().map(|b| emit(b)).collect::<Vec<_>>() })
        }
        SchemaNode::OneOf { branches } => {
            json!({ "oneOf": branches.iter().map(|b| emit(b)).collect::<Vec<_>>() })
        }
    }
}

// prefer emitting integers when exact
fn json_num_pref_i64(n: f64) -> Json {
    if n.is_finite() && n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        Json::from(n as i64)
    } else {
        Json::from(n)
    }
}

// ------------------------------- Tests ------------------------------------ //
