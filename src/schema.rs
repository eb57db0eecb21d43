//! Strongly-typed schema tree. No `serde_json::Value` in here.
//!
//! Nodes are immutable once built. Children are held behind [`Arc`] so
//! composed schemas for different control types share sub-nodes instead of
//! copying them; composition only ever builds new nodes.
pub mod json;

use std::fmt;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::value::Value;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaNode {
    /// Matches everything (escape hatch for unmodeled props).
    AnyValue,
    Primitive { of: PrimitiveKind },
    Enum { values: Vec<Value> },
    /// String whose start matches `pattern`.
    StringPattern { pattern: Pattern },
    /// Number within inclusive bounds; `integer` additionally rejects floats.
    NumericRange {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        #[serde(default)]
        integer: bool,
    },
    ArrayOf {
        items: Arc<SchemaNode>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_items: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_items: Option<usize>,
    },
    ObjectOf(ObjectSchema),
    /// At least one branch matches.
    AnyOf { branches: Vec<Arc<SchemaNode>> },
    /// Exactly one branch matches.
    OneOf { branches: Vec<Arc<SchemaNode>> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdditionalPolicy {
    #[default]
    Allow,
    /// Undeclared keys are errors, but only in strict mode.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObjectSchema {
    #[serde(default)]
    pub properties: IndexMap<String, Arc<SchemaNode>>, // stable order for deterministic errors
    #[serde(default)]
    pub required: IndexSet<String>,
    #[serde(default)]
    pub additional: AdditionalPolicy,
}

/// Compiled regex that compares and serializes by its source text.
#[derive(Clone)]
pub struct Pattern(Regex);

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl PrimitiveKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveKind::Null => "null",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::Number => "number",
            PrimitiveKind::String => "string",
            PrimitiveKind::Array => "array",
            PrimitiveKind::Object => "object",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "null" => PrimitiveKind::Null,
            "boolean" => PrimitiveKind::Boolean,
            "integer" => PrimitiveKind::Integer,
            "number" => PrimitiveKind::Number,
            "string" => PrimitiveKind::String,
            "array" => PrimitiveKind::Array,
            "object" => PrimitiveKind::Object,
            _ => return None,
        })
    }

    /// An integer is never a boolean; a number is any integer or float.
    pub fn admits(self, v: &Value) -> bool {
        match self {
            PrimitiveKind::Null => matches!(v, Value::Null),
            PrimitiveKind::Boolean => matches!(v, Value::Bool(_)),
            PrimitiveKind::Integer => matches!(v, Value::Int(_)),
            PrimitiveKind::Number => matches!(v, Value::Int(_) | Value::Float(_)),
            PrimitiveKind::String => matches!(v, Value::Str(_)),
            PrimitiveKind::Array => matches!(v, Value::Array(_)),
            PrimitiveKind::Object => matches!(v, Value::Object(_)),
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Pattern {
    pub fn new(src: &str) -> Result<Self, regex::Error> {
        Regex::new(src).map(Pattern)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Prefix-anchored match; add `$` to the pattern for a full match.
    pub fn matches_start(&self, s: &str) -> bool {
        self.0.find(s).is_some_and(|m| m.start() == 0)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pattern({:?})", self.as_str())
    }
}

impl Serialize for Pattern {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let src = String::deserialize(d)?;
        Pattern::new(&src).map_err(serde::de::Error::custom)
    }
}

impl SchemaNode {
    pub fn any() -> Self {
        SchemaNode::AnyValue
    }

    pub fn primitive(of: PrimitiveKind) -> Self {
        SchemaNode::Primitive { of }
    }

    pub fn number() -> Self {
        Self::primitive(PrimitiveKind::Number)
    }

    pub fn integer() -> Self {
        Self::primitive(PrimitiveKind::Integer)
    }

    pub fn string() -> Self {
        Self::primitive(PrimitiveKind::String)
    }

    pub fn boolean() -> Self {
        Self::primitive(PrimitiveKind::Boolean)
    }

    pub fn enumeration<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        SchemaNode::Enum { values: values.into_iter().map(Into::into).collect() }
    }

    pub fn pattern(src: &str) -> Result<Self, regex::Error> {
        Ok(SchemaNode::StringPattern { pattern: Pattern::new(src)? })
    }

    pub fn range(min: Option<f64>, max: Option<f64>) -> Self {
        SchemaNode::NumericRange { min, max, integer: false }
    }

    pub fn array_of(items: impl Into<Arc<SchemaNode>>) -> Self {
        SchemaNode::ArrayOf { items: items.into(), min_items: None, max_items: None }
    }

    pub fn array_between(
        items: impl Into<Arc<SchemaNode>>,
        min_items: Option<usize>,
        max_items: Option<usize>,
    ) -> Self {
        SchemaNode::ArrayOf { items: items.into(), min_items, max_items }
    }

    pub fn any_of<I, N>(branches: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Arc<SchemaNode>>,
    {
        SchemaNode::AnyOf { branches: branches.into_iter().map(Into::into).collect() }
    }

    pub fn one_of<I, N>(branches: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Arc<SchemaNode>>,
    {
        SchemaNode::OneOf { branches: branches.into_iter().map(Into::into).collect() }
    }

    pub fn shared(self) -> Arc<SchemaNode> {
        Arc::new(self)
    }

    pub fn as_object(&self) -> Option<&ObjectSchema> {
        match self {
            SchemaNode::ObjectOf(o) => Some(o),
            _ => None,
        }
    }

    /// Declared child schema of an object node.
    pub fn property(&self, key: &str) -> Option<&SchemaNode> {
        self.as_object()?.properties.get(key).map(Arc::as_ref)
    }
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prop(mut self, key: &str, schema: impl Into<Arc<SchemaNode>>) -> Self {
        self.properties.insert(key.to_string(), schema.into());
        self
    }

    pub fn require(mut self, key: &str) -> Self {
        self.required.insert(key.to_string());
        self
    }

    pub fn additional(mut self, policy: AdditionalPolicy) -> Self {
        self.additional = policy;
        self
    }

    pub fn into_node(self) -> SchemaNode {
        SchemaNode::ObjectOf(self)
    }
}

impl From<ObjectSchema> for SchemaNode {
    fn from(o: ObjectSchema) -> Self {
        SchemaNode::ObjectOf(o)
    }
}

// ------------------------------- Tests ------------------------------------ //
