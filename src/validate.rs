//! Recursive, error-accumulating validator.
//!
//! The walk never stops at the first mismatch: every problem in a property
//! tree is reported in one pass as a `(path, message)` record. Paths are built
//! incrementally on a single `String` buffer (`a.b`, `a.items[2].label`).
//!
//! Semantics worth knowing:
//! - `null` matches every schema; required-ness is checked one level up, by
//!   the enclosing object's `required` set.
//! - `AnyOf` stops at the first matching branch; `OneOf` must try them all.
//!   Either reports a single record for the union, never the branch errors.
//! - Undeclared keys on a `Reject` object are errors only in strict mode.
//! - Depth is bounded by [`ValidationOptions::max_depth`].
use std::fmt::Write as _;

use crate::error::{ContractError, DepthExceeded, ValidationError, Violations};
use crate::schema::{AdditionalPolicy, ObjectSchema, SchemaNode};
use crate::value::{PropertyBag, Value};

pub const DEFAULT_MAX_DEPTH: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Reject undeclared keys on objects whose policy is `Reject`.
    pub strict: bool,
    pub max_depth: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self { strict: false, max_depth: DEFAULT_MAX_DEPTH }
    }
}

impl ValidationOptions {
    pub fn strict() -> Self {
        Self { strict: true, ..Self::default() }
    }

    pub fn lenient() -> Self {
        Self::default()
    }

    pub fn with_strict(self, strict: bool) -> Self {
        Self { strict, ..self }
    }

    pub fn with_max_depth(self, max_depth: usize) -> Self {
        Self { max_depth, ..self }
    }
}

impl From<DepthExceeded> for ValidationError {
    fn from(d: DepthExceeded) -> Self {
        ValidationError::new(d.path, format!("nests deeper than the maximum depth of {}", d.max_depth))
    }
}

// ————————————————————————————————————————————————————————————————————————————
// FRONT API
// ————————————————————————————————————————————————————————————————————————————

/// Validate `value` against `schema`, rooted at `path`. Never fails.
///
/// Hitting the depth limit aborts the walk and appends one record at the
/// offending path after the records collected so far.
pub fn validate(value: &Value, schema: &SchemaNode, path: &str, options: &ValidationOptions) -> Vec<ValidationError> {
    Validator::new(*options).collect(value, schema, path)
}

/// Raise one aggregate [`ContractError`] when `value` has any violation.
pub fn ensure_valid(
    value: &Value,
    schema: &SchemaNode,
    path: &str,
    options: &ValidationOptions,
) -> Result<(), ContractError> {
    let errors = Validator::new(*options).check(value, schema, path)?;
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ContractError::Invalid { subject: path.to_string(), violations: Violations::from(errors) })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    options: ValidationOptions,
}

impl Validator {
    pub fn new(options: ValidationOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Like [`Validator::collect`], but surfaces the depth limit as an error.
    pub fn check(&self, value: &Value, schema: &SchemaNode, path: &str) -> Result<Vec<ValidationError>, DepthExceeded> {
        let mut errors = Vec::new();
        self.walk(value, schema, &mut path.to_string(), 0, &mut errors)?;
        Ok(errors)
    }

    pub fn collect(&self, value: &Value, schema: &SchemaNode, path: &str) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if let Err(exceeded) = self.walk(value, schema, &mut path.to_string(), 0, &mut errors) {
            errors.push(exceeded.into());
        }
        errors
    }

    /// [`Validator::check`] for a borrowed bag, without wrapping it in a `Value`.
    pub(crate) fn check_props(
        &self,
        bag: &PropertyBag,
        schema: &SchemaNode,
        path: &str,
    ) -> Result<Vec<ValidationError>, DepthExceeded> {
        let mut errors = Vec::new();
        self.walk_props(bag, schema, path, &mut errors)?;
        Ok(errors)
    }

    pub(crate) fn collect_props(&self, bag: &PropertyBag, schema: &SchemaNode, path: &str) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if let Err(exceeded) = self.walk_props(bag, schema, path, &mut errors) {
            errors.push(exceeded.into());
        }
        errors
    }

    // ------------------------------ walk ------------------------------ //

    fn walk_props(
        &self,
        bag: &PropertyBag,
        schema: &SchemaNode,
        path: &str,
        errors: &mut Vec<ValidationError>,
    ) -> Result<(), DepthExceeded> {
        let mut path = path.to_string();
        match schema {
            SchemaNode::ObjectOf(obj) => self.walk_object(bag, obj, &mut path, 0, errors),
            // unions and the like need the bag as a value
            other => self.walk(&Value::Object(bag.clone()), other, &mut path, 0, errors),
        }
    }

    fn walk(
        &self,
        value: &Value,
        schema: &SchemaNode,
        path: &mut String,
        depth: usize,
        errors: &mut Vec<ValidationError>,
    ) -> Result<(), DepthExceeded> {
        if value.is_null() {
            return Ok(());
        }
        if depth > self.options.max_depth {
            tracing::debug!(path = %path, max_depth = self.options.max_depth, "validation depth exceeded");
            return Err(DepthExceeded { path: path.clone(), max_depth: self.options.max_depth });
        }

        match schema {
            SchemaNode::AnyValue => {}

            SchemaNode::Primitive { of } => {
                if !of.admits(value) {
                    errors.push(mismatch(path, of.as_str(), value));
                }
            }

            SchemaNode::Enum { values } => {
                if !values.iter().any(|allowed| allowed.loosely_equals(value)) {
                    errors.push(ValidationError::new(path.clone(), format!("must be one of {}", render_values(values))));
                }
            }

            SchemaNode::StringPattern { pattern } => match value {
                Value::Str(s) if pattern.matches_start(s) => {}
                Value::Str(_) => {
                    errors.push(ValidationError::new(
                        path.clone(),
                        format!("does not match pattern {:?}", pattern.as_str()),
                    ));
                }
                other => errors.push(mismatch(path, "string", other)),
            },

            SchemaNode::NumericRange { min, max, integer } => {
                let n = match value {
                    Value::Int(i) => *i as f64,
                    Value::Float(f) if !*integer => *f,
                    other => {
                        errors.push(mismatch(path, if *integer { "integer" } else { "number" }, other));
                        return Ok(());
                    }
                };
                if let Some(min) = min.filter(|m| n < *m) {
                    errors.push(ValidationError::new(path.clone(), format!("{n} is below the minimum of {min}")));
                } else if let Some(max) = max.filter(|m| n > *m) {
                    errors.push(ValidationError::new(path.clone(), format!("{n} is above the maximum of {max}")));
                }
            }

            SchemaNode::ArrayOf { items, min_items, max_items } => {
                let Value::Array(xs) = value else {
                    errors.push(ValidationError::new(path.clone(), format!("must be an array, got {}", value.type_name())));
                    return Ok(());
                };
                if let Some(min) = min_items.filter(|m| xs.len() < *m) {
                    errors.push(ValidationError::new(
                        path.clone(),
                        format!("must have at least {min} items, got {}", xs.len()),
                    ));
                }
                if let Some(max) = max_items.filter(|m| xs.len() > *m) {
                    errors.push(ValidationError::new(
                        path.clone(),
                        format!("must have at most {max} items, got {}", xs.len()),
                    ));
                }
                // elements are checked regardless of bound violations
                let mark = path.len();
                for (i, item) in xs.iter().enumerate() {
                    let _ = write!(path, "[{i}]");
                    self.walk(item, items, path, depth + 1, errors)?;
                    path.truncate(mark);
                }
            }

            SchemaNode::ObjectOf(obj) => match value {
                Value::Object(map) => self.walk_object(map, obj, path, depth, errors)?,
                other => errors.push(ValidationError::new(
                    path.clone(),
                    format!("must be an object, got {}", other.type_name()),
                )),
            },

            SchemaNode::AnyOf { branches } => {
                for branch in branches {
                    if self.matches(value, branch, path, depth)? {
                        return Ok(());
                    }
                }
                errors.push(ValidationError::new(
                    path.clone(),
                    format!("does not match any of the {} allowed schemas", branches.len()),
                ));
            }

            SchemaNode::OneOf { branches } => {
                let mut matched = 0usize;
                for branch in branches {
                    if self.matches(value, branch, path, depth)? {
                        matched += 1;
                    }
                }
                match matched {
                    1 => {}
                    0 => errors.push(ValidationError::new(
                        path.clone(),
                        format!("does not match any of the {} schemas (expected exactly one)", branches.len()),
                    )),
                    n => errors.push(ValidationError::new(
                        path.clone(),
                        format!("is ambiguous: matches {n} of the {} schemas (expected exactly one)", branches.len()),
                    )),
                }
            }
        }
        Ok(())
    }

    fn walk_object(
        &self,
        map: &PropertyBag,
        obj: &ObjectSchema,
        path: &mut String,
        depth: usize,
        errors: &mut Vec<ValidationError>,
    ) -> Result<(), DepthExceeded> {
        let mark = path.len();
        for key in &obj.required {
            if !map.contains_key(key) {
                push_key(path, key);
                errors.push(ValidationError::new(path.clone(), "is required"));
                path.truncate(mark);
            }
        }

        let reject_unknown = self.options.strict && obj.additional == AdditionalPolicy::Reject;
        for (key, child) in map {
            push_key(path, key);
            match obj.properties.get(key) {
                Some(child_schema) => self.walk(child, child_schema, path, depth + 1, errors)?,
                None if reject_unknown => errors.push(ValidationError::new(path.clone(), "is not allowed")),
                None => {}
            }
            path.truncate(mark);
        }
        Ok(())
    }

    /// Evaluate a union branch in isolation; its errors are discarded.
    fn matches(&self, value: &Value, branch: &SchemaNode, path: &mut String, depth: usize) -> Result<bool, DepthExceeded> {
        let mut scratch = Vec::new();
        self.walk(value, branch, path, depth + 1, &mut scratch)?;
        Ok(scratch.is_empty())
    }
}

// ------------------------------- Helpers ---------------------------------- //

fn push_key(path: &mut String, key: &str) {
    if !path.is_empty() {
        path.push('.');
    }
    path.push_str(key);
}

fn mismatch(path: &str, expected: &str, found: &Value) -> ValidationError {
    ValidationError::new(path, format!("expected {expected}, got {}", found.type_name()))
}

fn render_values(values: &[Value]) -> String {
    let rendered: Vec<String> = values
        .iter()
        .map(|v| serde_json::Value::from(v.clone()).to_string())
        .collect();
    format!("[{}]", rendered.join(", "))
}

// ------------------------------- Tests ------------------------------------ //
