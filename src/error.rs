//! Error types for coercion, validation and catalog loading.
//!
//! Coercion fails fast with a single [`CoercionError`]. Validation never
//! fails fast: records are collected into [`Violations`] and only raised as a
//! [`ContractError`] by the `ensure_*` wrappers.
use std::fmt;

use thiserror::Error;

// ————————————————————————————————————————————————————————————————————————————
// COERCION
// ————————————————————————————————————————————————————————————————————————————

/// A normalizer could not interpret its input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoercionError {
    #[error("{what} cannot be empty")]
    Empty { what: &'static str },

    #[error("invalid {what}: {found}")]
    Invalid { what: &'static str, found: String },

    #[error("invalid {what} type: {found}")]
    WrongType { what: &'static str, found: &'static str },

    #[error("{what} must have {expected} values, got {found}")]
    Cardinality {
        what: &'static str,
        expected: &'static str,
        found: usize,
    },

    #[error("{what} must include {expected}")]
    MissingKeys {
        what: &'static str,
        expected: &'static str,
    },

    #[error("unknown {what} keys: {}", keys.join(", "))]
    UnknownKeys { what: &'static str, keys: Vec<String> },

    /// Wraps a failure with the property it happened on.
    #[error("prop `{key}`: {source}")]
    Prop {
        key: String,
        #[source]
        source: Box<CoercionError>,
    },
}

impl CoercionError {
    pub(crate) fn at_prop(self, key: &str) -> Self {
        CoercionError::Prop { key: key.to_string(), source: Box::new(self) }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// VALIDATION
// ————————————————————————————————————————————————————————————————————————————

/// One schema mismatch: where it happened and what was expected.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ValidationError {
    /// Dotted/bracketed locator of the offending value, e.g. `button.props.items[2].label`.
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { path: path.into(), message: message.into() }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.path, self.message)
    }
}

/// Ordered collection of validation records.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct Violations(Vec<ValidationError>);

impl Violations {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<ValidationError> {
        self.0
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|e| e.path.as_str())
    }
}

impl From<Vec<ValidationError>> for Violations {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self(errors)
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {v}")?;
        }
        Ok(())
    }
}

/// Recursion went deeper than [`crate::validate::ValidationOptions::max_depth`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{path} nests deeper than the maximum depth of {max_depth}")]
pub struct DepthExceeded {
    pub path: String,
    pub max_depth: usize,
}

/// Raised by the `ensure_*` wrappers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContractError {
    #[error("{subject} failed validation with {} error(s):\n{violations}", violations.len())]
    Invalid { subject: String, violations: Violations },

    #[error(transparent)]
    DepthExceeded(#[from] DepthExceeded),

    #[error(transparent)]
    Coercion(#[from] CoercionError),
}

impl ContractError {
    /// Collected records, empty for non-validation failures.
    pub fn violations(&self) -> &[ValidationError] {
        match self {
            ContractError::Invalid { violations, .. } => violations.as_slice(),
            _ => &[],
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// SCHEMA / CATALOG LOADING
// ————————————————————————————————————————————————————————————————————————————

/// A JSON-Schema-style document could not be lowered into a [`crate::schema::SchemaNode`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("schema error at {pointer}: {reason}")]
pub struct SchemaError {
    /// JSON pointer of the offending schema node, relative to the lowered root.
    pub pointer: String,
    pub reason: String,
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Structural decoding error with the JSON path of the failure.
    #[error("catalog document error {0}")]
    Decode(String),

    #[error("control `{control}`: {source}")]
    Schema {
        control: String,
        #[source]
        source: SchemaError,
    },
}
