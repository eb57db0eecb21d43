use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{coerce_f64, coerce_f64_list, present};
use crate::error::CoercionError;
use crate::value::Value;

/// `<number><unit?>` with the units a dimension string may carry.
pub(crate) const DIMENSION_PATTERN: &str =
    r"^[+-]?(?:\d+(?:\.\d+)?|\.\d+)(?:%|px|vw|vh|vmin|vmax)?$";

static DIMENSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<num>[+-]?(?:\d+(?:\.\d+)?|\.\d+))(?P<unit>%|px|vw|vh|vmin|vmax)?$")
        .expect("dimension regex is valid")
});

const PADDING_EDGES: [&str; 4] = ["left", "top", "right", "bottom"];

// ————————————————————————————————————————————————————————————————————————————
// DIMENSION
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Percent,
    Px,
    Vw,
    Vh,
    Vmin,
    Vmax,
}

impl Unit {
    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "%" => Unit::Percent,
            "px" => Unit::Px,
            "vw" => Unit::Vw,
            "vh" => Unit::Vh,
            "vmin" => Unit::Vmin,
            "vmax" => Unit::Vmax,
            _ => return None,
        })
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Unit::Percent => "%",
            Unit::Px => "px",
            Unit::Vw => "vw",
            Unit::Vh => "vh",
            Unit::Vmin => "vmin",
            Unit::Vmax => "vmax",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dimension {
    /// Unit-less logical pixels.
    Points(f64),
    Length { magnitude: f64, unit: Unit },
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Points(p) => write!(f, "{p}"),
            Dimension::Length { magnitude, unit } => write!(f, "{magnitude}{}", unit.suffix()),
        }
    }
}

impl From<Dimension> for Value {
    fn from(d: Dimension) -> Self {
        match d {
            Dimension::Points(p) => Value::Float(p),
            length => Value::Str(length.to_string()),
        }
    }
}

pub fn normalize_dimension(value: Option<&Value>) -> Result<Option<Dimension>, CoercionError> {
    const WHAT: &str = "dimension";
    let Some(value) = present(value) else { return Ok(None) };
    match value {
        Value::Int(_) | Value::Float(_) => Ok(value.as_f64().map(Dimension::Points)),
        Value::Str(s) => {
            let raw = s.trim();
            if raw.is_empty() {
                return Err(CoercionError::Empty { what: WHAT });
            }
            let invalid = || CoercionError::Invalid { what: WHAT, found: format!("{s:?}") };
            let caps = DIMENSION_RE.captures(raw).ok_or_else(invalid)?;
            let magnitude: f64 = caps["num"].parse().map_err(|_| invalid())?;
            Ok(Some(match caps.name("unit").and_then(|u| Unit::parse(u.as_str())) {
                Some(unit) => Dimension::Length { magnitude, unit },
                None => Dimension::Points(magnitude),
            }))
        }
        other => Err(CoercionError::WrongType { what: WHAT, found: other.type_name() }),
    }
}

// ————————————————————————————————————————————————————————————————————————————
// OFFSET / ALIGNMENT
// ————————————————————————————————————————————————————————————————————————————

/// A 2D offset, keeping the shape it was given in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Offset {
    /// `[x, y]`; extra entries are dropped.
    Pair(f64, f64),
    /// `{x, y}`; either axis may be absent.
    Axes { x: Option<f64>, y: Option<f64> },
}

impl Offset {
    pub fn x(&self) -> Option<f64> {
        match self {
            Offset::Pair(x, _) => Some(*x),
            Offset::Axes { x, .. } => *x,
        }
    }

    pub fn y(&self) -> Option<f64> {
        match self {
            Offset::Pair(_, y) => Some(*y),
            Offset::Axes { y, .. } => *y,
        }
    }
}

impl From<Offset> for Value {
    fn from(o: Offset) -> Self {
        match o {
            Offset::Pair(x, y) => vec![x, y].into(),
            Offset::Axes { x, y } => {
                let m = [("x", x), ("y", y)]
                    .into_iter()
                    .filter_map(|(k, v)| v.map(|v| (k.to_string(), Value::Float(v))))
                    .collect();
                Value::Object(m)
            }
        }
    }
}

pub fn normalize_offset(value: Option<&Value>) -> Result<Option<Offset>, CoercionError> {
    const WHAT: &str = "offset";
    let Some(value) = present(value) else { return Ok(None) };
    match value {
        Value::Array(xs) => {
            if xs.len() < 2 {
                return Err(CoercionError::Cardinality { what: WHAT, expected: "at least 2", found: xs.len() });
            }
            Ok(Some(Offset::Pair(coerce_f64(&xs[0], WHAT)?, coerce_f64(&xs[1], WHAT)?)))
        }
        Value::Object(m) => {
            let x = m.get("x").map(|v| coerce_f64(v, WHAT)).transpose()?;
            let y = m.get("y").map(|v| coerce_f64(v, WHAT)).transpose()?;
            if x.is_none() && y.is_none() {
                return Err(CoercionError::MissingKeys { what: WHAT, expected: "x or y" });
            }
            Ok(Some(Offset::Axes { x, y }))
        }
        other => Err(CoercionError::WrongType { what: WHAT, found: other.type_name() }),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Alignment {
    /// Named token such as `center` or `top_left`, passed through verbatim.
    Named(String),
    Offset(Offset),
}

impl From<Alignment> for Value {
    fn from(a: Alignment) -> Self {
        match a {
            Alignment::Named(s) => Value::Str(s),
            Alignment::Offset(o) => o.into(),
        }
    }
}

pub fn normalize_alignment(value: Option<&Value>) -> Result<Option<Alignment>, CoercionError> {
    match present(value) {
        None => Ok(None),
        Some(Value::Str(s)) => Ok(Some(Alignment::Named(s.clone()))),
        Some(other) => Ok(normalize_offset(Some(other))?.map(Alignment::Offset)),
    }
}

// ————————————————————————————————————————————————————————————————————————————
// PADDING
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq)]
pub enum Padding {
    Uniform(f64),
    /// CSS box shorthand with 1, 2 or 4 entries.
    Shorthand(Vec<f64>),
    Edges {
        left: Option<f64>,
        top: Option<f64>,
        right: Option<f64>,
        bottom: Option<f64>,
    },
}

impl Padding {
    /// Expand to `[top, right, bottom, left]`; missing edges are zero.
    pub fn edges(&self) -> [f64; 4] {
        match self {
            Padding::Uniform(v) => [*v; 4],
            Padding::Shorthand(xs) => match xs.as_slice() {
                [a] => [*a; 4],
                [v, h] => [*v, *h, *v, *h],
                [t, r, b, l] => [*t, *r, *b, *l],
                _ => [0.0; 4],
            },
            Padding::Edges { left, top, right, bottom } => [
                top.unwrap_or(0.0),
                right.unwrap_or(0.0),
                bottom.unwrap_or(0.0),
                left.unwrap_or(0.0),
            ],
        }
    }
}

impl From<Padding> for Value {
    fn from(p: Padding) -> Self {
        match p {
            Padding::Uniform(v) => Value::Float(v),
            Padding::Shorthand(xs) => xs.into(),
            Padding::Edges { left, top, right, bottom } => {
                let m = PADDING_EDGES
                    .iter()
                    .zip([left, top, right, bottom])
                    .filter_map(|(k, v)| v.map(|v| (k.to_string(), Value::Float(v))))
                    .collect();
                Value::Object(m)
            }
        }
    }
}

pub fn normalize_padding(value: Option<&Value>) -> Result<Option<Padding>, CoercionError> {
    const WHAT: &str = "padding";
    let Some(value) = present(value) else { return Ok(None) };
    match value {
        Value::Int(_) | Value::Float(_) => Ok(value.as_f64().map(Padding::Uniform)),
        Value::Array(xs) => {
            if !matches!(xs.len(), 1 | 2 | 4) {
                return Err(CoercionError::Cardinality { what: WHAT, expected: "1, 2, or 4", found: xs.len() });
            }
            Ok(Some(Padding::Shorthand(coerce_f64_list(xs, WHAT)?)))
        }
        Value::Object(m) => {
            let edge = |k: &str| m.get(k).map(|v| coerce_f64(v, WHAT)).transpose();
            let (left, top, right, bottom) = (edge("left")?, edge("top")?, edge("right")?, edge("bottom")?);
            if left.is_none() && top.is_none() && right.is_none() && bottom.is_none() {
                return Err(CoercionError::MissingKeys { what: WHAT, expected: "at least one edge" });
            }
            Ok(Some(Padding::Edges { left, top, right, bottom }))
        }
        other => Err(CoercionError::WrongType { what: WHAT, found: other.type_name() }),
    }
}

// ------------------------------- Tests ------------------------------------ //
