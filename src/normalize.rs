//! Coercion of loosely-typed geometry props into canonical shapes.
//!
//! Every normalizer maps `null`/absent to `Ok(None)`, returns a typed shape
//! that converts back into [`Value`], and fails fast with a single
//! [`CoercionError`] on input it cannot interpret.
//!
//! [`coerce_props`] applies them to the well-known keys of a property bag;
//! it is the first half of the mutation path (coerce, then validate).
pub mod geometry;
pub mod transform;
pub mod frame;

pub use frame::{normalize_frame, Frame, FrameEntry};
pub use geometry::{
    normalize_alignment, normalize_dimension, normalize_offset, normalize_padding, Alignment,
    Dimension, Offset, Padding, Unit,
};
pub use transform::{normalize_color_matrix, normalize_scale, normalize_skew, AxisValue, ColorMatrix};

use crate::error::CoercionError;
use crate::value::{PropertyBag, Value};

// ------------------------------ Prop policy ------------------------------- //

const DIMENSION_PROPS: &[&str] = &["width", "height", "min_width", "min_height", "max_width", "max_height"];
const PADDING_PROPS: &[&str] = &["padding", "margin", "content_padding"];
const ALIGNMENT_PROPS: &[&str] = &["alignment", "content_alignment"];
const OFFSET_PROPS: &[&str] = &["offset", "translate", "origin", "pivot"];

// ------------------------------- Helpers ---------------------------------- //

/// `float()`-style coercion: numbers and numeric strings, never booleans.
pub(crate) fn coerce_f64(v: &Value, what: &'static str) -> Result<f64, CoercionError> {
    match v {
        Value::Int(i) => Ok(*i as f64),
        Value::Float(f) => Ok(*f),
        Value::Str(s) => s.trim().parse::<f64>().map_err(|_| CoercionError::Invalid {
            what,
            found: format!("{s:?}"),
        }),
        other => Err(CoercionError::WrongType { what, found: other.type_name() }),
    }
}

pub(crate) fn coerce_f64_list(xs: &[Value], what: &'static str) -> Result<Vec<f64>, CoercionError> {
    xs.iter().map(|x| coerce_f64(x, what)).collect()
}

/// Treat `Value::Null` like an absent value.
pub(crate) fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

// ------------------------------ Front API --------------------------------- //

/// Return a new bag with geometry props coerced into canonical shapes.
///
/// Unrecognized keys are copied verbatim; `null` entries are dropped.
pub fn coerce_props(bag: &PropertyBag) -> Result<PropertyBag, CoercionError> {
    let mut out = PropertyBag::with_capacity(bag.len());
    for (key, value) in bag {
        if value.is_null() {
            continue;
        }
        let k = key.as_str();
        let coerced = if DIMENSION_PROPS.contains(&k) {
            normalize_dimension(Some(value)).map(|x| x.map(Value::from))
        } else if PADDING_PROPS.contains(&k) {
            normalize_padding(Some(value)).map(|x| x.map(Value::from))
        } else if ALIGNMENT_PROPS.contains(&k) {
            normalize_alignment(Some(value)).map(|x| x.map(Value::from))
        } else if OFFSET_PROPS.contains(&k) {
            normalize_offset(Some(value)).map(|x| x.map(Value::from))
        } else if k == "scale" {
            normalize_scale(Some(value)).map(|x| x.map(Value::from))
        } else if k == "skew" {
            normalize_skew(Some(value)).map(|x| x.map(Value::from))
        } else if k == "color_matrix" {
            normalize_color_matrix(Some(value)).map(|x| x.map(Value::from))
        } else if k == "frame" && value.as_object().is_some() {
            normalize_frame(Some(value), false).map(|f| Some(Value::from(f)))
        } else {
            Ok(Some(value.clone()))
        };
        if let Some(v) = coerced.map_err(|e| e.at_prop(key))? {
            out.insert(key.clone(), v);
        }
    }
    Ok(out)
}

// ------------------------------- Tests ------------------------------------ //
