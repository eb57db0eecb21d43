use indexmap::IndexMap;

use super::{coerce_f64, coerce_f64_list, present};
use crate::error::CoercionError;
use crate::value::Value;

pub const COLOR_MATRIX_LEN: usize = 20;

const SCALE_KEYS: &[&str] = &["x", "y", "scale_x", "scale_y"];
const SKEW_KEYS: &[&str] = &["x", "y", "skew_x", "skew_y"];

/// Scale or skew. Deliberately permissive: consumers tolerate partial data.
#[derive(Debug, Clone, PartialEq)]
pub enum AxisValue {
    Uniform(f64),
    List(Vec<f64>),
    /// Every key is kept; only the axis keys are coerced to numbers.
    Map(IndexMap<String, Value>),
}

impl From<AxisValue> for Value {
    fn from(a: AxisValue) -> Self {
        match a {
            AxisValue::Uniform(v) => Value::Float(v),
            AxisValue::List(xs) => xs.into(),
            AxisValue::Map(m) => Value::Object(m),
        }
    }
}

fn normalize_axis(
    value: Option<&Value>,
    what: &'static str,
    axis_keys: &[&str],
) -> Result<Option<AxisValue>, CoercionError> {
    let Some(value) = present(value) else { return Ok(None) };
    match value {
        Value::Int(_) | Value::Float(_) => Ok(value.as_f64().map(AxisValue::Uniform)),
        Value::Array(xs) => Ok(Some(AxisValue::List(coerce_f64_list(xs, what)?))),
        Value::Object(m) => {
            let mut out = m.clone();
            for (k, v) in out.iter_mut() {
                if axis_keys.contains(&k.as_str()) {
                    let f = coerce_f64(v, what)?;
                    *v = Value::Float(f);
                }
            }
            Ok(Some(AxisValue::Map(out)))
        }
        other => Err(CoercionError::WrongType { what, found: other.type_name() }),
    }
}

pub fn normalize_scale(value: Option<&Value>) -> Result<Option<AxisValue>, CoercionError> {
    normalize_axis(value, "scale", SCALE_KEYS)
}

pub fn normalize_skew(value: Option<&Value>) -> Result<Option<AxisValue>, CoercionError> {
    normalize_axis(value, "skew", SKEW_KEYS)
}

/// 4×5 affine color transform, or a named preset.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorMatrix {
    Named(String),
    Matrix([f64; COLOR_MATRIX_LEN]),
}

impl From<ColorMatrix> for Value {
    fn from(c: ColorMatrix) -> Self {
        match c {
            ColorMatrix::Named(s) => Value::Str(s),
            ColorMatrix::Matrix(m) => m.to_vec().into(),
        }
    }
}

pub fn normalize_color_matrix(value: Option<&Value>) -> Result<Option<ColorMatrix>, CoercionError> {
    const WHAT: &str = "color_matrix";
    let Some(value) = present(value) else { return Ok(None) };
    match value {
        Value::Str(s) => Ok(Some(ColorMatrix::Named(s.clone()))),
        Value::Array(xs) => {
            let found = xs.len();
            let entries: [f64; COLOR_MATRIX_LEN] = coerce_f64_list(xs, WHAT)?
                .try_into()
                .map_err(|_| CoercionError::Cardinality { what: WHAT, expected: "20", found })?;
            Ok(Some(ColorMatrix::Matrix(entries)))
        }
        other => Err(CoercionError::WrongType { what: WHAT, found: other.type_name() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v(j: serde_json::Value) -> Value {
        Value::from(j)
    }

    #[test]
    fn scale_accepts_number_list_or_map() {
        assert_eq!(normalize_scale(Some(&v(json!(2)))), Ok(Some(AxisValue::Uniform(2.0))));
        assert_eq!(normalize_scale(Some(&v(json!([1, "1.5"])))), Ok(Some(AxisValue::List(vec![1.0, 1.5]))));
        let Some(AxisValue::Map(m)) = normalize_scale(Some(&v(json!({"x": "2", "origin": "center"})))).unwrap()
        else {
            panic!("expected map");
        };
        assert_eq!(m["x"], Value::Float(2.0));
        assert_eq!(m["origin"], Value::from("center"));
    }

    #[test]
    fn skew_coerces_its_own_keys() {
        let Some(AxisValue::Map(m)) = normalize_skew(Some(&v(json!({"skew_x": 1, "scale_x": "a"})))).unwrap()
        else {
            panic!("expected map");
        };
        assert_eq!(m["skew_x"], Value::Float(1.0));
        assert_eq!(m["scale_x"], Value::from("a"));
        assert!(normalize_skew(Some(&v(json!({"x": "oops"})))).is_err());
        assert!(normalize_skew(Some(&v(json!(true)))).is_err());
    }

    #[test]
    fn color_matrix_arity() {
        assert!(normalize_color_matrix(Some(&v(json!(vec![0; 20])))).is_ok());
        assert!(matches!(
            normalize_color_matrix(Some(&v(json!(vec![0; 19])))),
            Err(CoercionError::Cardinality { found: 19, .. })
        ));
        assert!(matches!(
            normalize_color_matrix(Some(&v(json!(vec![0; 21])))),
            Err(CoercionError::Cardinality { found: 21, .. })
        ));
        assert_eq!(
            normalize_color_matrix(Some(&v(json!("sepia")))),
            Ok(Some(ColorMatrix::Named("sepia".into())))
        );
        assert!(normalize_color_matrix(Some(&v(json!({"r": 1})))).is_err());
    }
}
