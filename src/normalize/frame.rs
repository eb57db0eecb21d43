use indexmap::IndexMap;

use super::{coerce_f64, normalize_alignment, normalize_dimension, present, Alignment, Dimension};
use crate::error::CoercionError;
use crate::value::Value;

const DIMENSION_KEYS: &[&str] = &["left", "top", "right", "bottom", "width", "height", "x", "y"];
const ALIGNMENT_KEYS: &[&str] = &["anchor", "alignment"];
const LAYER_KEYS: &[&str] = &["z", "z_index"];

#[derive(Debug, Clone, PartialEq)]
pub enum FrameEntry {
    Dimension(Dimension),
    Alignment(Alignment),
    /// Stacking order.
    Layer(f64),
}

impl From<FrameEntry> for Value {
    fn from(e: FrameEntry) -> Self {
        match e {
            FrameEntry::Dimension(d) => d.into(),
            FrameEntry::Alignment(a) => a.into(),
            FrameEntry::Layer(z) => Value::Float(z),
        }
    }
}

/// Geometry of a child positioned inside a frame, recognized keys only.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    pub entries: IndexMap<String, FrameEntry>,
}

impl Frame {
    pub fn get(&self, key: &str) -> Option<&FrameEntry> {
        self.entries.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Frame> for Value {
    fn from(f: Frame) -> Self {
        Value::Object(f.entries.into_iter().map(|(k, e)| (k, e.into())).collect())
    }
}

/// Copy recognized geometry keys, coercing each with its normalizer.
///
/// In strict mode any unrecognized key fails the whole call; otherwise such
/// keys are dropped. `null` entries are skipped either way.
pub fn normalize_frame(value: Option<&Value>, strict: bool) -> Result<Frame, CoercionError> {
    const WHAT: &str = "frame";
    let Some(value) = present(value) else { return Ok(Frame::default()) };
    let Value::Object(map) = value else {
        return Err(CoercionError::WrongType { what: WHAT, found: value.type_name() });
    };

    let mut frame = Frame::default();
    let mut unknown = Vec::new();
    for (key, val) in map {
        if val.is_null() {
            continue;
        }
        let k = key.as_str();
        let entry = if DIMENSION_KEYS.contains(&k) {
            normalize_dimension(Some(val))?.map(FrameEntry::Dimension)
        } else if ALIGNMENT_KEYS.contains(&k) {
            normalize_alignment(Some(val))?.map(FrameEntry::Alignment)
        } else if LAYER_KEYS.contains(&k) {
            Some(FrameEntry::Layer(coerce_f64(val, WHAT)?))
        } else {
            unknown.push(key.clone());
            None
        };
        if let Some(entry) = entry {
            frame.entries.insert(key.clone(), entry);
        }
    }

    if strict && !unknown.is_empty() {
        return Err(CoercionError::UnknownKeys { what: WHAT, keys: unknown });
    }
    Ok(frame)
}
