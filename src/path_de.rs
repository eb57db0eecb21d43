//! serde_json decoding that reports where in the document it failed.
use serde::de::DeserializeOwned;

use crate::error::CatalogError;

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, CatalogError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(path_error)
}

/// Same as [`from_str_with_path`], for an already-parsed document.
pub fn from_value_with_path<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, CatalogError> {
    serde_path_to_error::deserialize::<_, T>(value).map_err(path_error)
}

fn path_error<E: std::fmt::Display>(err: serde_path_to_error::Error<E>) -> CatalogError {
    let path = err.path().to_string();
    CatalogError::Decode(format!("at JSON path {path} → {}", err.into_inner()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn error_names_the_failing_path() {
        let err = from_str_with_path::<BTreeMap<String, Vec<u8>>>(r#"{"a": [1, "x"]}"#).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("a[1]"), "{msg}");
    }

    #[test]
    fn value_input_decodes() {
        let out: BTreeMap<String, u8> = from_value_with_path(serde_json::json!({"k": 3})).unwrap();
        assert_eq!(out["k"], 3);
    }
}
