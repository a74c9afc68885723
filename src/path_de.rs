use serde::de::DeserializeOwned;

use crate::error::ConvertError;

/// Deserialize schema text with JSON-path context in error messages.
///
/// Syntax errors surface as [`ConvertError::Json`]; well-formed JSON that
/// is not schema data surfaces as [`ConvertError::Schema`] with the path of
/// the offending node.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, ConvertError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    match serde_path_to_error::deserialize::<_, T>(de) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = err.path().to_string();
            let inner = err.into_inner();
            if inner.is_syntax() || inner.is_eof() || inner.is_io() {
                return Err(ConvertError::Json(inner));
            }
            Err(ConvertError::Schema { path, message: inner.to_string() })
        }
    }
}

/// Same as [`from_str_with_path`] for an already parsed document.
pub fn from_value_with_path<T: DeserializeOwned>(value: &serde_json::Value) -> Result<T, ConvertError> {
    match serde_path_to_error::deserialize::<_, T>(value) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = err.path().to_string();
            Err(ConvertError::Schema { path, message: err.into_inner().to_string() })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;

    #[test]
    fn null_composition_member_reports_its_path() {
        let err = from_str_with_path::<Schema>(r#"{"allOf": [{"type": "string"}, null]}"#).unwrap_err();
        match err {
            ConvertError::Schema { path, .. } => assert_eq!(path, "allOf[1]"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_text_is_a_json_error() {
        let err = from_str_with_path::<Schema>("{\"type\": ").unwrap_err();
        assert!(matches!(err, ConvertError::Json(_)));
    }

    #[test]
    fn value_input_keeps_nested_paths() {
        let doc = serde_json::json!({"properties": {"a": {"minLength": "five"}}});
        let err = from_value_with_path::<Schema>(&doc).unwrap_err();
        match err {
            ConvertError::Schema { path, .. } => assert_eq!(path, "properties.a.minLength"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
