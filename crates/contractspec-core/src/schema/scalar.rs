//! Static OpenAPI `type`/`format` to [`ScalarType`] lookup

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::ScalarType;

static SCALAR_LOOKUP: Lazy<HashMap<&'static str, ScalarType>> = Lazy::new(|| {
    HashMap::from([
        ("string", ScalarType::String),
        ("string:byte", ScalarType::String),
        ("string:binary", ScalarType::String),
        ("string:password", ScalarType::String),
        ("string:date", ScalarType::Date),
        ("string:date-time", ScalarType::DateTime),
        ("string:time", ScalarType::Time),
        ("string:uuid", ScalarType::Id),
        ("string:email", ScalarType::Email),
        ("string:uri", ScalarType::Url),
        ("string:url", ScalarType::Url),
        ("integer", ScalarType::Int),
        ("integer:int32", ScalarType::Int),
        ("integer:int64", ScalarType::Int),
        ("number", ScalarType::Float),
        ("number:float", ScalarType::Float),
        ("number:double", ScalarType::Float),
        ("boolean", ScalarType::Boolean),
        ("object", ScalarType::Json),
    ])
});

/// Map a schema `type` and optional `format` to a scalar.
///
/// `type:format` is tried first, then `type` alone, so unknown formats fall
/// back to the base type.
pub fn lookup_scalar(ty: &str, format: Option<&str>) -> Option<ScalarType> {
    format
        .and_then(|format| SCALAR_LOOKUP.get(format!("{}:{}", ty, format).as_str()))
        .or_else(|| SCALAR_LOOKUP.get(ty))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_beats_type() {
        assert_eq!(lookup_scalar("string", Some("date-time")), Some(ScalarType::DateTime));
        assert_eq!(lookup_scalar("string", Some("uuid")), Some(ScalarType::Id));
        assert_eq!(lookup_scalar("integer", Some("int64")), Some(ScalarType::Int));
    }

    #[test]
    fn test_unknown_format_falls_back_to_type() {
        assert_eq!(lookup_scalar("string", Some("color")), Some(ScalarType::String));
        assert_eq!(lookup_scalar("number", None), Some(ScalarType::Float));
        assert_eq!(lookup_scalar("tuple", None), None);
    }
}
