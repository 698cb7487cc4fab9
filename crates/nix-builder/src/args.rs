//! Evaluation arguments
//!
//! Arguments are a flat JSON object handed to the Nix entry point. Overrides
//! are merged one level deep: an override replaces the stored value for its
//! key wholesale, nested objects included.

use crate::error::NixError;
use crate::Result;
use serde::Serialize;
use serde_json::{Map, Value};

/// String-keyed mapping of arbitrary JSON values
pub type Args = Map<String, Value>;

/// Shallow-merge `overrides` on top of `base`.
///
/// Keys present in both take the override's value; keys only in `base` are
/// kept; keys only in `overrides` are added.
pub fn merge_args(base: &Args, overrides: Args) -> Args {
    let mut merged = base.clone();
    for (key, value) in overrides {
        merged.insert(key, value);
    }
    merged
}

/// Serialize any value into an argument map.
///
/// The value must serialize to a JSON object; `null` yields an empty map.
pub fn to_args<T: Serialize + ?Sized>(value: &T) -> Result<Args> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Args::new()),
        other => Err(NixError::InvalidArgs(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

/// Parse a `KEY=VALUE` pair.
///
/// The value is decoded as JSON when possible (`count=3`, `tags=["a"]`),
/// otherwise it is taken as a plain string (`env=prod`).
pub fn parse_arg_pair(pair: &str) -> Result<(String, Value)> {
    let (key, raw) = pair
        .split_once('=')
        .ok_or_else(|| NixError::InvalidArgs(format!("expected KEY=VALUE, got '{}'", pair)))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(NixError::InvalidArgs(format!("empty key in '{}'", pair)));
    }

    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn args(value: Value) -> Args {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_merge_adds_new_keys() {
        let merged = merge_args(&args(json!({"a": 1})), args(json!({"b": 2})));
        assert_eq!(Value::Object(merged), json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_merge_override_wins() {
        let base = args(json!({"region": "eu-west-1", "replicas": 1}));
        let merged = merge_args(&base, args(json!({"replicas": 3})));
        assert_eq!(merged["replicas"], json!(3));
        assert_eq!(merged["region"], json!("eu-west-1"));
    }

    #[test]
    fn test_merge_is_shallow() {
        let base = args(json!({"db": {"host": "localhost", "port": 5432}}));
        let merged = merge_args(&base, args(json!({"db": {"port": 6543}})));
        // nested objects are replaced, not merged
        assert_eq!(merged["db"], json!({"port": 6543}));
    }

    #[test]
    fn test_merge_leaves_base_untouched() {
        let base = args(json!({"a": 1}));
        let _ = merge_args(&base, args(json!({"a": 2, "b": 3})));
        assert_eq!(Value::Object(base), json!({"a": 1}));
    }

    #[test]
    fn test_merge_empty_overrides() {
        let base = args(json!({"a": 1}));
        assert_eq!(merge_args(&base, Args::new()), base);
    }

    #[test]
    fn test_to_args_from_struct() {
        #[derive(Serialize)]
        struct Overrides {
            replicas: u32,
            domain: &'static str,
        }

        let map = to_args(&Overrides {
            replicas: 2,
            domain: "example.org",
        })
        .unwrap();
        assert_eq!(Value::Object(map), json!({"replicas": 2, "domain": "example.org"}));
    }

    #[test]
    fn test_to_args_rejects_non_object() {
        let err = to_args(&vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, NixError::InvalidArgs(_)));
    }

    #[test]
    fn test_to_args_non_string_keys_fail_serialization() {
        let mut map = HashMap::new();
        map.insert((1, 2), "tuple key");
        let err = to_args(&map).unwrap_err();
        assert!(matches!(err, NixError::Serialization(_)));
    }

    #[test]
    fn test_parse_arg_pair_json_value() {
        let (key, value) = parse_arg_pair("replicas=3").unwrap();
        assert_eq!(key, "replicas");
        assert_eq!(value, json!(3));

        let (_, value) = parse_arg_pair(r#"tags=["web","db"]"#).unwrap();
        assert_eq!(value, json!(["web", "db"]));
    }

    #[test]
    fn test_parse_arg_pair_string_fallback() {
        let (key, value) = parse_arg_pair("env=prod=blue").unwrap();
        assert_eq!(key, "env");
        assert_eq!(value, json!("prod=blue"));
    }

    #[test]
    fn test_parse_arg_pair_invalid() {
        assert!(matches!(
            parse_arg_pair("novalue"),
            Err(NixError::InvalidArgs(_))
        ));
        assert!(matches!(parse_arg_pair("=1"), Err(NixError::InvalidArgs(_))));
    }
}
