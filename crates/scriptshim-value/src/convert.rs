/*
 * convert.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Conversions into Value from Rust primitives and JSON documents.
 */

use crate::value::{Array, Object, Value};

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Array> for Value {
    fn from(array: Array) -> Self {
        Value::Array(array)
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::Object(object)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    /// `None` maps to `null`, the way an absent optional crosses into script.
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Convert a JSON document into fresh script containers.
///
/// Every JSON array and object becomes a new, unshared container; numbers
/// become doubles; object member order is preserved.
impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => Value::array(items.iter().map(Value::from)),
            serde_json::Value::Object(map) => {
                Value::object(map.iter().map(|(key, value)| (key.clone(), Value::from(value))))
            }
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::from(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_document() {
        let value = Value::from(json!({"name": "site", "tags": ["a", "b"], "count": 2}));

        let Value::Object(object) = value else {
            panic!("expected object");
        };
        let keys: Vec<String> = object.entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["name", "tags", "count"]);

        match object.get("tags") {
            Some(Value::Array(tags)) => assert_eq!(tags.len(), 2),
            other => panic!("expected array, got {:?}", other),
        }
        match object.get("count") {
            Some(Value::Number(n)) => assert_eq!(n, 2.0),
            other => panic!("expected number, got {:?}", other),
        }
    }

    #[test]
    fn test_from_option() {
        assert!(matches!(Value::from(None::<i32>), Value::Null));
        assert!(matches!(Value::from(Some(true)), Value::Bool(true)));
    }
}
