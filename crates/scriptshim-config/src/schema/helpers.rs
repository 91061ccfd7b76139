/*
 * helpers.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Typed accessors for schema keyword values.
 */

//! Helper functions for reading keyword values out of a schema object,
//! with errors that name the keyword and where it sits.

use crate::Document;
use crate::error::{SchemaError, SchemaPath, SchemaResult};
use serde_json::Map;

fn invalid(keyword: &str, path: &SchemaPath, message: &str) -> SchemaError {
    SchemaError::InvalidKeyword {
        keyword: keyword.to_string(),
        path: path.to_string(),
        message: message.to_string(),
    }
}

/// Get a number value by keyword
pub(super) fn get_number(
    map: &Map<String, Document>,
    keyword: &str,
    path: &SchemaPath,
) -> SchemaResult<Option<f64>> {
    match map.get(keyword) {
        None => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or_else(|| invalid(keyword, path, "must be a number")),
    }
}

/// Get a strictly positive number value by keyword (`multipleOf`)
pub(super) fn get_positive_number(
    map: &Map<String, Document>,
    keyword: &str,
    path: &SchemaPath,
) -> SchemaResult<Option<f64>> {
    match get_number(map, keyword, path)? {
        Some(n) if n <= 0.0 => Err(invalid(keyword, path, "must be greater than 0")),
        other => Ok(other),
    }
}

/// Get a non-negative integer value by keyword
pub(super) fn get_count(
    map: &Map<String, Document>,
    keyword: &str,
    path: &SchemaPath,
) -> SchemaResult<Option<usize>> {
    let Some(value) = map.get(keyword) else {
        return Ok(None);
    };
    let count = match value.as_u64() {
        Some(n) => Some(n),
        None => value
            .as_f64()
            .filter(|f| *f >= 0.0 && f.fract() == 0.0)
            .map(|f| f as u64),
    };
    count
        .and_then(|n| usize::try_from(n).ok())
        .map(Some)
        .ok_or_else(|| invalid(keyword, path, "must be a non-negative integer"))
}

/// Get a boolean value by keyword
pub(super) fn get_bool(
    map: &Map<String, Document>,
    keyword: &str,
    path: &SchemaPath,
) -> SchemaResult<Option<bool>> {
    match map.get(keyword) {
        None => Ok(None),
        Some(value) => value
            .as_bool()
            .map(Some)
            .ok_or_else(|| invalid(keyword, path, "must be a boolean")),
    }
}

/// Get a string value by keyword
pub(super) fn get_string<'a>(
    map: &'a Map<String, Document>,
    keyword: &str,
    path: &SchemaPath,
) -> SchemaResult<Option<&'a str>> {
    match map.get(keyword) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .map(Some)
            .ok_or_else(|| invalid(keyword, path, "must be a string")),
    }
}

/// Convert an array of strings (`required`, property dependencies)
pub(super) fn string_list(
    value: &Document,
    keyword: &str,
    path: &SchemaPath,
) -> SchemaResult<Vec<String>> {
    let items = value
        .as_array()
        .ok_or_else(|| invalid(keyword, path, "must be an array of strings"))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| invalid(keyword, path, "must be an array of strings"))
        })
        .collect()
}

/// Get an object value by keyword
pub(super) fn get_object<'a>(
    map: &'a Map<String, Document>,
    keyword: &str,
    path: &SchemaPath,
) -> SchemaResult<Option<&'a Map<String, Document>>> {
    match map.get(keyword) {
        None => Ok(None),
        Some(value) => value
            .as_object()
            .map(Some)
            .ok_or_else(|| invalid(keyword, path, "must be an object")),
    }
}

/// Get a non-empty array value by keyword (`allOf`, `anyOf`, `oneOf`, `enum`)
pub(super) fn get_non_empty_array<'a>(
    map: &'a Map<String, Document>,
    keyword: &str,
    path: &SchemaPath,
) -> SchemaResult<Option<&'a Vec<Document>>> {
    match map.get(keyword) {
        None => Ok(None),
        Some(Document::Array(items)) if !items.is_empty() => Ok(Some(items)),
        Some(_) => Err(invalid(keyword, path, "must be a non-empty array")),
    }
}

/// Escape a property name for use as a JSON pointer segment.
pub(super) fn escape_pointer_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Document) -> Map<String, Document> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_get_count() {
        let path = SchemaPath::new();
        let map = object(json!({"a": 2, "b": 2.0, "c": -1, "d": "2"}));
        assert_eq!(get_count(&map, "a", &path).unwrap(), Some(2));
        assert_eq!(get_count(&map, "b", &path).unwrap(), Some(2));
        assert!(get_count(&map, "c", &path).is_err());
        assert!(get_count(&map, "d", &path).is_err());
        assert_eq!(get_count(&map, "missing", &path).unwrap(), None);
    }

    #[test]
    fn test_positive_number() {
        let path = SchemaPath::new();
        let map = object(json!({"multipleOf": 0}));
        let err = get_positive_number(&map, "multipleOf", &path).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value for 'multipleOf' at (root): must be greater than 0"
        );
    }

    #[test]
    fn test_string_list() {
        let path = SchemaPath::new();
        assert_eq!(
            string_list(&json!(["a", "b"]), "required", &path).unwrap(),
            vec!["a", "b"]
        );
        assert!(string_list(&json!(["a", 1]), "required", &path).is_err());
    }

    #[test]
    fn test_escape_pointer_segment() {
        assert_eq!(escape_pointer_segment("a/b~c"), "a~1b~0c");
    }
}
