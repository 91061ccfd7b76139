/*
 * coerce.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Type coercion applied when a value does not match its schema's `type`.
 */

use crate::Document;
use crate::schema::InstanceType;
use scriptshim_value::format_number;
use serde_json::Number;

/// How a validator reconciles a value with a mismatching `type` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoerceTypes {
    /// Report every mismatch.
    No,
    /// Convert between scalars: strings, numbers, booleans and `null`.
    Yes,
    /// Scalar conversion, plus wrapping a scalar into a one-element array
    /// where an array is expected and unwrapping a one-element array where
    /// a scalar is expected.
    #[default]
    Array,
}

/// Find a replacement for `value` that satisfies one of `types`, trying them
/// in order. Returns `None` when no conversion applies.
///
/// Callers only ask once `value` already failed every type.
pub(crate) fn coerce(value: &Document, types: &[InstanceType], mode: CoerceTypes) -> Option<Document> {
    if mode == CoerceTypes::No {
        return None;
    }

    let mut candidate = value;
    if mode == CoerceTypes::Array
        && let Document::Array(items) = value
        && items.len() == 1
    {
        candidate = &items[0];
        if types.iter().any(|t| t.matches(candidate)) {
            return Some(candidate.clone());
        }
    }

    for target in types {
        if let Some(coerced) = coerce_scalar(candidate, *target) {
            return Some(coerced);
        }
        if *target == InstanceType::Array && mode == CoerceTypes::Array && is_scalar(value) {
            return Some(Document::Array(vec![value.clone()]));
        }
    }
    None
}

fn is_scalar(value: &Document) -> bool {
    !matches!(value, Document::Array(_) | Document::Object(_))
}

fn coerce_scalar(value: &Document, target: InstanceType) -> Option<Document> {
    match target {
        InstanceType::String => match value {
            Document::Number(n) => Some(Document::String(number_to_string(n))),
            Document::Bool(b) => Some(Document::String(b.to_string())),
            Document::Null => Some(Document::String(String::new())),
            _ => None,
        },
        InstanceType::Number | InstanceType::Integer => {
            let n = match value {
                Document::String(s) => parse_number(s)?,
                Document::Bool(b) => f64::from(u8::from(*b)),
                Document::Null => 0.0,
                _ => return None,
            };
            if target == InstanceType::Integer && n.fract() != 0.0 {
                return None;
            }
            number_document(n)
        }
        InstanceType::Boolean => match value {
            Document::String(s) if s == "true" => Some(Document::Bool(true)),
            Document::String(s) if s == "false" => Some(Document::Bool(false)),
            Document::Number(n) if n.as_f64() == Some(1.0) => Some(Document::Bool(true)),
            Document::Number(n) if n.as_f64() == Some(0.0) => Some(Document::Bool(false)),
            Document::Null => Some(Document::Bool(false)),
            _ => None,
        },
        InstanceType::Null => match value {
            Document::String(s) if s.is_empty() => Some(Document::Null),
            Document::Number(n) if n.as_f64() == Some(0.0) => Some(Document::Null),
            Document::Bool(false) => Some(Document::Null),
            _ => None,
        },
        InstanceType::Array | InstanceType::Object => None,
    }
}

fn number_to_string(n: &Number) -> String {
    if n.is_f64() {
        n.as_f64().map(format_number).unwrap_or_else(|| n.to_string())
    } else {
        n.to_string()
    }
}

/// Decimal number text, surrounding whitespace allowed; no `inf` or `NaN`.
fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

fn number_document(n: f64) -> Option<Document> {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        Some(Document::Number(Number::from(n as i64)))
    } else {
        Number::from_f64(n).map(Document::Number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(value: Document, types: &[InstanceType]) -> Option<Document> {
        coerce(&value, types, CoerceTypes::Array)
    }

    #[test]
    fn test_disabled() {
        assert_eq!(coerce(&json!("1"), &[InstanceType::Number], CoerceTypes::No), None);
    }

    #[test]
    fn test_to_number() {
        assert_eq!(run(json!("42"), &[InstanceType::Number]), Some(json!(42)));
        assert_eq!(run(json!(" 2.5 "), &[InstanceType::Number]), Some(json!(2.5)));
        assert_eq!(run(json!(true), &[InstanceType::Number]), Some(json!(1)));
        assert_eq!(run(json!(null), &[InstanceType::Number]), Some(json!(0)));
        assert_eq!(run(json!("abc"), &[InstanceType::Number]), None);
        assert_eq!(run(json!(""), &[InstanceType::Number]), None);
        assert_eq!(run(json!("inf"), &[InstanceType::Number]), None);
    }

    #[test]
    fn test_to_integer() {
        assert_eq!(run(json!("8080"), &[InstanceType::Integer]), Some(json!(8080)));
        assert_eq!(run(json!("1.5"), &[InstanceType::Integer]), None);
    }

    #[test]
    fn test_to_string() {
        assert_eq!(run(json!(3000), &[InstanceType::String]), Some(json!("3000")));
        assert_eq!(run(json!(0.5), &[InstanceType::String]), Some(json!("0.5")));
        assert_eq!(run(json!(false), &[InstanceType::String]), Some(json!("false")));
        assert_eq!(run(json!(null), &[InstanceType::String]), Some(json!("")));
        assert_eq!(run(json!({}), &[InstanceType::String]), None);
    }

    #[test]
    fn test_to_boolean_and_null() {
        assert_eq!(run(json!("true"), &[InstanceType::Boolean]), Some(json!(true)));
        assert_eq!(run(json!(0), &[InstanceType::Boolean]), Some(json!(false)));
        assert_eq!(run(json!("yes"), &[InstanceType::Boolean]), None);
        assert_eq!(run(json!(""), &[InstanceType::Null]), Some(json!(null)));
        assert_eq!(run(json!(false), &[InstanceType::Null]), Some(json!(null)));
    }

    #[test]
    fn test_types_tried_in_order() {
        assert_eq!(
            run(json!(true), &[InstanceType::String, InstanceType::Number]),
            Some(json!("true"))
        );
        assert_eq!(
            run(json!(true), &[InstanceType::Number, InstanceType::String]),
            Some(json!(1))
        );
    }

    #[test]
    fn test_array_wrapping() {
        assert_eq!(run(json!("_views"), &[InstanceType::Array]), Some(json!(["_views"])));
        assert_eq!(run(json!(null), &[InstanceType::Array]), Some(json!([null])));
        assert_eq!(run(json!({"a": 1}), &[InstanceType::Array]), None);
        assert_eq!(
            coerce(&json!("x"), &[InstanceType::Array], CoerceTypes::Yes),
            None
        );
    }

    #[test]
    fn test_array_unwrapping() {
        assert_eq!(run(json!(["only"]), &[InstanceType::String]), Some(json!("only")));
        assert_eq!(run(json!(["7"]), &[InstanceType::Integer]), Some(json!(7)));
        assert_eq!(run(json!(["a", "b"]), &[InstanceType::String]), None);
        assert_eq!(
            coerce(&json!(["only"]), &[InstanceType::String], CoerceTypes::Yes),
            None
        );
    }
}
