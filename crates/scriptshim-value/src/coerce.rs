/*
 * coerce.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * ECMAScript-style conversions: String(v), Number(v), parseFloat(v).
 */

use crate::number::format_number;
use crate::value::{Array, ContainerId, MAX_NESTING_DEPTH, Value};

impl Value {
    /// Convert to a string the way `String(v)` does, except that functions
    /// render as `[Function]` or `[Function: name]`.
    ///
    /// Arrays join their elements with `,` (holes, `null` and `undefined`
    /// become empty, an array already being joined renders empty); objects
    /// render as `[object Object]`. Arrays nested deeper than
    /// [`MAX_NESTING_DEPTH`] render empty.
    pub fn to_display_string(&self) -> String {
        let mut joining = Vec::new();
        display_string(self, &mut joining)
    }

    /// Convert to a number the way `Number(v)` does.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Number(n) => *n,
            Value::String(s) => string_to_number(s),
            // Arrays go through their primitive (string) form.
            Value::Array(_) => string_to_number(&self.to_display_string()),
            Value::Function(_) | Value::Object(_) => f64::NAN,
        }
    }

    /// Convert to a number the way `parseFloat(v)` does: the longest leading
    /// decimal prefix of the value's string form, or NaN.
    pub fn parse_float(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            other => parse_float_prefix(&other.to_display_string()),
        }
    }
}

fn display_string(value: &Value, joining: &mut Vec<ContainerId>) -> String {
    match value {
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(*n),
        Value::String(s) => s.clone(),
        Value::Function(f) => match f.name() {
            Some(name) => format!("[Function: {}]", name),
            None => "[Function]".to_string(),
        },
        Value::Array(array) => join_array(array, joining),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn join_array(array: &Array, joining: &mut Vec<ContainerId>) -> String {
    let id = array.id();
    if joining.contains(&id) || joining.len() >= MAX_NESTING_DEPTH {
        return String::new();
    }
    joining.push(id);

    let parts: Vec<String> = array
        .slots()
        .iter()
        .map(|slot| match slot {
            None | Some(Value::Undefined) | Some(Value::Null) => String::new(),
            Some(value) => display_string(value, joining),
        })
        .collect();

    joining.pop();
    parts.join(",")
}

/// Whitespace as understood by the script's `trim`: Unicode white space plus
/// the byte order mark.
fn is_script_whitespace(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

/// StringToNumber: the whole (trimmed) string must be a numeric literal.
fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim_matches(is_script_whitespace);
    if trimmed.is_empty() {
        return 0.0;
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix_literal = [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)]
        .iter()
        .find_map(|(prefix, radix)| trimmed.strip_prefix(prefix).map(|rest| (rest, *radix)));
    if let Some((digits, radix)) = radix_literal {
        return parse_radix_digits(digits, radix);
    }

    match decimal_prefix(trimmed) {
        Some(literal) if literal.len() == trimmed.len() => literal.parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

fn parse_radix_digits(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    let mut result = 0.0_f64;
    for c in digits.chars() {
        match c.to_digit(radix) {
            Some(d) => result = result * f64::from(radix) + f64::from(d),
            None => return f64::NAN,
        }
    }
    result
}

/// parseFloat over a string.
fn parse_float_prefix(s: &str) -> f64 {
    let trimmed = s.trim_start_matches(is_script_whitespace);

    for (prefix, value) in [
        ("Infinity", f64::INFINITY),
        ("+Infinity", f64::INFINITY),
        ("-Infinity", f64::NEG_INFINITY),
    ] {
        if trimmed.starts_with(prefix) {
            return value;
        }
    }

    decimal_prefix(trimmed)
        .and_then(|literal| literal.parse().ok())
        .unwrap_or(f64::NAN)
}

/// Longest prefix of `s` that is a decimal literal:
/// `[+-]? (digits [. digits?] | . digits) ([eE] [+-]? digits)?`
fn decimal_prefix(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let len = bytes.len();
    let count_digits = |from: usize| {
        bytes[from..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let mut i = 0;
    if i < len && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }

    let int_digits = count_digits(i);
    i += int_digits;

    let mut frac_digits = 0;
    if i < len && bytes[i] == b'.' {
        frac_digits = count_digits(i + 1);
        if int_digits > 0 || frac_digits > 0 {
            i += 1 + frac_digits;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if i < len && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < len && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_digits = count_digits(j);
        if exp_digits > 0 {
            i = j + exp_digits;
        }
    }

    Some(&s[..i])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Object;

    #[test]
    fn test_display_string_primitives() {
        assert_eq!(Value::Undefined.to_display_string(), "undefined");
        assert_eq!(Value::Null.to_display_string(), "null");
        assert_eq!(Value::Bool(true).to_display_string(), "true");
        assert_eq!(Value::from(3).to_display_string(), "3");
        assert_eq!(Value::from("cart").to_display_string(), "cart");
    }

    #[test]
    fn test_display_string_containers() {
        let array = Value::array([Value::from(1), Value::Null, Value::from("x")]);
        assert_eq!(array.to_display_string(), "1,,x");

        let nested = Value::array([Value::from(1), Value::array([Value::from(2), Value::from(3)])]);
        assert_eq!(nested.to_display_string(), "1,2,3");

        let object = Value::Object(Object::new());
        assert_eq!(object.to_display_string(), "[object Object]");
    }

    #[test]
    fn test_display_string_cyclic_array() {
        let array = Array::new();
        array.push(Value::from(1));
        array.push(Value::Array(array.clone()));
        assert_eq!(Value::Array(array).to_display_string(), "1,");
    }

    #[test]
    fn test_display_string_nesting_limit() {
        let nested = |depth: usize| {
            let mut value = Value::from(7);
            for _ in 0..depth {
                value = Value::array([value]);
            }
            value
        };
        assert_eq!(nested(MAX_NESTING_DEPTH).to_display_string(), "7");
        assert_eq!(nested(MAX_NESTING_DEPTH + 1).to_display_string(), "");
        assert_eq!(nested(1_000).to_display_string(), "");
        assert_eq!(nested(1_000).to_number(), 0.0);
    }

    #[test]
    fn test_display_string_function() {
        assert_eq!(Value::function("run").to_display_string(), "[Function: run]");
        assert_eq!(Value::function("").to_display_string(), "[Function]");
        assert_eq!(
            Value::array([Value::from(1), Value::function("cb")]).to_display_string(),
            "1,[Function: cb]"
        );
    }

    #[test]
    fn test_to_number() {
        assert_eq!(Value::Null.to_number(), 0.0);
        assert_eq!(Value::Bool(true).to_number(), 1.0);
        assert_eq!(Value::from(" 42 ").to_number(), 42.0);
        assert_eq!(Value::from("").to_number(), 0.0);
        assert_eq!(Value::from("0x1F").to_number(), 31.0);
        assert_eq!(Value::from("0b101").to_number(), 5.0);
        assert_eq!(Value::from("1e3").to_number(), 1000.0);
        assert_eq!(Value::from("-Infinity").to_number(), f64::NEG_INFINITY);
        assert!(Value::from("12px").to_number().is_nan());
        assert!(Value::from("inf").to_number().is_nan());
        assert!(Value::Undefined.to_number().is_nan());
        assert!(Value::object([("a", Value::from(1))]).to_number().is_nan());
    }

    #[test]
    fn test_to_number_arrays() {
        assert_eq!(Value::Array(Array::new()).to_number(), 0.0);
        assert_eq!(Value::array([Value::from(7)]).to_number(), 7.0);
        assert!(Value::array([Value::from(1), Value::from(2)]).to_number().is_nan());
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(Value::from("2.25abc").parse_float(), 2.25);
        assert_eq!(Value::from("  -2.5e2x").parse_float(), -250.0);
        assert_eq!(Value::from(".5").parse_float(), 0.5);
        assert_eq!(Value::from("5.").parse_float(), 5.0);
        assert_eq!(Value::from("1e").parse_float(), 1.0);
        assert_eq!(Value::from("Infinityx").parse_float(), f64::INFINITY);
        assert!(Value::from("abc").parse_float().is_nan());
        assert!(Value::from(".").parse_float().is_nan());
        assert!(Value::Null.parse_float().is_nan());
    }

    #[test]
    fn test_decimal_prefix() {
        assert_eq!(decimal_prefix("12.5e3rest"), Some("12.5e3"));
        assert_eq!(decimal_prefix("+7"), Some("+7"));
        assert_eq!(decimal_prefix("-"), None);
        assert_eq!(decimal_prefix("e5"), None);
    }
}
