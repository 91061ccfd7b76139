/*
 * json.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Structural (JSON) serialization of script values.
 */

use crate::value::{ContainerId, MAX_NESTING_DEPTH, Value};
use thiserror::Error;

/// Errors produced when a value has no JSON representation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JsonError {
    /// The value contains itself.
    #[error("Converting circular structure to JSON")]
    CircularStructure,

    /// The value contains a callable.
    #[error("Cannot serialize a function to JSON")]
    Function {
        /// Name of the offending function, if it has one
        name: Option<String>,
    },

    /// Containers are nested deeper than [`MAX_NESTING_DEPTH`].
    #[error("Value is nested too deeply to serialize to JSON")]
    TooDeep,
}

impl Value {
    /// Serialize to a JSON value.
    ///
    /// Returns `Ok(None)` for a top-level `undefined`, which has no JSON
    /// text. Inside containers, `undefined` members are skipped, `undefined`
    /// elements and holes become `null`, and non-finite numbers become
    /// `null`. Integral numbers are emitted as JSON integers.
    ///
    /// # Errors
    ///
    /// Fails on cycles (a container reached again below itself), on
    /// functions anywhere in the value, and on containers nested deeper than
    /// [`MAX_NESTING_DEPTH`].
    pub fn to_json(&self) -> Result<Option<serde_json::Value>, JsonError> {
        let mut ancestors = Vec::new();
        to_json_inner(self, &mut ancestors)
    }

    /// Serialize to compact JSON text.
    ///
    /// A top-level `undefined` renders as the token `undefined`.
    ///
    /// # Errors
    ///
    /// See [`Value::to_json`].
    pub fn to_json_string(&self) -> Result<String, JsonError> {
        Ok(match self.to_json()? {
            Some(json) => json.to_string(),
            None => "undefined".to_string(),
        })
    }
}

fn to_json_inner(
    value: &Value,
    ancestors: &mut Vec<ContainerId>,
) -> Result<Option<serde_json::Value>, JsonError> {
    match value {
        Value::Undefined => Ok(None),
        Value::Null => Ok(Some(serde_json::Value::Null)),
        Value::Bool(b) => Ok(Some(serde_json::Value::Bool(*b))),
        Value::Number(n) => Ok(Some(number_to_json(*n))),
        Value::String(s) => Ok(Some(serde_json::Value::String(s.clone()))),
        Value::Function(f) => Err(JsonError::Function {
            name: f.name().map(String::from),
        }),
        Value::Array(array) => {
            enter(array.id(), ancestors)?;
            let mut items = Vec::with_capacity(array.len());
            for slot in array.slots().iter() {
                let item = match slot {
                    Some(value) => to_json_inner(value, ancestors)?,
                    None => None,
                };
                items.push(item.unwrap_or(serde_json::Value::Null));
            }
            ancestors.pop();
            Ok(Some(serde_json::Value::Array(items)))
        }
        Value::Object(object) => {
            enter(object.id(), ancestors)?;
            let mut map = serde_json::Map::new();
            for (key, value) in object.entries() {
                if let Some(json) = to_json_inner(&value, ancestors)? {
                    map.insert(key, json);
                }
            }
            ancestors.pop();
            Ok(Some(serde_json::Value::Object(map)))
        }
    }
}

/// Record `id` as the container being serialized below the current ones.
fn enter(id: ContainerId, ancestors: &mut Vec<ContainerId>) -> Result<(), JsonError> {
    if ancestors.contains(&id) {
        return Err(JsonError::CircularStructure);
    }
    if ancestors.len() >= MAX_NESTING_DEPTH {
        return Err(JsonError::TooDeep);
    }
    ancestors.push(id);
    Ok(())
}

/// Largest integer magnitude a double represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

fn number_to_json(n: f64) -> serde_json::Value {
    if !n.is_finite() {
        return serde_json::Value::Null;
    }
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        // Also folds -0 into 0.
        return serde_json::Value::Number((n as i64).into());
    }
    serde_json::Number::from_f64(n)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}
