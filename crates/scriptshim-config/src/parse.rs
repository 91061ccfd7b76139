/*
 * parse.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Document parsers: configuration text to JSON-compatible documents.
 */

use crate::Document;
use crate::error::ParseError;
use serde_json::{Map, Number};
use yaml_rust2::{Yaml, YamlLoader};

/// Turns configuration text into a [`Document`].
///
/// `document_id` names the source for diagnostics only.
pub trait DocumentParser {
    fn parse(&self, text: &str, document_id: &str) -> Result<Document, ParseError>;
}

impl<T: DocumentParser + ?Sized> DocumentParser for &T {
    fn parse(&self, text: &str, document_id: &str) -> Result<Document, ParseError> {
        (**self).parse(text, document_id)
    }
}

/// YAML 1.2 parser.
///
/// Only the first document of a multi-document stream is used. Text with no
/// YAML node at all (empty, or only comments) parses to `null`. Aliases are
/// resolved, non-string mapping keys are stringified, and non-finite floats
/// become `null`.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlParser;

impl DocumentParser for YamlParser {
    fn parse(&self, text: &str, document_id: &str) -> Result<Document, ParseError> {
        let documents = YamlLoader::load_from_str(text).map_err(|e| ParseError::Syntax {
            message: e.to_string(),
        })?;

        if documents.len() > 1 {
            tracing::debug!(
                document = document_id,
                count = documents.len(),
                "ignoring all but the first YAML document"
            );
        }

        match documents.first() {
            Some(yaml) => yaml_to_document(yaml),
            None => Ok(Document::Null),
        }
    }
}

/// JSON parser, for hosts that keep configuration as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonParser;

impl DocumentParser for JsonParser {
    fn parse(&self, text: &str, _document_id: &str) -> Result<Document, ParseError> {
        serde_json::from_str(text).map_err(|e| ParseError::Syntax {
            message: e.to_string(),
        })
    }
}

fn yaml_to_document(value: &Yaml) -> Result<Document, ParseError> {
    Ok(match value {
        Yaml::Null => Document::Null,
        Yaml::Boolean(b) => Document::Bool(*b),
        Yaml::Integer(n) => Document::Number((*n).into()),
        Yaml::Real(_) => value
            .as_f64()
            .and_then(Number::from_f64)
            .map_or(Document::Null, Document::Number),
        Yaml::String(s) => Document::String(s.clone()),
        Yaml::Array(items) => {
            Document::Array(items.iter().map(yaml_to_document).collect::<Result<_, _>>()?)
        }
        Yaml::Hash(entries) => {
            let mut map = Map::new();
            for (key, value) in entries {
                map.insert(key_to_string(key)?, yaml_to_document(value)?);
            }
            Document::Object(map)
        }
        Yaml::Alias(_) | Yaml::BadValue => {
            return Err(ParseError::InvalidStructure {
                message: "unresolvable alias or malformed value".to_string(),
            });
        }
    })
}

fn key_to_string(key: &Yaml) -> Result<String, ParseError> {
    match key {
        Yaml::String(s) | Yaml::Real(s) => Ok(s.clone()),
        Yaml::Integer(n) => Ok(n.to_string()),
        Yaml::Boolean(b) => Ok(b.to_string()),
        Yaml::Null => Ok("null".to_string()),
        _ => Err(ParseError::InvalidStructure {
            message: format!("mapping key must be a scalar, got {}", yaml_type_name(key)),
        }),
    }
}

fn yaml_type_name(value: &Yaml) -> &'static str {
    match value {
        Yaml::Null | Yaml::BadValue => "null",
        Yaml::Boolean(_) => "boolean",
        Yaml::Integer(_) => "integer",
        Yaml::Real(_) => "float",
        Yaml::String(_) => "string",
        Yaml::Array(_) => "array",
        Yaml::Hash(_) => "object",
        Yaml::Alias(_) => "alias",
    }
}
