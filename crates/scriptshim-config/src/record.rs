/*
 * record.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * The single error value a failed load produces.
 */

use crate::error::{ParseError, SchemaError, ValidationError};
use serde_json::json;
use std::fmt;

/// Prefix of the message for a schema that rejects its own defaults.
pub const DEFECTIVE_SCHEMA_MARKER: &str = "default configuration is invalid (schema is buggy)";

/// Which input a failure is attributed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorSource {
    /// A configuration document, by id (usually a file name).
    Document(String),
    /// The merged result when no document was supplied.
    DefaultConfiguration,
    /// Neither document: the schema itself.
    Internal,
}

impl ErrorSource {
    pub fn document_id(&self) -> Option<&str> {
        match self {
            ErrorSource::Document(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSource::Document(id) => f.write_str(id),
            ErrorSource::DefaultConfiguration => f.write_str("default configuration"),
            ErrorSource::Internal => f.write_str("internal error"),
        }
    }
}

/// The pipeline step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    SchemaCompile,
    DefectiveSchema,
    Validation,
}

/// What went wrong: schema violations, or a single message.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorDetail {
    Violations(Vec<ValidationError>),
    Message(String),
}

impl ErrorDetail {
    fn to_json(&self) -> serde_json::Value {
        match self {
            ErrorDetail::Violations(errors) => serde_json::to_value(errors).unwrap_or_default(),
            ErrorDetail::Message(message) => json!(message),
        }
    }
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorDetail::Violations(errors) => {
                let text = serde_json::to_string(errors).map_err(|_| fmt::Error)?;
                f.write_str(&text)
            }
            ErrorDetail::Message(message) => f.write_str(message),
        }
    }
}

/// Why a configuration load failed.
///
/// Displays as one line, `<source>: <detail>`, with violations rendered as
/// a compact JSON array.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorRecord {
    pub source: ErrorSource,
    pub kind: ErrorKind,
    pub detail: ErrorDetail,
}

impl ErrorRecord {
    pub fn parse(document_id: &str, error: ParseError) -> Self {
        Self {
            source: ErrorSource::Document(document_id.to_string()),
            kind: ErrorKind::Parse,
            detail: ErrorDetail::Message(error.to_string()),
        }
    }

    pub fn schema_compile(error: SchemaError) -> Self {
        Self {
            source: ErrorSource::Internal,
            kind: ErrorKind::SchemaCompile,
            detail: ErrorDetail::Message(error.to_string()),
        }
    }

    pub fn defective_schema(document_id: &str, errors: Vec<ValidationError>) -> Self {
        Self {
            source: ErrorSource::Document(document_id.to_string()),
            kind: ErrorKind::DefectiveSchema,
            detail: ErrorDetail::Violations(errors),
        }
    }

    pub fn validation(source: ErrorSource, errors: Vec<ValidationError>) -> Self {
        Self {
            source,
            kind: ErrorKind::Validation,
            detail: ErrorDetail::Violations(errors),
        }
    }

    /// The violations, when the failure was a validation one.
    pub fn violations(&self) -> &[ValidationError] {
        match &self.detail {
            ErrorDetail::Violations(errors) => errors,
            ErrorDetail::Message(_) => &[],
        }
    }

    /// The `[documentId, errorDetail]` pair, for hosts that report errors
    /// as data. `documentId` is `null` unless a document is to blame; the
    /// detail is an array of violations or a message string.
    pub fn to_json(&self) -> serde_json::Value {
        let detail = match self.kind {
            ErrorKind::DefectiveSchema => json!(format!("{}: {}", DEFECTIVE_SCHEMA_MARKER, self.detail)),
            _ => self.detail.to_json(),
        };
        json!([self.source.document_id(), detail])
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ErrorKind::DefectiveSchema => write!(
                f,
                "{}: {}: {}",
                self.source, DEFECTIVE_SCHEMA_MARKER, self.detail
            ),
            _ => write!(f, "{}: {}", self.source, self.detail),
        }
    }
}

impl std::error::Error for ErrorRecord {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{InstancePath, ValidationErrorKind};

    fn missing(property: &str) -> ValidationError {
        ValidationError::new(
            ValidationErrorKind::MissingRequiredProperty {
                property: property.to_string(),
            },
            InstancePath::new(),
        )
    }

    #[test]
    fn test_parse_record() {
        let record = ErrorRecord::parse(
            "_config.yml",
            ParseError::Syntax {
                message: "bad indent".to_string(),
            },
        );
        assert_eq!(record.to_string(), "_config.yml: Syntax error: bad indent");
        assert_eq!(
            record.to_json(),
            json!(["_config.yml", "Syntax error: bad indent"])
        );
        assert!(record.violations().is_empty());
    }

    #[test]
    fn test_internal_record_has_no_document() {
        let record = ErrorRecord::schema_compile(SchemaError::UnresolvedRef("#/x".to_string()));
        assert_eq!(record.source.document_id(), None);
        assert_eq!(
            record.to_string(),
            "internal error: Unresolved schema reference: #/x"
        );
        assert_eq!(record.to_json()[0], json!(null));
    }

    #[test]
    fn test_violations_render_as_json() {
        let record = ErrorRecord::validation(
            ErrorSource::Document("_localconfig.yml".to_string()),
            vec![missing("title")],
        );
        let line = record.to_string();
        let (source, detail) = line.split_once(": ").unwrap();
        assert_eq!(source, "_localconfig.yml");
        let parsed: serde_json::Value = serde_json::from_str(detail).unwrap();
        assert_eq!(parsed[0]["message"], json!("Missing required property 'title'"));
        assert_eq!(record.violations().len(), 1);
    }

    #[test]
    fn test_defective_schema_marker() {
        let record = ErrorRecord::defective_schema("_config.yml", vec![missing("title")]);
        assert!(
            record
                .to_string()
                .starts_with("_config.yml: default configuration is invalid (schema is buggy): [")
        );
        let json = record.to_json();
        assert_eq!(json[0], json!("_config.yml"));
        assert!(json[1].as_str().unwrap().starts_with(DEFECTIVE_SCHEMA_MARKER));
    }

    #[test]
    fn test_default_configuration_source() {
        let record = ErrorRecord::validation(ErrorSource::DefaultConfiguration, vec![missing("a")]);
        assert!(record.to_string().starts_with("default configuration: ["));
        assert_eq!(record.to_json()[0], json!(null));
    }
}
