/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Error types for document parsing, schema compilation and validation.
 */

use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Errors raised while turning document text into a [`Document`](crate::Document).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The text is not well-formed.
    #[error("Syntax error: {message}")]
    Syntax { message: String },

    /// The text is well-formed but has no JSON-compatible representation.
    #[error("Invalid document structure: {message}")]
    InvalidStructure { message: String },
}

/// Errors raised while compiling a schema document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A schema node is neither an object nor a boolean.
    #[error("Invalid schema at {path}: expected an object or boolean, got {got}")]
    InvalidNode { path: String, got: String },

    /// Unknown name in a `type` keyword.
    #[error("Invalid schema type '{name}' at {path}")]
    InvalidType { name: String, path: String },

    /// A keyword carries a value of the wrong shape.
    #[error("Invalid value for '{keyword}' at {path}: {message}")]
    InvalidKeyword {
        keyword: String,
        path: String,
        message: String,
    },

    /// A `pattern` or `patternProperties` key does not compile.
    #[error("Invalid regex pattern '{pattern}' at {path}: {message}")]
    InvalidPattern {
        pattern: String,
        path: String,
        message: String,
    },

    /// A local `$ref` does not point at anything in the schema document.
    #[error("Unresolved schema reference: {0}")]
    UnresolvedRef(String),

    /// A `$ref` that is not a local `#...` pointer.
    #[error("Unsupported schema reference: {0} (only local references are supported)")]
    UnsupportedRef(String),
}

/// Result type for schema compilation
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Structured validation error kinds
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ValidationErrorKind {
    /// Type mismatch
    TypeMismatch { expected: String, got: String },

    /// Missing required property
    MissingRequiredProperty { property: String },

    /// Property not allowed by `additionalProperties: false`
    UnknownProperty { property: String },

    /// Value not in enum
    InvalidEnumValue { value: String, allowed: Vec<String> },

    /// Value differs from `const`
    ConstMismatch { value: String, expected: String },

    /// Number out of range
    NumberOutOfRange {
        value: f64,
        minimum: Option<f64>,
        maximum: Option<f64>,
        exclusive_minimum: Option<f64>,
        exclusive_maximum: Option<f64>,
    },

    /// Number not a multiple of
    NumberNotMultipleOf { value: f64, multiple_of: f64 },

    /// String length invalid
    StringLengthInvalid {
        length: usize,
        min_length: Option<usize>,
        max_length: Option<usize>,
    },

    /// String doesn't match pattern
    StringPatternMismatch { value: String, pattern: String },

    /// Array length invalid
    ArrayLengthInvalid {
        length: usize,
        min_items: Option<usize>,
        max_items: Option<usize>,
    },

    /// Array items not unique
    ArrayItemsNotUnique,

    /// No array item matches `contains`
    ArrayContainsNone,

    /// Object property count invalid
    ObjectPropertyCountInvalid {
        count: usize,
        min_properties: Option<usize>,
        max_properties: Option<usize>,
    },

    /// A property named in `dependencies` requires another one
    MissingDependency { property: String, dependency: String },

    /// No `anyOf` branch matched
    NoMatchingSubschema,

    /// `oneOf` matched zero or several branches
    OneOfMismatch { matched: usize },

    /// The `not` subschema matched
    NotSchemaMatched,

    /// The `false` schema rejects everything
    FalseSchema,

    /// Unresolved schema reference
    UnresolvedReference { ref_id: String },

    /// Other validation error, for host validators with no better variant.
    Other { message: String },
}

impl ValidationErrorKind {
    /// Get the error code for this error kind
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationErrorKind::MissingRequiredProperty { .. } => "S-1-10",
            ValidationErrorKind::TypeMismatch { .. } => "S-1-11",
            ValidationErrorKind::InvalidEnumValue { .. }
            | ValidationErrorKind::ConstMismatch { .. } => "S-1-12",
            ValidationErrorKind::ArrayLengthInvalid { .. } => "S-1-13",
            ValidationErrorKind::StringPatternMismatch { .. } => "S-1-14",
            ValidationErrorKind::NumberOutOfRange { .. }
            | ValidationErrorKind::NumberNotMultipleOf { .. } => "S-1-15",
            ValidationErrorKind::ObjectPropertyCountInvalid { .. } => "S-1-16",
            ValidationErrorKind::UnresolvedReference { .. } => "S-1-17",
            ValidationErrorKind::UnknownProperty { .. } => "S-1-18",
            ValidationErrorKind::ArrayItemsNotUnique
            | ValidationErrorKind::ArrayContainsNone => "S-1-19",
            ValidationErrorKind::StringLengthInvalid { .. } => "S-1-20",
            ValidationErrorKind::MissingDependency { .. } => "S-1-21",
            ValidationErrorKind::NoMatchingSubschema
            | ValidationErrorKind::OneOfMismatch { .. }
            | ValidationErrorKind::NotSchemaMatched
            | ValidationErrorKind::FalseSchema => "S-1-22",
            ValidationErrorKind::Other { .. } => "S-1-99",
        }
    }

    /// Format a human-readable message from this error kind
    pub fn message(&self) -> String {
        match self {
            ValidationErrorKind::TypeMismatch { expected, got } => {
                format!("Expected {}, got {}", expected, got)
            }
            ValidationErrorKind::MissingRequiredProperty { property } => {
                format!("Missing required property '{}'", property)
            }
            ValidationErrorKind::UnknownProperty { property } => {
                format!("Unknown property '{}'", property)
            }
            ValidationErrorKind::InvalidEnumValue { value, allowed } => {
                format!(
                    "Value must be one of: {}, got {}",
                    allowed.join(", "),
                    value
                )
            }
            ValidationErrorKind::ConstMismatch { value, expected } => {
                format!("Value must be {}, got {}", expected, value)
            }
            ValidationErrorKind::NumberOutOfRange {
                value,
                minimum,
                maximum,
                exclusive_minimum,
                exclusive_maximum,
            } => {
                if let Some(min) = minimum {
                    format!("Number {} is less than minimum {}", value, min)
                } else if let Some(max) = maximum {
                    format!("Number {} is greater than maximum {}", value, max)
                } else if let Some(min) = exclusive_minimum {
                    format!("Number {} is not greater than {}", value, min)
                } else if let Some(max) = exclusive_maximum {
                    format!("Number {} is not less than {}", value, max)
                } else {
                    format!("Number {} is out of range", value)
                }
            }
            ValidationErrorKind::NumberNotMultipleOf { value, multiple_of } => {
                format!("Number {} is not a multiple of {}", value, multiple_of)
            }
            ValidationErrorKind::StringLengthInvalid {
                length,
                min_length,
                max_length,
            } => {
                if let Some(min) = min_length {
                    format!("String length {} is less than minimum {}", length, min)
                } else if let Some(max) = max_length {
                    format!("String length {} is greater than maximum {}", length, max)
                } else {
                    format!("String length {} is invalid", length)
                }
            }
            ValidationErrorKind::StringPatternMismatch { value, pattern } => {
                format!("String '{}' does not match pattern '{}'", value, pattern)
            }
            ValidationErrorKind::ArrayLengthInvalid {
                length,
                min_items,
                max_items,
            } => {
                if let Some(min) = min_items {
                    format!("Array length {} is less than minimum {}", length, min)
                } else if let Some(max) = max_items {
                    format!("Array length {} is greater than maximum {}", length, max)
                } else {
                    format!("Array length {} is invalid", length)
                }
            }
            ValidationErrorKind::ArrayItemsNotUnique => "Array items must be unique".to_string(),
            ValidationErrorKind::ArrayContainsNone => {
                "Array must contain at least one matching item".to_string()
            }
            ValidationErrorKind::ObjectPropertyCountInvalid {
                count,
                min_properties,
                max_properties,
            } => {
                if let Some(min) = min_properties {
                    format!("Object has {} properties, less than minimum {}", count, min)
                } else if let Some(max) = max_properties {
                    format!(
                        "Object has {} properties, greater than maximum {}",
                        count, max
                    )
                } else {
                    format!("Object has {} properties (invalid)", count)
                }
            }
            ValidationErrorKind::MissingDependency {
                property,
                dependency,
            } => {
                format!(
                    "Property '{}' is required when '{}' is present",
                    dependency, property
                )
            }
            ValidationErrorKind::NoMatchingSubschema => {
                "Value does not match any allowed schema".to_string()
            }
            ValidationErrorKind::OneOfMismatch { matched } => {
                format!("Value must match exactly one schema, matched {}", matched)
            }
            ValidationErrorKind::NotSchemaMatched => {
                "Value must not match the excluded schema".to_string()
            }
            ValidationErrorKind::FalseSchema => "No value is allowed here".to_string(),
            ValidationErrorKind::UnresolvedReference { ref_id } => {
                format!("Unresolved schema reference: {}", ref_id)
            }
            ValidationErrorKind::Other { message } => message.clone(),
        }
    }
}

/// A single schema violation found in a document.
#[derive(Debug, Clone, PartialEq, Error)]
pub struct ValidationError {
    /// The structured error kind
    pub kind: ValidationErrorKind,
    /// Instance path where the error occurred (e.g., ["paths", "views", 0])
    pub instance_path: InstancePath,
    /// Schema path that failed (e.g., ["properties", "paths", "type"])
    pub schema_path: SchemaPath,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Validation error at {}: {}",
            self.instance_path,
            self.kind.message()
        )
    }
}

impl Serialize for ValidationError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut s = serializer.serialize_struct("ValidationError", 5)?;
        s.serialize_field("code", self.error_code())?;
        s.serialize_field("instancePath", &self.instance_path)?;
        s.serialize_field("schemaPath", &self.schema_path)?;
        s.serialize_field("message", &self.message())?;
        s.serialize_field("kind", &self.kind)?;
        s.end()
    }
}

impl ValidationError {
    /// Create a new validation error with a structured kind
    pub fn new(kind: ValidationErrorKind, instance_path: InstancePath) -> Self {
        Self {
            kind,
            instance_path,
            schema_path: SchemaPath::new(),
        }
    }

    /// Get the human-readable message for this error
    pub fn message(&self) -> String {
        self.kind.message()
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        self.kind.error_code()
    }

    /// Set the schema path for this error
    pub fn with_schema_path(mut self, schema_path: SchemaPath) -> Self {
        self.schema_path = schema_path;
        self
    }
}

/// Instance path (e.g., ["paths", "views", 0])
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstancePath {
    segments: Vec<PathSegment>,
}

impl InstancePath {
    /// Create a new empty instance path
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    /// Pop the last segment from the path
    pub fn pop(&mut self) -> Option<PathSegment> {
        self.segments.pop()
    }
}

impl fmt::Display for InstancePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            write!(f, "(root)")
        } else {
            for (i, segment) in self.segments.iter().enumerate() {
                if i > 0 {
                    write!(f, ".")?;
                }
                write!(f, "{}", segment)?;
            }
            Ok(())
        }
    }
}

impl Serialize for InstancePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Schema path (e.g., ["properties", "paths", "type"])
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaPath {
    segments: Vec<String>,
}

impl SchemaPath {
    /// Create a new empty schema path
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Push a segment onto the path
    pub fn push(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }

    /// Pop the last segment from the path
    pub fn pop(&mut self) -> Option<String> {
        self.segments.pop()
    }

    /// Get the segments as a slice
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Check if the path is empty
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            write!(f, "(root)")
        } else {
            write!(f, "{}", self.segments.join(" > "))
        }
    }
}

impl Serialize for SchemaPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A segment in an instance path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Object key
    Key(String),
    /// Array index
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{}", key),
            PathSegment::Index(index) => write!(f, "[{}]", index),
        }
    }
}
