/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Two-tier configuration loading validated against a JSON Schema.
 */

//! Two-tier configuration loading.
//!
//! A project configuration (primary) and an optional local override
//! (secondary) are parsed, each validated against a JSON Schema, merged with
//! the secondary winning, and completed with the schema's defaults:
//!
//! ```rust
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "properties": {
//!         "title": {"type": "string"},
//!         "port": {"type": "integer", "default": 3000},
//!         "views": {"type": "array", "items": {"type": "string"}, "default": ["_views"]}
//!     },
//!     "additionalProperties": false
//! });
//!
//! let config = scriptshim_config::load(
//!     &schema,
//!     "title: My Site\nviews: [a, b]\n",
//!     "_config.yaml",
//!     "views: local\n",
//!     "_localconfig.yaml",
//! )
//! .unwrap();
//!
//! assert_eq!(
//!     config,
//!     json!({"title": "My Site", "views": ["local"], "port": 3000})
//! );
//! ```
//!
//! Every failure comes back as one [`ErrorRecord`] naming the document to
//! blame. The parser and schema compiler are traits ([`DocumentParser`],
//! [`SchemaCompiler`]) so hosts can bring their own through [`Loader`].

mod coerce;
mod error;
mod load;
mod merge;
mod parse;
mod record;
pub mod schema;
mod validator;

/// A configuration document: any JSON value, objects keeping key order.
pub type Document = serde_json::Value;

pub use coerce::CoerceTypes;
pub use error::{
    InstancePath, ParseError, PathSegment, SchemaError, SchemaPath, SchemaResult,
    ValidationError, ValidationErrorKind,
};
pub use load::{DocumentInput, LoadRequest, Loader, load};
pub use merge::merge_documents;
pub use parse::{DocumentParser, JsonParser, YamlParser};
pub use record::{DEFECTIVE_SCHEMA_MARKER, ErrorDetail, ErrorKind, ErrorRecord, ErrorSource};
pub use schema::CompiledSchema;
pub use validator::{
    JsonSchemaCompiler, JsonSchemaValidator, SchemaCompiler, ValidationContext, Validator,
    ValidatorOptions, validate,
};
