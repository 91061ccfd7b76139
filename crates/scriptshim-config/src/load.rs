/*
 * load.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Two-tier configuration loading: validate, strip defaults, merge, fill in.
 */

use crate::Document;
use crate::merge::merge_documents;
use crate::parse::{DocumentParser, YamlParser};
use crate::record::{ErrorRecord, ErrorSource};
use crate::validator::{JsonSchemaCompiler, SchemaCompiler, Validator};
use serde_json::Map;
use tracing::{debug, warn};

/// One configuration document: its text and the id errors are tagged with.
///
/// Empty text means the document was not supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentInput<'a> {
    pub text: &'a str,
    pub id: &'a str,
}

impl<'a> DocumentInput<'a> {
    pub fn new(text: &'a str, id: &'a str) -> Self {
        Self { text, id }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Everything a load needs.
#[derive(Debug, Clone, Copy)]
pub struct LoadRequest<'a> {
    /// The JSON Schema, already parsed.
    pub schema: &'a Document,
    /// The project configuration.
    pub primary: DocumentInput<'a>,
    /// Local overrides, merged over the primary document.
    pub secondary: Option<DocumentInput<'a>>,
}

/// Loads configuration with a pluggable parser and schema compiler.
///
/// # Example
///
/// ```rust
/// use scriptshim_config::{DocumentInput, JsonSchemaCompiler, LoadRequest, Loader, YamlParser};
/// use serde_json::json;
///
/// let schema = json!({
///     "type": "object",
///     "properties": {
///         "title": {"type": "string"},
///         "paths": {
///             "type": "object",
///             "default": {},
///             "properties": {"site": {"type": "string", "default": "_site"}}
///         }
///     }
/// });
///
/// let config = Loader::new(YamlParser, JsonSchemaCompiler::default())
///     .load(&LoadRequest {
///         schema: &schema,
///         primary: DocumentInput::new("title: My Site\n", "_config.yaml"),
///         secondary: None,
///     })
///     .unwrap();
///
/// assert_eq!(config, json!({"title": "My Site", "paths": {"site": "_site"}}));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Loader<P = YamlParser, C = JsonSchemaCompiler> {
    parser: P,
    compiler: C,
}

impl<P: DocumentParser, C: SchemaCompiler> Loader<P, C> {
    pub fn new(parser: P, compiler: C) -> Self {
        Self { parser, compiler }
    }

    /// Validate and merge the request's documents.
    ///
    /// 1. Compile the schema.
    /// 2. Validate `{}`; a schema that rejects its own defaults is defective.
    /// 3. Parse and validate the primary document, keeping it without
    ///    injected defaults.
    /// 4. Same for the secondary document, then merge it over the primary.
    /// 5. Validate the merged document, which fills in remaining defaults.
    ///
    /// The first failing step ends the load with exactly one [`ErrorRecord`].
    pub fn load(&self, request: &LoadRequest<'_>) -> Result<Document, ErrorRecord> {
        let validator = self.compiler.compile(request.schema).map_err(|e| {
            warn!(error = %e, "schema does not compile");
            ErrorRecord::schema_compile(e)
        })?;

        let mut baseline = Document::Object(Map::new());
        validator.validate(&mut baseline).map_err(|errors| {
            warn!(violations = errors.len(), "schema rejects its own defaults");
            ErrorRecord::defective_schema(request.primary.id, errors)
        })?;

        let mut working = Document::Object(Map::new());
        let mut last_source = ErrorSource::DefaultConfiguration;

        if !request.primary.is_empty() {
            working = self.load_layer(&validator, &request.primary)?;
            last_source = ErrorSource::Document(request.primary.id.to_string());
        }

        if let Some(secondary) = request.secondary.as_ref().filter(|input| !input.is_empty()) {
            let layer = self.load_layer(&validator, secondary)?;
            merge_documents(&mut working, layer);
            last_source = ErrorSource::Document(secondary.id.to_string());
        }

        validator.validate(&mut working).map_err(|errors| {
            warn!(source = %last_source, violations = errors.len(), "merged configuration is invalid");
            ErrorRecord::validation(last_source.clone(), errors)
        })?;

        debug!(source = %last_source, "configuration loaded");
        Ok(working)
    }

    /// Parse and validate one document, returning it as parsed: the
    /// validator works on a copy, so injected defaults and coercions do
    /// not leak into the layer.
    fn load_layer(
        &self,
        validator: &C::Validator,
        input: &DocumentInput<'_>,
    ) -> Result<Document, ErrorRecord> {
        debug!(document = input.id, "loading configuration document");

        let parsed = self.parser.parse(input.text, input.id).map_err(|e| {
            warn!(document = input.id, error = %e, "configuration does not parse");
            ErrorRecord::parse(input.id, e)
        })?;

        let mut checked = parsed.clone();
        validator.validate(&mut checked).map_err(|errors| {
            warn!(document = input.id, violations = errors.len(), "configuration is invalid");
            ErrorRecord::validation(ErrorSource::Document(input.id.to_string()), errors)
        })?;

        Ok(parsed)
    }
}

/// Load configuration with the YAML parser and the built-in JSON Schema
/// validator (defaults on, array-mode coercion).
///
/// Empty text stands for an absent document.
pub fn load(
    schema: &Document,
    primary_text: &str,
    primary_id: &str,
    secondary_text: &str,
    secondary_id: &str,
) -> Result<Document, ErrorRecord> {
    Loader::<YamlParser, JsonSchemaCompiler>::default().load(&LoadRequest {
        schema,
        primary: DocumentInput::new(primary_text, primary_id),
        secondary: Some(DocumentInput::new(secondary_text, secondary_id)),
    })
}
