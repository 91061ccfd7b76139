/*
 * schema/mod.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Compiled JSON Schema (draft-07 subset) representation.
 */

//! Compiled schemas.
//!
//! A schema document is compiled once into a tree of [`Schema`] nodes. Local
//! `$ref` targets are compiled alongside the root and looked up through
//! [`CompiledSchema::resolve`] during validation.

mod compile;
mod helpers;

use crate::Document;
use crate::error::SchemaResult;
use indexmap::IndexMap;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;

/// A compiled schema node.
#[derive(Debug, Clone)]
pub enum Schema {
    /// `true` or `{}`-like: accepts everything.
    True,
    /// `false`: rejects everything.
    False,
    /// An object schema with its keywords.
    Rules(Box<Rules>),
}

impl Schema {
    /// The `default` keyword, if this node carries one.
    pub fn default_value(&self) -> Option<&Document> {
        match self {
            Schema::Rules(rules) => rules.default.as_ref(),
            _ => None,
        }
    }
}

/// The keywords of an object schema. Absent keywords are `None` or empty.
#[derive(Debug, Clone, Default)]
pub struct Rules {
    /// `$ref`. When set, sibling keywords are ignored.
    pub reference: Option<String>,

    pub types: Option<Vec<InstanceType>>,
    pub enum_values: Option<Vec<Document>>,
    pub const_value: Option<Document>,
    pub default: Option<Document>,

    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: Option<f64>,
    pub exclusive_maximum: Option<f64>,
    pub multiple_of: Option<f64>,

    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Pattern>,

    pub items: Option<Items>,
    pub additional_items: Option<Box<Schema>>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    pub unique_items: bool,
    pub contains: Option<Box<Schema>>,

    pub properties: IndexMap<String, Schema>,
    pub pattern_properties: Vec<(Pattern, Schema)>,
    pub additional_properties: Option<Box<Schema>>,
    pub required: Vec<String>,
    pub min_properties: Option<usize>,
    pub max_properties: Option<usize>,
    pub property_names: Option<Box<Schema>>,
    pub dependencies: IndexMap<String, Dependency>,

    pub all_of: Vec<Schema>,
    pub any_of: Vec<Schema>,
    pub one_of: Vec<Schema>,
    pub not: Option<Box<Schema>>,
    pub if_schema: Option<Box<Schema>>,
    pub then_schema: Option<Box<Schema>>,
    pub else_schema: Option<Box<Schema>>,
}

/// The `items` keyword.
#[derive(Debug, Clone)]
pub enum Items {
    /// Every element matches one schema.
    Single(Box<Schema>),
    /// Positional schemas; the rest fall to `additionalItems`.
    Tuple(Vec<Schema>),
}

/// One entry of the `dependencies` keyword.
#[derive(Debug, Clone)]
pub enum Dependency {
    /// The listed properties must also be present.
    Properties(Vec<String>),
    /// The whole object must match this schema.
    Schema(Schema),
}

/// A compiled `pattern`, keeping its source text for messages.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            source: source.to_string(),
            regex: Regex::new(source)?,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Unanchored search, as JSON Schema patterns are.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// The JSON Schema primitive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceType {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl InstanceType {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "null" => InstanceType::Null,
            "boolean" => InstanceType::Boolean,
            "integer" => InstanceType::Integer,
            "number" => InstanceType::Number,
            "string" => InstanceType::String,
            "array" => InstanceType::Array,
            "object" => InstanceType::Object,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceType::Null => "null",
            InstanceType::Boolean => "boolean",
            InstanceType::Integer => "integer",
            InstanceType::Number => "number",
            InstanceType::String => "string",
            InstanceType::Array => "array",
            InstanceType::Object => "object",
        }
    }

    /// Check if `value` is an instance of this type.
    ///
    /// `integer` accepts any number without a fractional part, `number`
    /// accepts integers too.
    pub fn matches(&self, value: &Document) -> bool {
        match (self, value) {
            (InstanceType::Null, Document::Null)
            | (InstanceType::Boolean, Document::Bool(_))
            | (InstanceType::Number, Document::Number(_))
            | (InstanceType::String, Document::String(_))
            | (InstanceType::Array, Document::Array(_))
            | (InstanceType::Object, Document::Object(_)) => true,
            (InstanceType::Integer, Document::Number(n)) => {
                n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
            }
            _ => false,
        }
    }

    /// The most specific type name for `value`.
    pub fn name_of(value: &Document) -> &'static str {
        match value {
            Document::Null => "null",
            Document::Bool(_) => "boolean",
            Document::Number(_) if InstanceType::Integer.matches(value) => "integer",
            Document::Number(_) => "number",
            Document::String(_) => "string",
            Document::Array(_) => "array",
            Document::Object(_) => "object",
        }
    }
}

impl fmt::Display for InstanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compiled schema document: the root node plus every local `$ref`
/// target it mentions.
#[derive(Debug, Clone)]
pub struct CompiledSchema {
    root: Schema,
    definitions: HashMap<String, Schema>,
}

impl CompiledSchema {
    /// Compile a schema document.
    ///
    /// Fails with a [`SchemaError`](crate::SchemaError) on malformed keywords,
    /// invalid regexes and `$ref`s that are not local or do not resolve.
    pub fn compile(document: &Document) -> SchemaResult<Self> {
        compile::compile_document(document)
    }

    pub fn root(&self) -> &Schema {
        &self.root
    }

    /// Look up a `$ref` target (`#`, `#/definitions/name`, ...).
    pub fn resolve(&self, reference: &str) -> Option<&Schema> {
        if reference == "#" {
            Some(&self.root)
        } else {
            self.definitions.get(reference)
        }
    }
}
