/*
 * compile.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Compilation of schema documents into typed schema nodes.
 */

//! Schema compiler
//!
//! Walks a schema document and builds [`Schema`] nodes. Every local `$ref`
//! seen along the way is queued, and the queue is drained after the root so
//! that each target is compiled once, however many times it is referenced
//! (recursive references included).

use super::helpers::{
    escape_pointer_segment, get_bool, get_count, get_non_empty_array, get_number, get_object,
    get_positive_number, get_string, string_list,
};
use super::{CompiledSchema, Dependency, InstanceType, Items, Pattern, Rules, Schema};
use crate::Document;
use crate::error::{SchemaError, SchemaPath, SchemaResult};
use indexmap::IndexMap;
use serde_json::Map;
use std::collections::HashMap;

pub(super) fn compile_document(document: &Document) -> SchemaResult<CompiledSchema> {
    let mut compiler = Compiler::default();
    let root = compiler.compile(document, &SchemaPath::new())?;

    // Definitions are compiled even when unreferenced, so a broken one is
    // reported up front.
    if let Document::Object(map) = document {
        for container in ["definitions", "$defs"] {
            if let Some(Document::Object(definitions)) = map.get(container) {
                for name in definitions.keys() {
                    compiler
                        .pending
                        .push(format!("#/{}/{}", container, escape_pointer_segment(name)));
                }
            }
        }
    }

    let mut definitions = HashMap::new();
    while let Some(reference) = compiler.pending.pop() {
        if reference == "#" || definitions.contains_key(&reference) {
            continue;
        }
        let target = reference
            .strip_prefix('#')
            .and_then(|pointer| document.pointer(pointer))
            .ok_or_else(|| SchemaError::UnresolvedRef(reference.clone()))?;
        let mut path = SchemaPath::new();
        path.push(reference.clone());
        let schema = compiler.compile(target, &path)?;
        definitions.insert(reference, schema);
    }

    tracing::trace!(definitions = definitions.len(), "compiled schema");
    Ok(CompiledSchema { root, definitions })
}

#[derive(Default)]
struct Compiler {
    pending: Vec<String>,
}

fn child(path: &SchemaPath, segments: &[&str]) -> SchemaPath {
    let mut path = path.clone();
    for segment in segments {
        path.push(*segment);
    }
    path
}

impl Compiler {
    fn compile(&mut self, node: &Document, path: &SchemaPath) -> SchemaResult<Schema> {
        match node {
            Document::Bool(true) => Ok(Schema::True),
            Document::Bool(false) => Ok(Schema::False),
            Document::Object(map) => Ok(Schema::Rules(Box::new(self.compile_rules(map, path)?))),
            other => Err(SchemaError::InvalidNode {
                path: path.to_string(),
                got: InstanceType::name_of(other).to_string(),
            }),
        }
    }

    fn compile_boxed(
        &mut self,
        map: &Map<String, Document>,
        keyword: &str,
        path: &SchemaPath,
    ) -> SchemaResult<Option<Box<Schema>>> {
        match map.get(keyword) {
            Some(node) => Ok(Some(Box::new(
                self.compile(node, &child(path, &[keyword]))?,
            ))),
            None => Ok(None),
        }
    }

    fn compile_list(
        &mut self,
        map: &Map<String, Document>,
        keyword: &str,
        path: &SchemaPath,
    ) -> SchemaResult<Vec<Schema>> {
        let Some(nodes) = get_non_empty_array(map, keyword, path)? else {
            return Ok(Vec::new());
        };
        nodes
            .iter()
            .enumerate()
            .map(|(i, node)| self.compile(node, &child(path, &[keyword, i.to_string().as_str()])))
            .collect()
    }

    fn compile_rules(
        &mut self,
        map: &Map<String, Document>,
        path: &SchemaPath,
    ) -> SchemaResult<Rules> {
        let mut rules = Rules::default();

        if let Some(reference) = get_string(map, "$ref", path)? {
            if !reference.starts_with('#') {
                return Err(SchemaError::UnsupportedRef(reference.to_string()));
            }
            self.pending.push(reference.to_string());
            rules.reference = Some(reference.to_string());
            // Siblings of `$ref` are ignored in draft-07.
            return Ok(rules);
        }

        rules.types = self.compile_types(map, path)?;
        if let Some(values) = get_non_empty_array(map, "enum", path)? {
            rules.enum_values = Some(values.clone());
        }
        rules.const_value = map.get("const").cloned();
        rules.default = map.get("default").cloned();

        rules.minimum = get_number(map, "minimum", path)?;
        rules.maximum = get_number(map, "maximum", path)?;
        rules.exclusive_minimum = get_number(map, "exclusiveMinimum", path)?;
        rules.exclusive_maximum = get_number(map, "exclusiveMaximum", path)?;
        rules.multiple_of = get_positive_number(map, "multipleOf", path)?;

        rules.min_length = get_count(map, "minLength", path)?;
        rules.max_length = get_count(map, "maxLength", path)?;
        if let Some(source) = get_string(map, "pattern", path)? {
            rules.pattern = Some(compile_pattern(source, &child(path, &["pattern"]))?);
        }

        rules.items = match map.get("items") {
            Some(Document::Array(nodes)) => Some(Items::Tuple(
                nodes
                    .iter()
                    .enumerate()
                    .map(|(i, node)| self.compile(node, &child(path, &["items", i.to_string().as_str()])))
                    .collect::<SchemaResult<_>>()?,
            )),
            Some(node) => Some(Items::Single(Box::new(
                self.compile(node, &child(path, &["items"]))?,
            ))),
            None => None,
        };
        rules.additional_items = self.compile_boxed(map, "additionalItems", path)?;
        rules.min_items = get_count(map, "minItems", path)?;
        rules.max_items = get_count(map, "maxItems", path)?;
        rules.unique_items = get_bool(map, "uniqueItems", path)?.unwrap_or(false);
        rules.contains = self.compile_boxed(map, "contains", path)?;

        if let Some(properties) = get_object(map, "properties", path)? {
            for (name, node) in properties {
                let schema = self.compile(node, &child(path, &["properties", name.as_str()]))?;
                rules.properties.insert(name.clone(), schema);
            }
        }
        if let Some(patterns) = get_object(map, "patternProperties", path)? {
            for (source, node) in patterns {
                let at = child(path, &["patternProperties", source.as_str()]);
                rules
                    .pattern_properties
                    .push((compile_pattern(source, &at)?, self.compile(node, &at)?));
            }
        }
        rules.additional_properties = self.compile_boxed(map, "additionalProperties", path)?;
        if let Some(required) = map.get("required") {
            rules.required = string_list(required, "required", path)?;
        }
        rules.min_properties = get_count(map, "minProperties", path)?;
        rules.max_properties = get_count(map, "maxProperties", path)?;
        rules.property_names = self.compile_boxed(map, "propertyNames", path)?;
        rules.dependencies = self.compile_dependencies(map, path)?;

        rules.all_of = self.compile_list(map, "allOf", path)?;
        rules.any_of = self.compile_list(map, "anyOf", path)?;
        rules.one_of = self.compile_list(map, "oneOf", path)?;
        rules.not = self.compile_boxed(map, "not", path)?;
        rules.if_schema = self.compile_boxed(map, "if", path)?;
        rules.then_schema = self.compile_boxed(map, "then", path)?;
        rules.else_schema = self.compile_boxed(map, "else", path)?;

        Ok(rules)
    }

    fn compile_types(
        &mut self,
        map: &Map<String, Document>,
        path: &SchemaPath,
    ) -> SchemaResult<Option<Vec<InstanceType>>> {
        let names: Vec<&str> = match map.get("type") {
            None => return Ok(None),
            Some(Document::String(name)) => vec![name.as_str()],
            Some(Document::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().ok_or_else(|| SchemaError::InvalidKeyword {
                        keyword: "type".to_string(),
                        path: path.to_string(),
                        message: "must be a string or an array of strings".to_string(),
                    })
                })
                .collect::<SchemaResult<_>>()?,
            Some(_) => {
                return Err(SchemaError::InvalidKeyword {
                    keyword: "type".to_string(),
                    path: path.to_string(),
                    message: "must be a string or an array of strings".to_string(),
                });
            }
        };

        names
            .into_iter()
            .map(|name| {
                InstanceType::from_name(name).ok_or_else(|| SchemaError::InvalidType {
                    name: name.to_string(),
                    path: path.to_string(),
                })
            })
            .collect::<SchemaResult<Vec<_>>>()
            .map(Some)
    }

    fn compile_dependencies(
        &mut self,
        map: &Map<String, Document>,
        path: &SchemaPath,
    ) -> SchemaResult<IndexMap<String, Dependency>> {
        let mut dependencies = IndexMap::new();
        let Some(entries) = get_object(map, "dependencies", path)? else {
            return Ok(dependencies);
        };
        for (name, node) in entries {
            let at = child(path, &["dependencies", name.as_str()]);
            let dependency = match node {
                Document::Array(_) => Dependency::Properties(string_list(node, "dependencies", &at)?),
                _ => Dependency::Schema(self.compile(node, &at)?),
            };
            dependencies.insert(name.clone(), dependency);
        }
        Ok(dependencies)
    }
}

fn compile_pattern(source: &str, path: &SchemaPath) -> SchemaResult<Pattern> {
    Pattern::new(source).map_err(|e| SchemaError::InvalidPattern {
        pattern: source.to_string(),
        path: path.to_string(),
        message: e.to_string(),
    })
}
