/*
 * validator.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Schema validation with default injection and type coercion.
 */

use crate::Document;
use crate::coerce::{CoerceTypes, coerce};
use crate::error::{
    InstancePath, PathSegment, SchemaPath, SchemaResult, ValidationError, ValidationErrorKind,
};
use crate::schema::{CompiledSchema, Dependency, InstanceType, Items, Rules, Schema};
use serde_json::Map;

/// Nesting limit for schema evaluation at a single document location.
/// Descending into the document starts a fresh count, so only `$ref` cycles
/// that make no progress can reach it.
const MAX_SCHEMA_DEPTH: usize = 256;

/// Checks documents against a compiled schema.
///
/// A validator may rewrite the document while checking it (injected
/// defaults, coerced scalars). All violations are collected; on failure the
/// document may be partially rewritten.
pub trait Validator {
    fn validate(&self, document: &mut Document) -> Result<(), Vec<ValidationError>>;
}

impl<T: Validator + ?Sized> Validator for &T {
    fn validate(&self, document: &mut Document) -> Result<(), Vec<ValidationError>> {
        (**self).validate(document)
    }
}

impl<T: Validator + ?Sized> Validator for Box<T> {
    fn validate(&self, document: &mut Document) -> Result<(), Vec<ValidationError>> {
        (**self).validate(document)
    }
}

/// Compiles a schema document into a [`Validator`].
pub trait SchemaCompiler {
    type Validator: Validator;

    fn compile(&self, schema: &Document) -> SchemaResult<Self::Validator>;
}

/// Options for [`JsonSchemaValidator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorOptions {
    /// Insert the `default` of every missing property (and missing
    /// trailing tuple item) before checking it.
    pub use_defaults: bool,
    /// How to handle values whose type does not match `type`.
    pub coerce_types: CoerceTypes,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            use_defaults: true,
            coerce_types: CoerceTypes::Array,
        }
    }
}

/// The built-in compiler for JSON Schema (draft-07 subset).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaCompiler {
    options: ValidatorOptions,
}

impl JsonSchemaCompiler {
    pub fn new(options: ValidatorOptions) -> Self {
        Self { options }
    }
}

impl SchemaCompiler for JsonSchemaCompiler {
    type Validator = JsonSchemaValidator;

    fn compile(&self, schema: &Document) -> SchemaResult<JsonSchemaValidator> {
        Ok(JsonSchemaValidator::new(
            CompiledSchema::compile(schema)?,
            self.options,
        ))
    }
}

/// A compiled schema together with the options to validate with.
#[derive(Debug, Clone)]
pub struct JsonSchemaValidator {
    schema: CompiledSchema,
    options: ValidatorOptions,
}

impl JsonSchemaValidator {
    pub fn new(schema: CompiledSchema, options: ValidatorOptions) -> Self {
        Self { schema, options }
    }

    pub fn schema(&self) -> &CompiledSchema {
        &self.schema
    }

    pub fn options(&self) -> ValidatorOptions {
        self.options
    }
}

impl Validator for JsonSchemaValidator {
    fn validate(&self, document: &mut Document) -> Result<(), Vec<ValidationError>> {
        validate(document, &self.schema, self.options)
    }
}

/// Validates a document against a compiled schema
pub fn validate(
    document: &mut Document,
    schema: &CompiledSchema,
    options: ValidatorOptions,
) -> Result<(), Vec<ValidationError>> {
    let mut context = ValidationContext::new(schema, options);
    validate_generic(document, schema.root(), &mut context);
    context.into_result()
}

/// Validation context tracks state during validation
pub struct ValidationContext<'a> {
    /// Compiled schema, for $ref resolution
    schema: &'a CompiledSchema,
    options: ValidatorOptions,
    /// Current instance path (e.g., ["paths", "views", 0])
    instance_path: InstancePath,
    /// Current schema path (e.g., ["properties", "paths"])
    schema_path: SchemaPath,
    /// Collected validation errors
    errors: Vec<ValidationError>,
    depth: usize,
}

impl<'a> ValidationContext<'a> {
    /// Create a new validation context
    pub fn new(schema: &'a CompiledSchema, options: ValidatorOptions) -> Self {
        Self {
            schema,
            options,
            instance_path: InstancePath::new(),
            schema_path: SchemaPath::new(),
            errors: Vec::new(),
            depth: 0,
        }
    }

    /// A context for evaluating a combinator branch on a scratch copy.
    /// Branches never inject defaults.
    fn branch(&self) -> ValidationContext<'a> {
        ValidationContext {
            schema: self.schema,
            options: ValidatorOptions {
                use_defaults: false,
                ..self.options
            },
            instance_path: self.instance_path.clone(),
            schema_path: self.schema_path.clone(),
            errors: Vec::new(),
            depth: self.depth,
        }
    }

    /// Add an error at the current paths
    pub fn add_error(&mut self, kind: ValidationErrorKind) {
        let error = ValidationError::new(kind, self.instance_path.clone())
            .with_schema_path(self.schema_path.clone());
        self.errors.push(error);
    }

    /// Execute a function with a new instance path segment
    pub fn with_instance_path<F, R>(&mut self, segment: PathSegment, f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        self.instance_path.push(segment);
        let depth = std::mem::replace(&mut self.depth, 0);
        let result = f(self);
        self.depth = depth;
        self.instance_path.pop();
        result
    }

    /// Execute a function with a new schema path segment
    pub fn with_schema_path<F, R>(&mut self, segment: impl Into<String>, f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        self.schema_path.push(segment);
        let result = f(self);
        self.schema_path.pop();
        result
    }

    /// Check if validation failed
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn into_result(self) -> Result<(), Vec<ValidationError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Main validation dispatcher
fn validate_generic(value: &mut Document, schema: &Schema, context: &mut ValidationContext) {
    match schema {
        Schema::True => {}
        Schema::False => context.add_error(ValidationErrorKind::FalseSchema),
        Schema::Rules(rules) => {
            if context.depth >= MAX_SCHEMA_DEPTH {
                context.add_error(ValidationErrorKind::Other {
                    message: "Schema nesting limit exceeded (recursive $ref?)".to_string(),
                });
                return;
            }
            context.depth += 1;
            validate_rules(value, rules, context);
            context.depth -= 1;
        }
    }
}

fn validate_rules(value: &mut Document, rules: &Rules, context: &mut ValidationContext) {
    if let Some(reference) = &rules.reference {
        let registry = context.schema;
        match registry.resolve(reference) {
            Some(target) => {
                context.with_schema_path("$ref", |ctx| validate_generic(value, target, ctx))
            }
            None => context.add_error(ValidationErrorKind::UnresolvedReference {
                ref_id: reference.clone(),
            }),
        }
        return;
    }

    if let Some(types) = &rules.types {
        context.with_schema_path("type", |ctx| validate_type(value, types, ctx));
    }
    if let Some(allowed) = &rules.enum_values {
        context.with_schema_path("enum", |ctx| validate_enum(value, allowed, ctx));
    }
    if let Some(expected) = &rules.const_value
        && !json_equal(value, expected)
    {
        context.with_schema_path("const", |ctx| {
            ctx.add_error(ValidationErrorKind::ConstMismatch {
                value: value.to_string(),
                expected: expected.to_string(),
            })
        });
    }

    match value {
        Document::Number(n) => {
            if let Some(n) = n.as_f64() {
                validate_number(n, rules, context);
            }
        }
        Document::String(s) => validate_string(s, rules, context),
        Document::Array(items) => validate_array(items, rules, context),
        Document::Object(map) => validate_object(map, rules, context),
        Document::Null | Document::Bool(_) => {}
    }

    for (name, dependency) in &rules.dependencies {
        if let Dependency::Schema(schema) = dependency
            && value.as_object().is_some_and(|map| map.contains_key(name))
        {
            context.with_schema_path("dependencies", |ctx| {
                ctx.with_schema_path(name.as_str(), |ctx| validate_generic(value, schema, ctx))
            });
        }
    }

    validate_combinators(value, rules, context);
}

/// Check `type`, coercing the value in place when allowed.
fn validate_type(value: &mut Document, types: &[InstanceType], context: &mut ValidationContext) {
    if types.iter().any(|t| t.matches(value)) {
        return;
    }
    if let Some(coerced) = coerce(value, types, context.options.coerce_types) {
        tracing::trace!(
            path = %context.instance_path,
            from = InstanceType::name_of(value),
            to = InstanceType::name_of(&coerced),
            "coerced value"
        );
        *value = coerced;
        return;
    }
    context.add_error(ValidationErrorKind::TypeMismatch {
        expected: types
            .iter()
            .map(InstanceType::as_str)
            .collect::<Vec<_>>()
            .join(" or "),
        got: InstanceType::name_of(value).to_string(),
    });
}

/// Validate an enum value
fn validate_enum(value: &Document, allowed: &[Document], context: &mut ValidationContext) {
    if allowed.iter().any(|candidate| json_equal(value, candidate)) {
        return;
    }
    context.add_error(ValidationErrorKind::InvalidEnumValue {
        value: value.to_string(),
        allowed: allowed.iter().map(|v| v.to_string()).collect(),
    });
}

/// Validate a number value
fn validate_number(num: f64, rules: &Rules, context: &mut ValidationContext) {
    // Check minimum
    if let Some(min) = rules.minimum
        && num < min
    {
        context.with_schema_path("minimum", |ctx| {
            ctx.add_error(ValidationErrorKind::NumberOutOfRange {
                value: num,
                minimum: Some(min),
                maximum: None,
                exclusive_minimum: None,
                exclusive_maximum: None,
            })
        });
    }

    // Check maximum
    if let Some(max) = rules.maximum
        && num > max
    {
        context.with_schema_path("maximum", |ctx| {
            ctx.add_error(ValidationErrorKind::NumberOutOfRange {
                value: num,
                minimum: None,
                maximum: Some(max),
                exclusive_minimum: None,
                exclusive_maximum: None,
            })
        });
    }

    // Check exclusive minimum
    if let Some(min) = rules.exclusive_minimum
        && num <= min
    {
        context.with_schema_path("exclusiveMinimum", |ctx| {
            ctx.add_error(ValidationErrorKind::NumberOutOfRange {
                value: num,
                minimum: None,
                maximum: None,
                exclusive_minimum: Some(min),
                exclusive_maximum: None,
            })
        });
    }

    // Check exclusive maximum
    if let Some(max) = rules.exclusive_maximum
        && num >= max
    {
        context.with_schema_path("exclusiveMaximum", |ctx| {
            ctx.add_error(ValidationErrorKind::NumberOutOfRange {
                value: num,
                minimum: None,
                maximum: None,
                exclusive_minimum: None,
                exclusive_maximum: Some(max),
            })
        });
    }

    // Check multiple of
    if let Some(multiple) = rules.multiple_of {
        let quotient = num / multiple;
        if !quotient.is_finite() || quotient.fract() != 0.0 {
            context.with_schema_path("multipleOf", |ctx| {
                ctx.add_error(ValidationErrorKind::NumberNotMultipleOf {
                    value: num,
                    multiple_of: multiple,
                })
            });
        }
    }
}

/// Validate a string value
fn validate_string(s: &str, rules: &Rules, context: &mut ValidationContext) {
    let length = s.chars().count();

    // Check min length
    if let Some(min) = rules.min_length
        && length < min
    {
        context.with_schema_path("minLength", |ctx| {
            ctx.add_error(ValidationErrorKind::StringLengthInvalid {
                length,
                min_length: Some(min),
                max_length: None,
            })
        });
    }

    // Check max length
    if let Some(max) = rules.max_length
        && length > max
    {
        context.with_schema_path("maxLength", |ctx| {
            ctx.add_error(ValidationErrorKind::StringLengthInvalid {
                length,
                min_length: None,
                max_length: Some(max),
            })
        });
    }

    // Check pattern
    if let Some(pattern) = &rules.pattern
        && !pattern.is_match(s)
    {
        context.with_schema_path("pattern", |ctx| {
            ctx.add_error(ValidationErrorKind::StringPatternMismatch {
                value: s.to_string(),
                pattern: pattern.as_str().to_string(),
            })
        });
    }
}

/// Validate an array value
fn validate_array(items: &mut Vec<Document>, rules: &Rules, context: &mut ValidationContext) {
    // Fill missing trailing tuple positions that have defaults
    if context.options.use_defaults
        && let Some(Items::Tuple(schemas)) = &rules.items
    {
        for schema in schemas.iter().skip(items.len()) {
            match schema.default_value() {
                Some(default) => items.push(default.clone()),
                None => break,
            }
        }
    }

    // Check min items
    if let Some(min) = rules.min_items
        && items.len() < min
    {
        context.with_schema_path("minItems", |ctx| {
            ctx.add_error(ValidationErrorKind::ArrayLengthInvalid {
                length: items.len(),
                min_items: Some(min),
                max_items: None,
            })
        });
    }

    // Check max items
    if let Some(max) = rules.max_items
        && items.len() > max
    {
        context.with_schema_path("maxItems", |ctx| {
            ctx.add_error(ValidationErrorKind::ArrayLengthInvalid {
                length: items.len(),
                min_items: None,
                max_items: Some(max),
            })
        });
    }

    // Validate each item
    match &rules.items {
        Some(Items::Single(schema)) => {
            for (i, item) in items.iter_mut().enumerate() {
                context.with_schema_path("items", |ctx| {
                    ctx.with_instance_path(PathSegment::Index(i), |ctx| {
                        validate_generic(item, schema, ctx)
                    })
                });
            }
        }
        Some(Items::Tuple(schemas)) => {
            for (i, item) in items.iter_mut().enumerate() {
                let Some(schema) = schemas.get(i) else {
                    break;
                };
                context.with_schema_path("items", |ctx| {
                    ctx.with_schema_path(i.to_string(), |ctx| {
                        ctx.with_instance_path(PathSegment::Index(i), |ctx| {
                            validate_generic(item, schema, ctx)
                        })
                    })
                });
            }

            match rules.additional_items.as_deref() {
                Some(Schema::False) if items.len() > schemas.len() => {
                    context.with_schema_path("additionalItems", |ctx| {
                        ctx.add_error(ValidationErrorKind::ArrayLengthInvalid {
                            length: items.len(),
                            min_items: None,
                            max_items: Some(schemas.len()),
                        })
                    });
                }
                Some(additional) => {
                    for (i, item) in items.iter_mut().enumerate().skip(schemas.len()) {
                        context.with_schema_path("additionalItems", |ctx| {
                            ctx.with_instance_path(PathSegment::Index(i), |ctx| {
                                validate_generic(item, additional, ctx)
                            })
                        });
                    }
                }
                None => {}
            }
        }
        None => {}
    }

    // Check unique items, after coercion has settled the items
    if rules.unique_items {
        let duplicated = items
            .iter()
            .enumerate()
            .any(|(i, a)| items[i + 1..].iter().any(|b| json_equal(a, b)));
        if duplicated {
            context.with_schema_path("uniqueItems", |ctx| {
                ctx.add_error(ValidationErrorKind::ArrayItemsNotUnique)
            });
        }
    }

    // Check contains, on scratch copies
    if let Some(schema) = &rules.contains {
        let found = items.iter().any(|item| {
            let mut scratch = item.clone();
            let mut branch = context.branch();
            validate_generic(&mut scratch, schema, &mut branch);
            !branch.has_errors()
        });
        if !found {
            context.with_schema_path("contains", |ctx| {
                ctx.add_error(ValidationErrorKind::ArrayContainsNone)
            });
        }
    }
}

/// Validate an object value
fn validate_object(
    map: &mut Map<String, Document>,
    rules: &Rules,
    context: &mut ValidationContext,
) {
    // Inject defaults for missing properties, in schema order
    if context.options.use_defaults {
        for (name, schema) in &rules.properties {
            if !map.contains_key(name)
                && let Some(default) = schema.default_value()
            {
                tracing::trace!(path = %context.instance_path, property = %name, "injecting default");
                map.insert(name.clone(), default.clone());
            }
        }
    }

    // Check required properties
    for required in &rules.required {
        if !map.contains_key(required) {
            context.with_schema_path("required", |ctx| {
                ctx.add_error(ValidationErrorKind::MissingRequiredProperty {
                    property: required.clone(),
                })
            });
        }
    }

    // Check min/max properties
    if let Some(min) = rules.min_properties
        && map.len() < min
    {
        context.with_schema_path("minProperties", |ctx| {
            ctx.add_error(ValidationErrorKind::ObjectPropertyCountInvalid {
                count: map.len(),
                min_properties: Some(min),
                max_properties: None,
            })
        });
    }

    if let Some(max) = rules.max_properties
        && map.len() > max
    {
        context.with_schema_path("maxProperties", |ctx| {
            ctx.add_error(ValidationErrorKind::ObjectPropertyCountInvalid {
                count: map.len(),
                min_properties: None,
                max_properties: Some(max),
            })
        });
    }

    // Check property dependencies
    for (name, dependency) in &rules.dependencies {
        if let Dependency::Properties(needed) = dependency
            && map.contains_key(name)
        {
            for missing in needed.iter().filter(|n| !map.contains_key(*n)) {
                context.with_schema_path("dependencies", |ctx| {
                    ctx.add_error(ValidationErrorKind::MissingDependency {
                        property: name.clone(),
                        dependency: missing.clone(),
                    })
                });
            }
        }
    }

    // Check property names
    if let Some(names_schema) = &rules.property_names {
        for key in map.keys() {
            let mut name = Document::String(key.clone());
            context.with_schema_path("propertyNames", |ctx| {
                ctx.with_instance_path(PathSegment::Key(key.clone()), |ctx| {
                    validate_generic(&mut name, names_schema, ctx)
                })
            });
        }
    }

    // Validate each property
    for (key, child) in map.iter_mut() {
        let mut matched = false;

        if let Some(schema) = rules.properties.get(key) {
            matched = true;
            context.with_schema_path("properties", |ctx| {
                ctx.with_schema_path(key.as_str(), |ctx| {
                    ctx.with_instance_path(PathSegment::Key(key.clone()), |ctx| {
                        validate_generic(child, schema, ctx)
                    })
                })
            });
        }

        for (pattern, schema) in &rules.pattern_properties {
            if pattern.is_match(key) {
                matched = true;
                context.with_schema_path("patternProperties", |ctx| {
                    ctx.with_schema_path(pattern.as_str(), |ctx| {
                        ctx.with_instance_path(PathSegment::Key(key.clone()), |ctx| {
                            validate_generic(child, schema, ctx)
                        })
                    })
                });
            }
        }

        if matched {
            continue;
        }
        match rules.additional_properties.as_deref() {
            // Closed object - no additional properties allowed
            Some(Schema::False) => context.with_schema_path("additionalProperties", |ctx| {
                ctx.add_error(ValidationErrorKind::UnknownProperty {
                    property: key.clone(),
                })
            }),
            Some(additional) => context.with_schema_path("additionalProperties", |ctx| {
                ctx.with_instance_path(PathSegment::Key(key.clone()), |ctx| {
                    validate_generic(child, additional, ctx)
                })
            }),
            None => {}
        }
    }
}

/// `allOf` applies in place. `anyOf` and `oneOf` evaluate each branch on a
/// copy and adopt the matching copy (keeping its coercions). `not` and `if`
/// are evaluated on copies that are thrown away.
fn validate_combinators(value: &mut Document, rules: &Rules, context: &mut ValidationContext) {
    for (i, schema) in rules.all_of.iter().enumerate() {
        context.with_schema_path("allOf", |ctx| {
            ctx.with_schema_path(i.to_string(), |ctx| validate_generic(value, schema, ctx))
        });
    }

    if !rules.any_of.is_empty() {
        context.with_schema_path("anyOf", |ctx| validate_any_of(value, &rules.any_of, ctx));
    }

    if !rules.one_of.is_empty() {
        context.with_schema_path("oneOf", |ctx| validate_one_of(value, &rules.one_of, ctx));
    }

    if let Some(schema) = &rules.not
        && try_branch(value, schema, context, "not").is_ok()
    {
        context.with_schema_path("not", |ctx| {
            ctx.add_error(ValidationErrorKind::NotSchemaMatched)
        });
    }

    if let Some(condition) = &rules.if_schema {
        let branch = if try_branch(value, condition, context, "if").is_ok() {
            rules.then_schema.as_deref().map(|schema| ("then", schema))
        } else {
            rules.else_schema.as_deref().map(|schema| ("else", schema))
        };
        if let Some((keyword, schema)) = branch {
            context.with_schema_path(keyword, |ctx| validate_generic(value, schema, ctx));
        }
    }
}

/// Evaluate `schema` against a copy of `value`, returning the (possibly
/// coerced) copy on success and the branch's errors on failure.
fn try_branch(
    value: &Document,
    schema: &Schema,
    context: &ValidationContext,
    segment: &str,
) -> Result<Document, Vec<ValidationError>> {
    let mut scratch = value.clone();
    let mut branch = context.branch();
    branch.with_schema_path(segment, |ctx| validate_generic(&mut scratch, schema, ctx));
    branch.into_result().map(|()| scratch)
}

/// Validate anyOf (at least one schema must match)
fn validate_any_of(value: &mut Document, schemas: &[Schema], context: &mut ValidationContext) {
    let mut failures = Vec::new();

    for (i, schema) in schemas.iter().enumerate() {
        match try_branch(value, schema, context, &i.to_string()) {
            Ok(matched) => {
                *value = matched;
                return;
            }
            Err(errors) => failures.extend(errors),
        }
    }

    // All subschemas failed
    context.errors.extend(failures);
    context.add_error(ValidationErrorKind::NoMatchingSubschema);
}

/// Validate oneOf (exactly one schema must match)
fn validate_one_of(value: &mut Document, schemas: &[Schema], context: &mut ValidationContext) {
    let mut failures = Vec::new();
    let mut matches = Vec::new();

    for (i, schema) in schemas.iter().enumerate() {
        match try_branch(value, schema, context, &i.to_string()) {
            Ok(matched) => matches.push(matched),
            Err(errors) => failures.extend(errors),
        }
    }

    if matches.len() == 1 {
        if let Some(matched) = matches.pop() {
            *value = matched;
        }
        return;
    }
    if matches.is_empty() {
        context.errors.extend(failures);
    }
    context.add_error(ValidationErrorKind::OneOfMismatch {
        matched: matches.len(),
    });
}

/// JSON equality, with numbers compared by value (`1` equals `1.0`).
fn json_equal(a: &Document, b: &Document) -> bool {
    match (a, b) {
        (Document::Number(x), Document::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Document::Array(xs), Document::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_equal(x, y))
        }
        (Document::Object(xs), Document::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| json_equal(x, y)))
        }
        _ => a == b,
    }
}
