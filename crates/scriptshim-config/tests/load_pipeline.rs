//! End-to-end tests for two-tier configuration loading.

use insta::assert_snapshot;
use scriptshim_config::{
    CoerceTypes, DocumentInput, ErrorDetail, ErrorKind, ErrorSource, JsonSchemaCompiler,
    LoadRequest, Loader, ValidatorOptions, YamlParser, load,
};
use serde_json::{Value, json};

fn site_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "definitions": {
            "path": {"type": "string", "minLength": 1}
        },
        "properties": {
            "title": {"type": "string"},
            "retries": {"type": "integer", "minimum": 0, "default": 3},
            "paths": {
                "type": "object",
                "default": {},
                "properties": {
                    "site": {"type": "string", "minLength": 1, "default": "_site"},
                    "views": {
                        "type": "array",
                        "items": {"$ref": "#/definitions/path"},
                        "default": ["_views"]
                    }
                },
                "additionalProperties": false
            },
            "taxonomies": {
                "type": "object",
                "additionalProperties": {"type": "integer"}
            }
        },
        "additionalProperties": false
    })
}

fn keys(value: &Value) -> Vec<String> {
    value.as_object().unwrap().keys().cloned().collect()
}

#[test]
fn test_empty_inputs_yield_all_defaults() {
    let config = load(&site_schema(), "", "_config.yaml", "", "_localconfig.yaml").unwrap();
    assert_eq!(
        config,
        json!({"retries": 3, "paths": {"site": "_site", "views": ["_views"]}})
    );
}

#[test]
fn test_defaults_fill_in_around_primary_values() {
    let primary = "title: Blog\npaths:\n  site: public\n";
    let config = load(&site_schema(), primary, "_config.yaml", "", "_localconfig.yaml").unwrap();
    assert_eq!(
        config,
        json!({
            "title": "Blog",
            "paths": {"site": "public", "views": ["_views"]},
            "retries": 3
        })
    );
}

#[test]
fn test_secondary_overrides_preserves_and_adds() {
    let primary = "title: Blog\nretries: 5\ntaxonomies:\n  tags: 1\n  categories: 2\n";
    let secondary = "retries: 0\ntaxonomies:\n  categories: 9\n  series: 4\n";
    let config = load(&site_schema(), primary, "_config.yaml", secondary, "_local.yaml").unwrap();

    assert_eq!(config["title"], json!("Blog"));
    assert_eq!(config["retries"], json!(0));
    assert_eq!(
        config["taxonomies"],
        json!({"tags": 1, "categories": 9, "series": 4})
    );
    assert_eq!(keys(&config), vec!["title", "retries", "taxonomies", "paths"]);
}

#[test]
fn test_defaults_are_applied_after_merge() {
    // Layers are merged without their defaults, so keys from the secondary
    // come before defaulted ones.
    let primary = "title: Blog\n";
    let secondary = "taxonomies:\n  tags: 1\n";
    let config = load(&site_schema(), primary, "_config.yaml", secondary, "_local.yaml").unwrap();
    assert_eq!(keys(&config), vec!["title", "taxonomies", "retries", "paths"]);
}

#[test]
fn test_sequences_are_replaced_not_concatenated() {
    let primary = "paths:\n  views: [a, b, c]\n";
    let secondary = "paths:\n  views: [z]\n";
    let config = load(&site_schema(), primary, "_config.yaml", secondary, "_local.yaml").unwrap();
    assert_eq!(config["paths"]["views"], json!(["z"]));
}

#[test]
fn test_merge_is_not_commutative() {
    let a = "title: A\nretries: 1\n";
    let b = "title: B\n";
    let ab = load(&site_schema(), a, "a.yaml", b, "b.yaml").unwrap();
    let ba = load(&site_schema(), b, "b.yaml", a, "a.yaml").unwrap();
    assert_eq!(ab["title"], json!("B"));
    assert_eq!(ba["title"], json!("A"));
    assert_ne!(ab, ba);
}

#[test]
fn test_invalid_secondary_is_blamed() {
    let err = load(
        &site_schema(),
        "title: Blog\n",
        "_config.yaml",
        "retries: -1\nunknown: true\n",
        "_localconfig.yaml",
    )
    .unwrap_err();

    assert_eq!(err.source, ErrorSource::Document("_localconfig.yaml".to_string()));
    assert_eq!(err.kind, ErrorKind::Validation);
    let messages: Vec<_> = err.violations().iter().map(|e| e.to_string()).collect();
    assert_eq!(
        messages,
        vec![
            "Validation error at retries: Number -1 is less than minimum 0",
            "Validation error at (root): Unknown property 'unknown'",
        ]
    );
}

#[test]
fn test_invalid_secondary_without_primary() {
    let err = load(&site_schema(), "", "_config.yaml", "title: {a: 1}\n", "_local.yaml")
        .unwrap_err();
    assert_eq!(err.source.document_id(), Some("_local.yaml"));
}

#[test]
fn test_merged_failure_is_blamed_on_last_document() {
    let schema = json!({"type": "object", "maxProperties": 2});

    let err = load(&schema, "a: 1\nb: 2\n", "_config.yaml", "c: 3\n", "_local.yaml")
        .unwrap_err();
    assert_eq!(err.source, ErrorSource::Document("_local.yaml".to_string()));
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(err.violations()[0].error_code(), "S-1-16");
}

#[test]
fn test_failure_with_only_primary_is_blamed_on_primary() {
    let schema = json!({"type": "object", "maxProperties": 2});
    let err = load(&schema, "a: 1\nb: 2\nc: 3\n", "_config.yaml", "", "_local.yaml")
        .unwrap_err();
    assert_eq!(err.source, ErrorSource::Document("_config.yaml".to_string()));
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[test]
fn test_invalid_primary_stops_before_secondary() {
    let err = load(
        &site_schema(),
        "paths:\n  extra: 1\n",
        "_config.yaml",
        "not: [valid",
        "_local.yaml",
    )
    .unwrap_err();
    assert_eq!(err.source.document_id(), Some("_config.yaml"));
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[test]
fn test_validation_record_line() {
    let err = load(&site_schema(), "retries: many\n", "_config.yaml", "", "").unwrap_err();
    assert_snapshot!(
        err.to_string(),
        @r#"_config.yaml: [{"code":"S-1-11","instancePath":"retries","schemaPath":"properties > retries > type","message":"Expected integer, got string","kind":{"type":"TypeMismatch","data":{"expected":"integer","got":"string"}}}]"#
    );
}

#[test]
fn test_parse_error_is_blamed_on_document() {
    let err = load(&site_schema(), "title: [unclosed\n", "_config.yaml", "", "").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Parse);
    assert_eq!(err.source.document_id(), Some("_config.yaml"));
    assert!(matches!(err.detail, ErrorDetail::Message(ref m) if m.starts_with("Syntax error: ")));
}

#[test]
fn test_comment_only_document_is_null_and_rejected() {
    let err = load(&site_schema(), "# nothing yet\n", "_config.yaml", "", "").unwrap_err();
    assert_eq!(err.violations()[0].message(), "Expected object, got null");
}

#[test]
fn test_defective_schema() {
    let schema = json!({"type": "object", "required": ["title"]});
    let err = load(&schema, "title: Blog\n", "_config.yaml", "", "").unwrap_err();
    assert_eq!(err.kind, ErrorKind::DefectiveSchema);
    assert_snapshot!(
        err.to_string(),
        @r#"_config.yaml: default configuration is invalid (schema is buggy): [{"code":"S-1-10","instancePath":"(root)","schemaPath":"required","message":"Missing required property 'title'","kind":{"type":"MissingRequiredProperty","data":{"property":"title"}}}]"#
    );
}

#[test]
fn test_schema_compile_errors_are_internal() {
    for schema in [
        json!({"properties": {"title": {"type": "text"}}}),
        json!({"properties": {"slug": {"pattern": "[unclosed"}}}),
        json!({"$ref": "#/definitions/missing"}),
    ] {
        let err = load(&schema, "title: Blog\n", "_config.yaml", "", "").unwrap_err();
        assert_eq!(err.kind, ErrorKind::SchemaCompile);
        assert_eq!(err.source, ErrorSource::Internal);
        assert_eq!(err.to_json()[0], Value::Null);
    }
}

#[test]
fn test_array_coercion_of_scalar_sequences() {
    let config = load(
        &site_schema(),
        "paths:\n  views: themes/default\n",
        "_config.yaml",
        "",
        "",
    )
    .unwrap();
    assert_eq!(config["paths"]["views"], json!(["themes/default"]));
}

#[test]
fn test_strict_loader_without_coercion() {
    let schema = site_schema();
    let loader = Loader::new(
        YamlParser,
        JsonSchemaCompiler::new(ValidatorOptions {
            use_defaults: true,
            coerce_types: CoerceTypes::No,
        }),
    );
    let err = loader
        .load(&LoadRequest {
            schema: &schema,
            primary: DocumentInput::new("paths:\n  views: themes/default\n", "_config.yaml"),
            secondary: None,
        })
        .unwrap_err();
    assert_eq!(
        err.violations()[0].instance_path.to_string(),
        "paths.views"
    );
}

#[test]
fn test_error_record_tuple() {
    // A number is coerced to a string title, so this loads.
    let config = load(&site_schema(), "", "_config.yaml", "title: 1.5\n", "_local.yaml");
    assert_eq!(config.unwrap()["title"], json!("1.5"));

    let err = load(&site_schema(), "", "_config.yaml", "title: {a: 1}\n", "_local.yaml")
        .unwrap_err();
    let tuple = err.to_json();
    assert_eq!(tuple[0], json!("_local.yaml"));
    assert_eq!(tuple[1][0]["code"], json!("S-1-11"));
    assert_eq!(tuple[1][0]["instancePath"], json!("title"));
}
