//! End-to-end tests for the console facade: arguments in, one line per call
//! out, routed to the matching host callable.

use insta::assert_snapshot;
use scriptshim_console::{Console, FnSink, format_line, inspect};
use scriptshim_value::{Array, Object, Value};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

type Lines = Rc<RefCell<Vec<String>>>;

fn recording_console() -> (Console<FnSink>, Lines, Lines, Lines) {
    let log: Lines = Rc::default();
    let warn: Lines = Rc::default();
    let error: Lines = Rc::default();
    let (l, w, e) = (log.clone(), warn.clone(), error.clone());
    let console = Console::new(FnSink::new(
        move |line| l.borrow_mut().push(line.to_string()),
        move |line| w.borrow_mut().push(line.to_string()),
        move |line| e.borrow_mut().push(line.to_string()),
    ));
    (console, log, warn, error)
}

#[test]
fn test_one_forward_per_call() {
    let (console, log, warn, error) = recording_console();

    console.log(&[Value::from("%s has %d items"), Value::from("cart"), Value::from(3)]);
    console.warn(&[Value::from("%d%%"), Value::from(5)]);
    console.error(&[]);

    assert_eq!(*log.borrow(), vec!["cart has 3 items"]);
    assert_eq!(*warn.borrow(), vec!["5%"]);
    assert_eq!(*error.borrow(), vec![""]);
}

#[test]
fn test_plain_arguments_are_joined() {
    let line = format_line(&[Value::from("no directives"), Value::from(1), Value::from(2)]);
    assert_snapshot!(line, @"no directives 1 2");
}

#[test]
fn test_config_document_rendering() {
    let config = Value::from(json!({
        "title": "My Site",
        "paths": {"site": "_site", "views": ["_views", "themes/default"]},
        "no-scm": false,
        "port": 3000,
        "ratio": 0.75,
        "owner": null
    }));

    assert_snapshot!(
        inspect(&config),
        @"{title: 'My Site', paths: {site: '_site', views: ['_views', 'themes/default']}, 'no-scm': false, port: 3000, ratio: 0.75, owner: null}"
    );
}

#[test]
fn test_json_directive_with_function_falls_back() {
    let handler = Value::object([
        ("name", Value::from("click")),
        ("run", Value::function("onClick")),
    ]);
    let line = format_line(&[Value::from("handler=%j"), handler]);
    assert_snapshot!(line, @"handler={name: 'click', run: [Function]}");
}

#[test]
fn test_json_directive_compact_output() {
    let line = format_line(&[
        Value::from("%j"),
        Value::object([
            ("a", Value::from(1)),
            ("b", Value::array([Value::from(true), Value::Null])),
        ]),
    ]);
    assert_snapshot!(line, @r#"{"a":1,"b":[true,null]}"#);
}

#[test]
fn test_mutually_referencing_objects() {
    let parent = Object::new();
    let child = Object::new();
    parent.insert("name", Value::from("parent"));
    parent.insert("child", Value::Object(child.clone()));
    child.insert("name", Value::from("child"));
    child.insert("parent", Value::Object(parent.clone()));

    assert_snapshot!(
        inspect(&Value::Object(parent)),
        @"{name: 'parent', child: {name: 'child', parent: [Circular]}}"
    );
}

#[test]
fn test_inspect_is_repeatable() {
    let build = || {
        Value::object([
            ("list", Value::array([Value::from(1), Value::from("two")])),
            ("flag", Value::Bool(true)),
        ])
    };
    assert_eq!(inspect(&build()), inspect(&build()));

    let value = build();
    assert_eq!(inspect(&value), inspect(&value));
}

#[test]
fn test_sparse_array_with_nested_strings() {
    let array = Array::new();
    array.push(Value::from("a'b"));
    array.set(2, Value::from("line\nbreak"));
    let line = format_line(&[Value::from("sparse:"), Value::Array(array)]);
    assert_snapshot!(line, @r"sparse: ['a\'b', undefined, 'line\nbreak']");
}

#[test]
fn test_directive_without_argument_survives() {
    let line = format_line(&[Value::from("%s then %j"), Value::from("first")]);
    assert_snapshot!(line, @"first then %j");
}

#[test]
fn test_deeply_nested_arguments_do_not_overflow() {
    let mut deep = Value::from("leaf");
    for _ in 0..1_000 {
        deep = Value::array([deep]);
    }

    let json = format_line(&[Value::from("%j"), deep.clone()]);
    assert!(json.contains("[MaxDepth]"));

    let string = format_line(&[Value::from("<%s>"), deep.clone()]);
    assert_eq!(string, "<>");

    let inspected = format_line(&[Value::from("deep"), deep]);
    assert!(inspected.starts_with("deep [["));
}
