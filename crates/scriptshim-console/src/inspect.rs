/*
 * inspect.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Deterministic, cycle-safe rendering of arbitrary script values.
 */

//! Value inspection.
//!
//! [`inspect`] turns any [`Value`] into a single line of text:
//!
//! - primitives render as their canonical tokens (`3`, `true`, `null`,
//!   `undefined`); callables render as `[Function]`
//! - a string at the top level renders verbatim; nested strings are
//!   single-quoted with control characters, quotes and backslashes escaped
//! - arrays render as `[a, b]` with holes shown as `undefined`
//! - objects render as `{key: value, 'odd key': value}` over their own
//!   enumerable members in insertion order
//!
//! # Cycles
//!
//! Every array and object is recorded in a seen-set before its contents are
//! rendered; meeting it again renders `[Circular]`. With the default
//! [`SeenScope::Call`] the set lives for the whole call, so a container that
//! is merely repeated in two sibling branches is also reported as
//! `[Circular]` on its second appearance. [`SeenScope::Path`] only tracks the
//! current root-to-node path and reports true cycles only.
//!
//! # Depth
//!
//! Containers nested deeper than [`InspectOptions::max_depth`] render as
//! `[MaxDepth]` instead of being descended into.

use once_cell::sync::Lazy;
use regex::Regex;
use scriptshim_value::{ContainerId, MAX_NESTING_DEPTH, Value, format_number};
use std::collections::HashSet;

/// Default ceiling for container nesting.
pub const DEFAULT_MAX_DEPTH: usize = MAX_NESTING_DEPTH;

/// Keys matching this render without quotes.
static BARE_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[_a-zA-Z][_a-zA-Z0-9]*$").expect("bare key pattern is valid"));

/// How long a container stays in the seen-set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeenScope {
    /// For the whole inspect call. Repeated (non-cyclic) references in
    /// sibling branches render as `[Circular]` after their first appearance.
    #[default]
    Call,

    /// Only while the container is being rendered (root-to-node path).
    Path,
}

/// Options for [`inspect_with`].
#[derive(Debug, Clone)]
pub struct InspectOptions {
    /// Scope of the seen-set used for cycle detection.
    pub seen_scope: SeenScope,

    /// Maximum container nesting depth (default: 256).
    ///
    /// The top-level value is at depth 1. `None` removes the ceiling.
    pub max_depth: Option<usize>,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self {
            seen_scope: SeenScope::default(),
            max_depth: Some(DEFAULT_MAX_DEPTH),
        }
    }
}

/// Inspect a value with default options.
///
/// # Example
///
/// ```rust
/// use scriptshim_console::inspect;
/// use scriptshim_value::Value;
///
/// let value = Value::object([("name", Value::from("cart")), ("n", Value::from(3))]);
/// assert_eq!(inspect(&value), "{name: 'cart', n: 3}");
/// assert_eq!(inspect(&Value::from("top level")), "top level");
/// ```
pub fn inspect(value: &Value) -> String {
    inspect_with(value, &InspectOptions::default())
}

/// Inspect a value with custom options.
pub fn inspect_with(value: &Value, options: &InspectOptions) -> String {
    let mut inspector = Inspector::new(options);
    let mut out = String::new();
    inspector.write_value(value, 1, &mut out);
    out
}

/// Per-call inspection state. Never shared between calls.
struct Inspector<'a> {
    options: &'a InspectOptions,
    seen: HashSet<ContainerId>,
}

impl<'a> Inspector<'a> {
    fn new(options: &'a InspectOptions) -> Self {
        Self {
            options,
            seen: HashSet::new(),
        }
    }

    fn write_value(&mut self, value: &Value, depth: usize, out: &mut String) {
        match value {
            Value::Undefined => out.push_str("undefined"),
            Value::Null => out.push_str("null"),
            Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Number(n) => out.push_str(&format_number(*n)),
            Value::Function(_) => out.push_str("[Function]"),
            Value::String(s) => {
                if depth == 1 {
                    out.push_str(s);
                } else {
                    write_quoted(s, out);
                }
            }
            Value::Array(array) => {
                let id = array.id();
                if !self.enter(id, depth, out) {
                    return;
                }
                out.push('[');
                for (index, slot) in array.slots().iter().enumerate() {
                    if index > 0 {
                        out.push_str(", ");
                    }
                    match slot {
                        Some(element) => self.write_value(element, depth + 1, out),
                        None => out.push_str("undefined"),
                    }
                }
                out.push(']');
                self.leave(id);
            }
            Value::Object(object) => {
                let id = object.id();
                if !self.enter(id, depth, out) {
                    return;
                }
                out.push('{');
                for (index, (key, member)) in object.entries().iter().enumerate() {
                    if index > 0 {
                        out.push_str(", ");
                    }
                    write_key(key, out);
                    out.push_str(": ");
                    self.write_value(member, depth + 1, out);
                }
                out.push('}');
                self.leave(id);
            }
        }
    }

    /// Decide whether to descend into a container, writing the marker
    /// token when not.
    fn enter(&mut self, id: ContainerId, depth: usize, out: &mut String) -> bool {
        if let Some(max_depth) = self.options.max_depth
            && depth > max_depth
        {
            out.push_str("[MaxDepth]");
            return false;
        }
        if !self.seen.insert(id) {
            out.push_str("[Circular]");
            return false;
        }
        true
    }

    fn leave(&mut self, id: ContainerId) {
        if self.options.seen_scope == SeenScope::Path {
            self.seen.remove(&id);
        }
    }
}

fn write_key(key: &str, out: &mut String) {
    if BARE_KEY.is_match(key) {
        out.push_str(key);
    } else {
        write_quoted(key, out);
    }
}

/// Write `s` single-quoted, escaping quotes, backslashes and control
/// characters (0x00-0x1F).
fn write_quoted(s: &str, out: &mut String) {
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if u32::from(c) < 0x20 => out.push_str(&format!("\\u{:04x}", u32::from(c))),
            c => out.push(c),
        }
    }
    out.push('\'');
}
