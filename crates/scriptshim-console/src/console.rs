/*
 * console.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * The log facade: formats a call's arguments into one line and forwards it.
 */

use crate::inspect::inspect;
use crate::interpolate::interpolate;
use crate::sink::{ConsoleSink, Level, TracingSink};
use scriptshim_value::Value;

/// Console-style logging facade over a [`ConsoleSink`].
///
/// Every call formats its arguments into exactly one line (see
/// [`format_line`]) and forwards it to the sink once. Nothing is buffered or
/// retried, and no call can fail.
#[derive(Debug, Default)]
pub struct Console<S = TracingSink> {
    sink: S,
}

impl<S: ConsoleSink> Console<S> {
    /// Create a console writing to `sink`.
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// The underlying sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consume the console, returning the sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// `console.log`
    pub fn log(&self, args: &[Value]) {
        self.emit(Level::Log, args);
    }

    /// `console.warn`
    pub fn warn(&self, args: &[Value]) {
        self.emit(Level::Warn, args);
    }

    /// `console.error`
    pub fn error(&self, args: &[Value]) {
        self.emit(Level::Error, args);
    }

    /// Format `args` and forward the line at `level`.
    pub fn emit(&self, level: Level, args: &[Value]) {
        let line = format_line(args);
        self.sink.write(level, &line);
    }
}

/// Format a console call's arguments into a single line.
///
/// With at least two arguments and a first argument that is a string
/// containing a recognized directive, the template is interpolated and the
/// arguments it did not consume are inspected and appended. Otherwise every
/// argument is inspected. Parts are joined by a single space; a call with no
/// arguments yields an empty line.
///
/// # Example
///
/// ```rust
/// use scriptshim_console::format_line;
/// use scriptshim_value::Value;
///
/// let args = [Value::from("%s has %d items"), Value::from("cart"), Value::from(3)];
/// assert_eq!(format_line(&args), "cart has 3 items");
///
/// let args = [Value::from("no directives"), Value::from(1), Value::from(2)];
/// assert_eq!(format_line(&args), "no directives 1 2");
/// ```
pub fn format_line(args: &[Value]) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(args.len());
    let mut rest = args;

    if args.len() > 1
        && let Some((text, consumed)) = interpolate(args)
    {
        parts.push(text);
        rest = &args[consumed..];
    }

    parts.extend(rest.iter().map(inspect));
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use scriptshim_value::Array;

    #[test]
    fn test_zero_arguments_is_empty_line() {
        let console = Console::new(MemorySink::new());
        console.log(&[]);
        assert_eq!(console.sink().lines(), vec![(Level::Log, String::new())]);
    }

    #[test]
    fn test_single_argument_is_not_interpolated() {
        assert_eq!(format_line(&[Value::from("%d%%")]), "%d%%");
    }

    #[test]
    fn test_leftover_arguments_are_inspected() {
        let args = [
            Value::from("%s:"),
            Value::from("items"),
            Value::array([Value::from("a")]),
            Value::from("tail"),
        ];
        assert_eq!(format_line(&args), "items: ['a'] tail");
    }

    #[test]
    fn test_non_string_first_argument() {
        let args = [Value::from(1), Value::from("%s"), Value::Null];
        assert_eq!(format_line(&args), "1 %s null");
    }

    #[test]
    fn test_each_argument_has_its_own_seen_set() {
        let shared = Value::array([Value::from(1)]);
        assert_eq!(format_line(&[shared.clone(), shared]), "[1] [1]");
    }

    #[test]
    fn test_circular_argument_does_not_hang() {
        let array = Array::new();
        array.push(Value::Array(array.clone()));
        assert_eq!(format_line(&[Value::Array(array)]), "[[Circular]]");
    }

    #[test]
    fn test_levels_route_to_matching_sink() {
        let console = Console::new(MemorySink::new());
        console.log(&[Value::from("a")]);
        console.warn(&[Value::from("b")]);
        console.error(&[Value::from("c")]);

        assert_eq!(
            console.into_sink().take(),
            vec![
                (Level::Log, "a".to_string()),
                (Level::Warn, "b".to_string()),
                (Level::Error, "c".to_string()),
            ]
        );
    }
}
