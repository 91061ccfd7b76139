/*
 * interpolate.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * printf-style format-string interpolation over positional arguments.
 */

use crate::inspect::inspect;
use once_cell::sync::Lazy;
use regex::Regex;
use scriptshim_value::{Value, format_number};

/// A template needs interpolation when it contains at least one of these.
static DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%[sdifjoO%]").expect("directive pattern is valid"));

/// Check if `template` contains a recognized directive.
pub fn has_directive(template: &str) -> bool {
    DIRECTIVE.is_match(template)
}

/// Interpolate `args[0]` against the arguments that follow it.
///
/// Returns `None` when `args[0]` is not a string or contains no recognized
/// directive. Otherwise returns the interpolated text and how many entries
/// of `args` were consumed, the template included; `args[consumed..]` are
/// left for the caller to append.
///
/// Directives, consuming arguments left to right starting at `args[1]`:
///
/// | directive   | rendering                                              |
/// |-------------|--------------------------------------------------------|
/// | `%s`        | default string conversion                              |
/// | `%d`        | numeric coercion (`NaN` on failure)                    |
/// | `%f`        | leading-numeric-prefix float parsing                   |
/// | `%i`        | consumes the argument, renders nothing                 |
/// | `%j`        | compact JSON, falling back to inspection on failure    |
/// | `%o` / `%O` | inspection                                             |
/// | `%%`        | a literal `%`, consumes nothing                        |
///
/// Any other `%X`, and any directive left without an argument, stays in the
/// output literally.
///
/// # Example
///
/// ```rust
/// use scriptshim_console::interpolate;
/// use scriptshim_value::Value;
///
/// let args = [Value::from("%s has %d items"), Value::from("cart"), Value::from(3)];
/// assert_eq!(interpolate(&args), Some(("cart has 3 items".to_string(), 3)));
/// ```
pub fn interpolate(args: &[Value]) -> Option<(String, usize)> {
    let template = args.first()?.as_str()?;
    if !has_directive(template) {
        return None;
    }

    let mut out = String::with_capacity(template.len());
    let mut next = 1;
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some('%') => {
                chars.next();
                out.push('%');
            }
            Some(directive @ ('s' | 'd' | 'i' | 'f' | 'j' | 'o' | 'O')) if next < args.len() => {
                chars.next();
                render_directive(directive, &args[next], &mut out);
                next += 1;
            }
            // Unknown directive, exhausted arguments, or a trailing `%`:
            // the `%` is literal and whatever follows is emitted as text.
            _ => out.push('%'),
        }
    }

    Some((out, next))
}

fn render_directive(directive: char, arg: &Value, out: &mut String) {
    match directive {
        's' => out.push_str(&arg.to_display_string()),
        'd' => out.push_str(&format_number(arg.to_number())),
        'f' => out.push_str(&format_number(arg.parse_float())),
        'i' => {}
        'j' => match arg.to_json_string() {
            Ok(json) => out.push_str(&json),
            Err(e) => {
                tracing::trace!(error = %e, "%j argument is not serializable, inspecting instead");
                out.push_str(&inspect(arg));
            }
        },
        _ => out.push_str(&inspect(arg)),
    }
}
