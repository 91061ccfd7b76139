/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Console-style logging facade for embedded scripts.
 */

//! Console-style logging for embedded scripts.
//!
//! This crate turns a console call's argument list into one line of text and
//! hands it to a host-provided sink:
//!
//! - [`inspect`]: a deterministic, cycle-safe renderer for arbitrary
//!   [`Value`](scriptshim_value::Value)s
//! - [`interpolate`]: `printf`-style templates (`%s %d %i %f %j %o %O %%`)
//!   consuming positional arguments
//! - [`Console`]: the `log` / `warn` / `error` facade composing the two
//!
//! # Example
//!
//! ```rust
//! use scriptshim_console::{Console, Level, MemorySink};
//! use scriptshim_value::Value;
//!
//! let console = Console::new(MemorySink::new());
//! console.warn(&[
//!     Value::from("%d%% done,"),
//!     Value::from(5),
//!     Value::object([("file", Value::from("index.md"))]),
//! ]);
//!
//! assert_eq!(
//!     console.sink().lines(),
//!     vec![(Level::Warn, "5% done, {file: 'index.md'}".to_string())]
//! );
//! ```
//!
//! Logging never fails: values that cannot be rendered one way (for example
//! a function under `%j`) degrade to their inspected form.

mod console;
mod inspect;
mod interpolate;
mod sink;

pub use console::{Console, format_line};
pub use inspect::{DEFAULT_MAX_DEPTH, InspectOptions, SeenScope, inspect, inspect_with};
pub use interpolate::{has_directive, interpolate};
pub use sink::{ConsoleSink, FnSink, Level, MemorySink, TracingSink};
