/*
 * sink.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Host-provided destinations for formatted console lines.
 */

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Severity of a console call, one per facade entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// `console.log`
    Log,
    /// `console.warn`
    Warn,
    /// `console.error`
    Error,
}

impl Level {
    /// The entry point name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Log => "log",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Destination for finished console lines.
///
/// Implementations receive exactly one call per console call and must not
/// fail observably; a line that cannot be delivered is dropped by the sink.
pub trait ConsoleSink {
    /// Deliver one line at the given level.
    fn write(&self, level: Level, line: &str);
}

impl<T: ConsoleSink + ?Sized> ConsoleSink for &T {
    fn write(&self, level: Level, line: &str) {
        (**self).write(level, line);
    }
}

impl<T: ConsoleSink + ?Sized> ConsoleSink for Box<T> {
    fn write(&self, level: Level, line: &str) {
        (**self).write(level, line);
    }
}

impl<T: ConsoleSink + ?Sized> ConsoleSink for Rc<T> {
    fn write(&self, level: Level, line: &str) {
        (**self).write(level, line);
    }
}

type LineFn = Box<dyn Fn(&str)>;

/// A sink made of three host callables, one per level.
///
/// # Example
///
/// ```rust
/// use scriptshim_console::{Console, FnSink};
/// use scriptshim_value::Value;
///
/// let console = Console::new(FnSink::new(
///     |line| println!("{line}"),
///     |line| eprintln!("warning: {line}"),
///     |line| eprintln!("error: {line}"),
/// ));
/// console.log(&[Value::from("hello")]);
/// ```
pub struct FnSink {
    log: LineFn,
    warn: LineFn,
    error: LineFn,
}

impl FnSink {
    /// Create a sink from the log, warn and error callables.
    pub fn new(
        log: impl Fn(&str) + 'static,
        warn: impl Fn(&str) + 'static,
        error: impl Fn(&str) + 'static,
    ) -> Self {
        Self {
            log: Box::new(log),
            warn: Box::new(warn),
            error: Box::new(error),
        }
    }
}

impl fmt::Debug for FnSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSink").finish_non_exhaustive()
    }
}

impl ConsoleSink for FnSink {
    fn write(&self, level: Level, line: &str) {
        match level {
            Level::Log => (self.log)(line),
            Level::Warn => (self.warn)(line),
            Level::Error => (self.error)(line),
        }
    }
}

/// Forwards console lines to `tracing` at `info`, `warn` and `error`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ConsoleSink for TracingSink {
    fn write(&self, level: Level, line: &str) {
        match level {
            Level::Log => tracing::info!(target: "scriptshim::console", "{}", line),
            Level::Warn => tracing::warn!(target: "scriptshim::console", "{}", line),
            Level::Error => tracing::error!(target: "scriptshim::console", "{}", line),
        }
    }
}

/// Records every line in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: RefCell<Vec<(Level, String)>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded lines.
    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines.borrow().clone()
    }

    /// Remove and return the recorded lines.
    pub fn take(&self) -> Vec<(Level, String)> {
        self.lines.take()
    }
}

impl ConsoleSink for MemorySink {
    fn write(&self, level: Level, line: &str) {
        self.lines.borrow_mut().push((level, line.to_string()));
    }
}
