/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Dynamic script values handed across the host boundary.
 */

//! Dynamic script values.
//!
//! This crate provides [`Value`], the tagged variant used to pass arbitrary
//! script data from the host into the console and configuration layers.
//!
//! # Key Features
//!
//! - **Shared containers**: [`Array`] and [`Object`] are reference types, so
//!   self-referential structures can be built and container identity is
//!   observable through [`ContainerId`]
//! - **Holes**: array slots may be empty, mirroring sparse script arrays
//! - **Coercions**: string, number and float conversions follow ECMAScript
//!   semantics ([`Value::to_display_string`], [`Value::to_number`],
//!   [`Value::parse_float`])
//! - **Canonical numbers**: [`format_number`] renders `f64` the way
//!   `Number.prototype.toString` does
//!
//! # Example
//!
//! ```rust
//! use scriptshim_value::{Array, Value};
//!
//! let items = Array::new();
//! items.push(Value::from(1));
//! items.push(Value::Array(items.clone()));
//!
//! assert_eq!(items.len(), 2);
//! assert_eq!(Value::from(2.5).to_display_string(), "2.5");
//! ```
//!
//! Values are single-threaded: containers use `Rc<RefCell<_>>` and are
//! neither `Send` nor `Sync`.

mod coerce;
mod convert;
mod json;
mod number;
mod value;

pub use json::JsonError;
pub use number::format_number;
pub use value::{Array, ContainerId, Function, MAX_NESTING_DEPTH, Object, Value};
