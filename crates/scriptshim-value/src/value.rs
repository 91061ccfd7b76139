/*
 * value.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Core value types: primitives plus shared array and object containers.
 */

use indexmap::IndexMap;
use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

/// Deepest container nesting that recursive conversions descend into.
///
/// Deeper containers are cut off instead of recursing further, so arbitrarily
/// deep values never exhaust the host's stack.
pub const MAX_NESTING_DEPTH: usize = 256;

/// A dynamic script value.
///
/// Primitives are stored inline. Arrays and objects are shared containers:
/// cloning a `Value::Array` or `Value::Object` clones the handle, not the
/// contents, exactly like a script reference.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// The `undefined` value (also what an array hole reads as).
    #[default]
    Undefined,

    /// The `null` value.
    Null,

    /// A boolean.
    Bool(bool),

    /// A number. All script numbers are IEEE 754 doubles.
    Number(f64),

    /// A string.
    String(String),

    /// An opaque callable.
    Function(Function),

    /// An ordered sequence of slots, possibly with holes.
    Array(Array),

    /// A key-value container with insertion-ordered members.
    Object(Object),
}

impl Value {
    /// Build a new array value from the given elements.
    pub fn array<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Value::Array(Array::from_values(items))
    }

    /// Build a new object value from `(key, value)` pairs, all enumerable.
    pub fn object<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let object = Object::new();
        for (key, value) in entries {
            object.insert(key, value);
        }
        Value::Object(object)
    }

    /// Build a function value with the given name.
    pub fn function(name: impl Into<String>) -> Self {
        Value::Function(Function::named(name))
    }

    /// Get the string contents if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Identity of a shared container, stable for the container's lifetime.
///
/// Two values have the same `ContainerId` exactly when they refer to the
/// same array or object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerId(usize);

/// An opaque callable value.
///
/// The console never invokes functions; it only needs to know that a value
/// is callable (and optionally its name) to render it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Function {
    name: Option<String>,
}

impl Function {
    /// A named function.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            name: if name.is_empty() { None } else { Some(name) },
        }
    }

    /// The function's name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// A shared, growable sequence of slots.
///
/// A slot is `None` when it is a hole (never assigned), which reads back as
/// `undefined`.
#[derive(Clone, Default)]
pub struct Array(Rc<RefCell<Vec<Option<Value>>>>);

impl Array {
    /// Create an empty array.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an array from the given elements (no holes).
    pub fn from_values<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Self(Rc::new(RefCell::new(items.into_iter().map(Some).collect())))
    }

    /// Append an element.
    pub fn push(&self, value: Value) {
        self.0.borrow_mut().push(Some(value));
    }

    /// Append a hole.
    pub fn push_hole(&self) {
        self.0.borrow_mut().push(None);
    }

    /// Assign `value` to slot `index`, filling any gap with holes.
    pub fn set(&self, index: usize, value: Value) {
        let mut slots = self.0.borrow_mut();
        if index >= slots.len() {
            slots.resize(index + 1, None);
        }
        slots[index] = Some(value);
    }

    /// Read slot `index`. Holes and out-of-range reads yield `None`.
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.borrow().get(index).cloned().flatten()
    }

    /// Number of slots, holes included.
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Check if the array has no slots.
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Borrow the slots.
    ///
    /// Holding the borrow while recursing into nested values is fine; it only
    /// prevents mutation of this array until it is released.
    pub fn slots(&self) -> Ref<'_, [Option<Value>]> {
        Ref::map(self.0.borrow(), |slots| slots.as_slice())
    }

    /// Identity of this array.
    pub fn id(&self) -> ContainerId {
        ContainerId(Rc::as_ptr(&self.0) as *const () as usize)
    }

    /// Check if both handles refer to the same array.
    pub fn ptr_eq(&self, other: &Array) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Array {
    // Contents are not printed: the array may contain itself.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Array")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

/// A member of an [`Object`].
#[derive(Debug, Clone)]
struct Member {
    value: Value,
    enumerable: bool,
}

/// A shared key-value container with insertion-ordered members.
///
/// Members are enumerable unless defined with [`Object::define_hidden`];
/// hidden members are invisible to inspection and JSON serialization.
#[derive(Clone, Default)]
pub struct Object(Rc<RefCell<IndexMap<String, Member>>>);

impl Object {
    /// Create an empty object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an enumerable member, keeping its position if it already exists.
    pub fn insert(&self, key: impl Into<String>, value: Value) {
        self.define(key.into(), value, true);
    }

    /// Set a non-enumerable member.
    pub fn define_hidden(&self, key: impl Into<String>, value: Value) {
        self.define(key.into(), value, false);
    }

    fn define(&self, key: String, value: Value, enumerable: bool) {
        self.0
            .borrow_mut()
            .insert(key, Member { value, enumerable });
    }

    /// Read a member (enumerable or not).
    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.borrow().get(key).map(|member| member.value.clone())
    }

    /// Remove a member, preserving the order of the rest.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.0
            .borrow_mut()
            .shift_remove(key)
            .map(|member| member.value)
    }

    /// Check if a member exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.borrow().contains_key(key)
    }

    /// Number of members, hidden ones included.
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Check if the object has no members.
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Snapshot of the own enumerable members in insertion order.
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.0
            .borrow()
            .iter()
            .filter(|(_, member)| member.enumerable)
            .map(|(key, member)| (key.clone(), member.value.clone()))
            .collect()
    }

    /// Identity of this object.
    pub fn id(&self) -> ContainerId {
        ContainerId(Rc::as_ptr(&self.0) as *const () as usize)
    }

    /// Check if both handles refer to the same object.
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<String> = self.0.borrow().keys().cloned().collect();
        f.debug_struct("Object")
            .field("keys", &keys)
            .finish_non_exhaustive()
    }
}
