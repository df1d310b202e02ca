//! # Dispatch Keys
//!
//! A multimethod selects an implementation by comparing the value its
//! dispatch function computed against the keys in its method table.
//! The key type is opaque to the library: anything `Eq + Hash` works.
//!
//! One key is reserved: [`DispatchKey::Default`]. A method registered
//! under it is the fallback invoked when no exact match exists. Dispatch
//! functions return a bare `K`, which `call` wraps in
//! [`DispatchKey::Value`], so the sentinel can never collide with a
//! computed key.

/// A key in a multimethod's method table.
///
/// `Value(K)` wraps a key produced by the dispatch function;
/// `Default` is the reserved fallback slot. The two never compare
/// equal, so a default method can only be reached by falling through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchKey<K> {
    /// A concrete dispatch value.
    Value(K),
    /// The reserved fallback slot.
    Default,
}

impl<K> DispatchKey<K> {
    /// True for the reserved fallback key.
    pub fn is_default(&self) -> bool {
        matches!(self, DispatchKey::Default)
    }

    /// The wrapped dispatch value, if this is not the fallback key.
    pub fn value(&self) -> Option<&K> {
        match self {
            DispatchKey::Value(key) => Some(key),
            DispatchKey::Default => None,
        }
    }
}

/// Registration sites pass raw keys; `call` does the wrapping itself.
impl<K> From<K> for DispatchKey<K> {
    fn from(key: K) -> Self {
        DispatchKey::Value(key)
    }
}
