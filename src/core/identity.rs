//! # Identities
//!
//! A multimethod is identified by a name, optionally qualified by a
//! namespace. The composite `namespace.name` is what a [`Registry`]
//! enforces uniqueness over, so two multimethods may share a simple
//! name as long as their namespaces differ.
//!
//! Identities are always built from explicit arguments. Nothing is ever
//! inferred by parsing a function's name.
//!
//! [`Registry`]: crate::Registry

use std::fmt;

/// The (optionally namespaced) name of a multimethod.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    namespace: Option<String>,
    name: String,
}

impl Identity {
    /// An identity with no namespace.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
        }
    }

    /// An identity qualified by a namespace.
    pub fn namespaced(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }

    /// Qualify (or re-qualify) this identity with a namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// The simple name, without any namespace.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The namespace, if this identity is qualified.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{}.{}", namespace, self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl From<&str> for Identity {
    fn from(name: &str) -> Self {
        Identity::new(name)
    }
}

impl From<String> for Identity {
    fn from(name: String) -> Self {
        Identity::new(name)
    }
}

/// `(namespace, name)` pairs convert to a qualified identity.
impl From<(&str, &str)> for Identity {
    fn from((namespace, name): (&str, &str)) -> Self {
        Identity::namespaced(namespace, name)
    }
}
