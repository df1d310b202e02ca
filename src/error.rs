//! # Errors
//!
//! Everything this crate can fail with, in one enum.
//!
//! Failures raised *inside* caller-supplied code - a panicking dispatch
//! function, or an implementation whose return type is itself a
//! `Result` - are not represented here. The crate never wraps,
//! suppresses, or retries caller logic; those failures propagate to the
//! caller untouched.

use thiserror::Error;

use crate::core::Identity;

/// Result alias used across the crate's fallible surface.
pub type DispatchResult<T> = std::result::Result<T, Error>;

/// All failure modes of the multimethod machinery itself.
#[derive(Debug, Error)]
pub enum Error {
    /// A builder was finished without ever being given a dispatch function.
    #[error("multimethod '{0}' was built without a dispatch function")]
    MissingDispatchFn(Identity),

    /// A registry already holds a multimethod under this identity.
    ///
    /// The previously registered instance is untouched and stays usable.
    #[error("multimethod '{0}' already exists in this registry")]
    DuplicateName(Identity),

    /// A registry lookup named an identity that was never registered.
    #[error("multimethod '{0}' not found in this registry")]
    UnknownMultiMethod(Identity),

    /// `remove_method` or `get_method` named a dispatch value with no entry.
    #[error("no method registered on multimethod '{0}' for that dispatch value")]
    UnknownMethod(Identity),

    /// A call found neither an exact match nor a default method.
    #[error("no matching method on multimethod '{0}' and no default method defined")]
    NoMatch(Identity),
}

impl Error {
    /// The identity of the multimethod the failure concerns.
    pub fn identity(&self) -> &Identity {
        match self {
            Error::MissingDispatchFn(identity)
            | Error::DuplicateName(identity)
            | Error::UnknownMultiMethod(identity)
            | Error::UnknownMethod(identity)
            | Error::NoMatch(identity) => identity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_multimethod() {
        let err = Error::NoMatch(Identity::new("speaksum"));
        assert_eq!(
            err.to_string(),
            "no matching method on multimethod 'speaksum' and no default method defined"
        );
        assert_eq!(err.identity().name(), "speaksum");

        let err = Error::DuplicateName(Identity::namespaced("geometry", "area"));
        assert!(err.to_string().contains("geometry.area"));
    }
}
