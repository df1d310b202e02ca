//! # Core
//!
//! The pure domain types - no locks, no I/O.
//!
//! Contains:
//! - `DispatchKey` - the opaque value a dispatch function selects on,
//!   plus the reserved `Default` sentinel
//! - `Identity` - a multimethod's (optionally namespaced) name

pub mod identity;
pub mod key;

pub use identity::Identity;
pub use key::DispatchKey;
