//! # Multiway - keyed multiple dispatch
//!
//! > "Dispatch on what the arguments *mean*, not what they *are*"
//!
//! Multiway brings Clojure-style multimethods to Rust. A
//! [`MultiMethod`] is a callable that computes a dispatch key from its
//! arguments with a user-supplied function, then routes the call to the
//! implementation registered under that key - falling back to a default
//! implementation when no exact match exists.
//!
//! ## Philosophy
//!
//! - **The dispatch value is opaque** - any `Eq + Hash` type works; it is
//!   never derived from argument types
//! - **Exact match beats default, always** - there is no specificity
//!   ordering and no hierarchy between dispatch values
//! - **Identity lives in the registry** - multimethods are resolved by
//!   explicit (optionally namespaced) names, never by parsing symbols
//! - **Caller failures pass through** - the library never wraps or
//!   retries user code
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        MULTIWAY                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                             │
//! │  CORE (pure data, no locks)                                 │
//! │    DispatchKey, Identity                                    │
//! │                                                             │
//! │  MULTIMETHOD (dispatch engine)                              │
//! │    dispatch fn → method table → exact | default | NoMatch   │
//! │                                                             │
//! │  REGISTRY (identity map)                                    │
//! │    define / lookup / attach, append-only                    │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use multiway::{DispatchKey, Registry};
//!
//! # fn main() -> Result<(), multiway::Error> {
//! let registry: Registry<[i64], &'static str, i64> = Registry::new();
//!
//! // Dispatch on the sum of the arguments.
//! let speaksum = registry.define("speaksum", |args: &[i64]| args.iter().sum())?;
//!
//! speaksum
//!     .method(2).to(|_| "Two")
//!     .method(5).to(|_| "Five")
//!     .method(DispatchKey::Default).to(|_| "Another");
//!
//! assert_eq!(speaksum.call(&[1, 1, 0])?, "Two");
//! assert_eq!(speaksum.call(&[3, 2])?, "Five");
//! assert_eq!(speaksum.call(&[9, 8, 2])?, "Another");
//!
//! // Elsewhere, without the instance in hand:
//! registry.attach("speaksum", 0, |_| "Zero")?;
//! assert_eq!(registry.lookup("speaksum")?.call(&[0, 0])?, "Zero");
//! # Ok(())
//! # }
//! ```

// ============================================================================
// MODULES
// ============================================================================

/// Core domain - dispatch keys and identities, pure data
pub mod core;

/// Crate-wide error taxonomy
pub mod error;

/// The dispatching callable and its method table
pub mod multimethod;

/// Append-only identity map enabling cross-site registration
pub mod registry;

// ============================================================================
// RE-EXPORTS (public API)
// ============================================================================

pub use crate::core::{DispatchKey, Identity};
pub use crate::error::{DispatchResult, Error};
pub use crate::multimethod::{
    DispatchFn, Method, MethodBuilder, MultiMethod, MultiMethodBuilder,
};
pub use crate::registry::Registry;
