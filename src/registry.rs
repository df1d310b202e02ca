//! # Registry
//!
//! An append-only map from [`Identity`] to a live [`MultiMethod`].
//!
//! The registry exists so a multimethod defined in one place can be
//! extended from another: code that never sees the instance resolves it
//! by identity and attaches methods via [`Registry::attach`]. Entries
//! are inserted when a multimethod is defined and never removed; the
//! check-then-insert runs under one lock, so two threads racing to
//! claim an identity see exactly one winner.
//!
//! The registry is an explicit value the caller owns and passes around.
//! There is no process-wide instance.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::core::{DispatchKey, Identity};
use crate::error::{DispatchResult, Error};
use crate::multimethod::MultiMethod;

/// Holds every multimethod defined through it, keyed by identity.
///
/// Identities are unique per registry: same name, different namespace
/// coexist; same composite identity collides.
pub struct Registry<A: ?Sized, R, K> {
    entries: Mutex<HashMap<Identity, Arc<MultiMethod<A, R, K>>>>,
}

impl<A: ?Sized, R, K: Eq + Hash> Registry<A, R, K> {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    // ========================================================================
    // DEFINITION
    // ========================================================================

    /// Claim `multimethod`'s identity and share the instance.
    ///
    /// Fails with [`Error::DuplicateName`] if the identity is taken.
    /// On collision the registered instance is untouched - a failed
    /// attempt never disturbs the original.
    pub fn register(
        &self,
        multimethod: MultiMethod<A, R, K>,
    ) -> DispatchResult<Arc<MultiMethod<A, R, K>>> {
        let mut entries = self.entries.lock();
        match entries.entry(multimethod.identity().clone()) {
            Entry::Occupied(taken) => Err(Error::DuplicateName(taken.key().clone())),
            Entry::Vacant(slot) => {
                let shared = Arc::new(multimethod);
                debug!(multimethod = %shared.identity(), "multimethod registered");
                slot.insert(Arc::clone(&shared));
                Ok(shared)
            }
        }
    }

    /// Define a multimethod with a simple name and register it.
    pub fn define<F>(
        &self,
        name: impl Into<String>,
        dispatch: F,
    ) -> DispatchResult<Arc<MultiMethod<A, R, K>>>
    where
        F: Fn(&A) -> K + Send + Sync + 'static,
    {
        self.register(MultiMethod::new(name, dispatch))
    }

    /// Define a namespaced multimethod and register it.
    pub fn define_in<F>(
        &self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        dispatch: F,
    ) -> DispatchResult<Arc<MultiMethod<A, R, K>>>
    where
        F: Fn(&A) -> K + Send + Sync + 'static,
    {
        self.register(MultiMethod::with_identity(
            Identity::namespaced(namespace, name),
            dispatch,
        ))
    }

    // ========================================================================
    // RESOLUTION
    // ========================================================================

    /// Resolve a multimethod by identity.
    ///
    /// Fails with [`Error::UnknownMultiMethod`] if nothing was
    /// registered under it.
    pub fn lookup(
        &self,
        identity: impl Into<Identity>,
    ) -> DispatchResult<Arc<MultiMethod<A, R, K>>> {
        let identity = identity.into();
        self.entries
            .lock()
            .get(&identity)
            .cloned()
            .ok_or(Error::UnknownMultiMethod(identity))
    }

    /// Attach a method to a multimethod defined elsewhere.
    ///
    /// Resolves `identity`, registers `body` under `key`, and returns
    /// the resolved multimethod. Fails with
    /// [`Error::UnknownMultiMethod`] if the identity is unregistered;
    /// the multimethod must exist before methods can be attached.
    pub fn attach<F>(
        &self,
        identity: impl Into<Identity>,
        key: impl Into<DispatchKey<K>>,
        body: F,
    ) -> DispatchResult<Arc<MultiMethod<A, R, K>>>
    where
        F: Fn(&A) -> R + Send + Sync + 'static,
    {
        let target = self.lookup(identity)?;
        target.add_method(key, body);
        Ok(target)
    }

    /// Whether an identity is registered.
    pub fn contains(&self, identity: impl Into<Identity>) -> bool {
        self.entries.lock().contains_key(&identity.into())
    }

    /// Number of registered multimethods.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl<A: ?Sized, R, K: Eq + Hash> Default for Registry<A, R, K> {
    fn default() -> Self {
        Self::new()
    }
}
