//! # MultiMethod
//!
//! The dispatching callable itself.
//!
//! A `MultiMethod<A, R, K>` owns a dispatch function `Fn(&A) -> K` and a
//! table mapping [`DispatchKey<K>`] to implementations `Fn(&A) -> R`.
//! Calling it runs the dispatch function over the arguments, then:
//!
//! 1. an exact entry for the computed key wins unconditionally;
//! 2. otherwise the entry under [`DispatchKey::Default`], if any;
//! 3. otherwise the call fails with [`Error::NoMatch`].
//!
//! That is the whole algorithm. There is no specificity ordering among
//! non-default entries and no hierarchy between dispatch values.
//!
//! The method table sits behind a read-write lock, so methods can be
//! added and removed through a shared reference while other threads
//! dispatch. A call clones the selected implementation handle out of
//! the table and releases the lock before invoking it; an in-flight
//! call keeps the implementation it resolved even if the entry is
//! replaced or removed mid-call.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::core::{DispatchKey, Identity};
use crate::error::{DispatchResult, Error};
use crate::registry::Registry;

/// A registered implementation. Cloning is cheap (an `Arc` bump).
pub type Method<A, R> = Arc<dyn Fn(&A) -> R + Send + Sync>;

/// Boxed dispatch function.
pub type DispatchFn<A, K> = Box<dyn Fn(&A) -> K + Send + Sync>;

/// A callable that routes to one of several implementations, keyed by
/// the value its dispatch function computes from the call arguments.
///
/// Type parameters:
/// - `A`: the argument shape. May be unsized, so slice arguments like
///   `[i64]` work for variadic-flavored dispatch.
/// - `R`: the return type of every implementation.
/// - `K`: the dispatch key type. Anything `Eq + Hash`.
pub struct MultiMethod<A: ?Sized, R, K> {
    identity: Identity,
    dispatch: DispatchFn<A, K>,
    methods: RwLock<HashMap<DispatchKey<K>, Method<A, R>>>,
}

impl<A: ?Sized, R, K: Eq + Hash> MultiMethod<A, R, K> {
    /// Create a multimethod with a simple (un-namespaced) name.
    ///
    /// The instance starts unregistered; hand it to
    /// [`Registry::register`] to claim its identity, or use
    /// [`Registry::define`] to do both in one step.
    pub fn new<F>(name: impl Into<String>, dispatch: F) -> Self
    where
        F: Fn(&A) -> K + Send + Sync + 'static,
    {
        Self::with_identity(Identity::new(name), dispatch)
    }

    /// Create a multimethod under an explicit [`Identity`].
    pub fn with_identity<F>(identity: Identity, dispatch: F) -> Self
    where
        F: Fn(&A) -> K + Send + Sync + 'static,
    {
        Self {
            identity,
            dispatch: Box::new(dispatch),
            methods: RwLock::new(HashMap::new()),
        }
    }

    /// Start building a multimethod; see [`MultiMethodBuilder`].
    pub fn builder(name: impl Into<String>) -> MultiMethodBuilder<A, R, K> {
        MultiMethodBuilder {
            identity: Identity::new(name),
            dispatch: None,
            _result: PhantomData,
        }
    }

    /// This multimethod's identity.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    // ========================================================================
    // DISPATCH
    // ========================================================================

    /// Dispatch a call.
    ///
    /// Runs the dispatch function over `args`, then invokes the exact
    /// matching implementation, or the default one, or fails with
    /// [`Error::NoMatch`]. Panics inside the dispatch function or the
    /// selected implementation propagate to the caller unchanged.
    pub fn call(&self, args: &A) -> DispatchResult<R> {
        let key = DispatchKey::Value((self.dispatch)(args));

        let selected = {
            let methods = self.methods.read();
            methods
                .get(&key)
                .or_else(|| methods.get(&DispatchKey::Default))
                .cloned()
        };

        // Lock released: a long-running implementation must not block
        // registration, and mid-call table edits must not affect us.
        match selected {
            Some(method) => Ok(method(args)),
            None => Err(Error::NoMatch(self.identity.clone())),
        }
    }

    // ========================================================================
    // METHOD TABLE
    // ========================================================================

    /// Register an implementation under a dispatch value.
    ///
    /// Inserts unconditionally: registering twice for the same value
    /// keeps only the latest implementation. This is also the only way
    /// to update a method.
    pub fn add_method<F>(&self, key: impl Into<DispatchKey<K>>, body: F)
    where
        F: Fn(&A) -> R + Send + Sync + 'static,
    {
        let key = key.into();
        let replaced = self.methods.write().insert(key, Arc::new(body));
        debug!(
            multimethod = %self.identity,
            replaced = replaced.is_some(),
            "method registered"
        );
    }

    /// Remove the implementation registered under a dispatch value.
    ///
    /// Fails with [`Error::UnknownMethod`] if no entry exists. After
    /// removal, calls dispatching to that value fall through to the
    /// default method or to [`Error::NoMatch`].
    pub fn remove_method(&self, key: impl Into<DispatchKey<K>>) -> DispatchResult<()> {
        match self.methods.write().remove(&key.into()) {
            Some(_) => {
                debug!(multimethod = %self.identity, "method removed");
                Ok(())
            }
            None => Err(Error::UnknownMethod(self.identity.clone())),
        }
    }

    /// Fetch the implementation registered under a dispatch value.
    ///
    /// Fails with [`Error::UnknownMethod`] if no entry exists.
    pub fn get_method(&self, key: impl Into<DispatchKey<K>>) -> DispatchResult<Method<A, R>> {
        self.methods
            .read()
            .get(&key.into())
            .cloned()
            .ok_or_else(|| Error::UnknownMethod(self.identity.clone()))
    }

    /// Whether an implementation is registered under a dispatch value.
    pub fn has_method(&self, key: impl Into<DispatchKey<K>>) -> bool {
        self.methods.read().contains_key(&key.into())
    }

    /// Whether a default method is registered.
    pub fn has_default(&self) -> bool {
        self.methods.read().contains_key(&DispatchKey::Default)
    }

    /// Number of registered methods, the default included.
    pub fn method_count(&self) -> usize {
        self.methods.read().len()
    }

    /// Begin an inline registration: `mm.method(key).to(body)`.
    ///
    /// `to` registers the implementation via [`add_method`] and hands
    /// the multimethod back, so registrations chain.
    ///
    /// [`add_method`]: MultiMethod::add_method
    pub fn method(&self, key: impl Into<DispatchKey<K>>) -> MethodBuilder<'_, A, R, K> {
        MethodBuilder {
            target: self,
            key: key.into(),
        }
    }
}

impl<A: ?Sized, R, K> fmt::Debug for MultiMethod<A, R, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MultiMethod('{}')", self.identity)
    }
}

/// A pending inline registration, produced by [`MultiMethod::method`].
#[must_use = "a method builder registers nothing until `.to()` is called"]
pub struct MethodBuilder<'m, A: ?Sized, R, K> {
    target: &'m MultiMethod<A, R, K>,
    key: DispatchKey<K>,
}

impl<'m, A: ?Sized, R, K: Eq + Hash> MethodBuilder<'m, A, R, K> {
    /// Register `body` under the pending dispatch value and return the
    /// owning multimethod for chaining.
    pub fn to<F>(self, body: F) -> &'m MultiMethod<A, R, K>
    where
        F: Fn(&A) -> R + Send + Sync + 'static,
    {
        self.target.add_method(self.key, body);
        self.target
    }
}

/// Builds a [`MultiMethod`] piecewise.
///
/// Unlike [`MultiMethod::new`], the dispatch function is optional while
/// building, so finishing is fallible: [`build`] reports
/// [`Error::MissingDispatchFn`] when none was supplied.
///
/// [`build`]: MultiMethodBuilder::build
pub struct MultiMethodBuilder<A: ?Sized, R, K> {
    identity: Identity,
    dispatch: Option<DispatchFn<A, K>>,
    _result: PhantomData<fn() -> R>,
}

impl<A: ?Sized, R, K: Eq + Hash> MultiMethodBuilder<A, R, K> {
    /// Qualify the multimethod's name with a namespace.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.identity = self.identity.with_namespace(namespace);
        self
    }

    /// Supply the dispatch function.
    pub fn dispatcher<F>(mut self, dispatch: F) -> Self
    where
        F: Fn(&A) -> K + Send + Sync + 'static,
    {
        self.dispatch = Some(Box::new(dispatch));
        self
    }

    /// Finish building. Fails with [`Error::MissingDispatchFn`] if no
    /// dispatch function was supplied.
    pub fn build(self) -> DispatchResult<MultiMethod<A, R, K>> {
        let dispatch = self
            .dispatch
            .ok_or_else(|| Error::MissingDispatchFn(self.identity.clone()))?;

        Ok(MultiMethod {
            identity: self.identity,
            dispatch,
            methods: RwLock::new(HashMap::new()),
        })
    }

    /// Finish building and register in `registry` in one step.
    pub fn register(
        self,
        registry: &Registry<A, R, K>,
    ) -> DispatchResult<Arc<MultiMethod<A, R, K>>> {
        registry.register(self.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn speaksum() -> MultiMethod<[i64], &'static str, i64> {
        let mm = MultiMethod::new("speaksum", |args: &[i64]| args.iter().sum());
        mm.method(2)
            .to(|_| "Two")
            .method(5)
            .to(|_| "Five")
            .method(DispatchKey::Default)
            .to(|_| "Another");
        mm
    }

    #[test]
    fn test_exact_match_wins() {
        let mm = speaksum();

        assert_eq!(mm.call(&[1, 1, 0]).unwrap(), "Two");
        assert_eq!(mm.call(&[3, 2]).unwrap(), "Five");
    }

    #[test]
    fn test_falls_through_to_default() {
        let mm = speaksum();

        assert_eq!(mm.call(&[9, 8, 2]).unwrap(), "Another");
        assert_eq!(mm.call(&[3, 5, 6]).unwrap(), "Another");
    }

    #[test]
    fn test_identity_dispatch() {
        let mm: MultiMethod<i64, &'static str, i64> = MultiMethod::new("foomethod", |x: &i64| *x);

        mm.add_method(42, |_| "The Answer");
        mm.add_method(1024, |_| "2^10");
        mm.add_method(DispatchKey::Default, |_| "Nothing");

        assert_eq!(mm.call(&42).unwrap(), "The Answer");
        assert_eq!(mm.call(&1024).unwrap(), "2^10");
        assert_eq!(mm.call(&7).unwrap(), "Nothing");
    }

    #[test]
    fn test_no_match_and_no_default_fails() {
        let mm: MultiMethod<i64, i64, i64> = MultiMethod::new("lonely", |x: &i64| *x);

        let err = mm.call(&1).unwrap_err();
        assert!(matches!(err, Error::NoMatch(_)));
        assert_eq!(err.identity().name(), "lonely");
        assert!(err.to_string().contains("lonely"));
    }

    #[test]
    fn test_add_method_overwrites() {
        let mm: MultiMethod<i64, &'static str, i64> = MultiMethod::new("versions", |x: &i64| *x);

        mm.add_method(1, |_| "first");
        assert_eq!(mm.call(&1).unwrap(), "first");

        mm.add_method(1, |_| "second");
        assert_eq!(mm.call(&1).unwrap(), "second");
        assert_eq!(mm.method_count(), 1);
    }

    #[test]
    fn test_remove_method_cycle() {
        let mm: MultiMethod<i64, i64, i64> = MultiMethod::new("barmethod", |x: &i64| *x);

        mm.add_method(1, |_| 123);
        assert_eq!(mm.call(&1).unwrap(), 123);

        mm.remove_method(1).unwrap();
        assert!(mm.call(&1).is_err());

        mm.add_method(DispatchKey::Default, |_| 42);
        assert_eq!(mm.call(&99).unwrap(), 42);
        assert_eq!(mm.call(&1).unwrap(), 42);

        mm.remove_method(DispatchKey::Default).unwrap();
        assert!(mm.call(&99).is_err());
        assert!(mm.call(&1).is_err());
    }

    #[test]
    fn test_remove_absent_method_fails() {
        let mm: MultiMethod<i64, i64, i64> = MultiMethod::new("barmethod", |x: &i64| *x);

        let err = mm.remove_method(1).unwrap_err();
        assert!(matches!(err, Error::UnknownMethod(_)));
    }

    #[test]
    fn test_get_method() {
        let mm: MultiMethod<i64, i64, i64> = MultiMethod::new("getter", |x: &i64| *x);
        mm.add_method(1, |x| x * 10);

        let method = mm.get_method(1).unwrap();
        assert_eq!(method(&5), 50);

        assert!(matches!(
            mm.get_method(2),
            Err(Error::UnknownMethod(_))
        ));
    }

    #[test]
    fn test_introspection() {
        let mm = speaksum();

        assert!(mm.has_method(2));
        assert!(!mm.has_method(3));
        assert!(mm.has_default());
        assert_eq!(mm.method_count(), 3);
    }

    #[test]
    fn test_builder_requires_dispatcher() {
        let err = MultiMethod::<i64, i64, i64>::builder("halfbuilt")
            .build()
            .unwrap_err();

        assert!(matches!(err, Error::MissingDispatchFn(_)));
        assert_eq!(err.identity().name(), "halfbuilt");
    }

    #[test]
    fn test_builder_with_namespace() {
        let mm = MultiMethod::<i64, i64, i64>::builder("area")
            .namespace("geometry")
            .dispatcher(|x: &i64| *x)
            .build()
            .unwrap();

        assert_eq!(mm.identity().to_string(), "geometry.area");
    }

    #[test]
    fn test_dispatch_failure_propagates() {
        let mm: MultiMethod<i64, i64, i64> =
            MultiMethod::new("fussy", |x: &i64| if *x < 0 { panic!("negative") } else { *x });
        mm.add_method(DispatchKey::Default, |_| 0);

        assert_eq!(mm.call(&1).unwrap(), 0);
        let boom = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| mm.call(&-1)));
        assert!(boom.is_err());
    }

    #[test]
    fn test_fallible_implementations_pass_through() {
        // Implementations that can fail pick R = Result; the crate
        // hands their value back without touching it.
        let mm: MultiMethod<i64, Result<i64, String>, i64> =
            MultiMethod::new("checked", |x: &i64| *x);
        mm.add_method(1, |_| Ok(10));
        mm.add_method(DispatchKey::Default, |x| Err(format!("bad input {x}")));

        assert_eq!(mm.call(&1).unwrap(), Ok(10));
        assert_eq!(mm.call(&2).unwrap(), Err("bad input 2".to_string()));
    }

    #[test]
    fn test_debug_names_the_multimethod() {
        let mm: MultiMethod<i64, i64, i64> = MultiMethod::new("shown", |x: &i64| *x);
        assert_eq!(format!("{mm:?}"), "MultiMethod('shown')");
    }

    #[test]
    fn test_concurrent_dispatch_and_registration() {
        let mm: Arc<MultiMethod<i64, i64, i64>> =
            Arc::new(MultiMethod::new("busy", |x: &i64| *x % 2));
        mm.add_method(DispatchKey::Default, |_| -1);

        std::thread::scope(|scope| {
            for worker in 0..4 {
                let mm = &mm;
                scope.spawn(move || {
                    for i in 0..500 {
                        if worker == 0 && i % 50 == 0 {
                            mm.add_method(0, |x| x * 2);
                        }
                        // Exact match or default, never a NoMatch panic.
                        let _ = mm.call(&i).unwrap();
                    }
                });
            }
        });
    }
}
