//! The memoizing wrapper.
//!
//! A [`Memoized`] binds a store, an identifier and a function into one
//! callable. It holds the store through an `Arc`, so every wrapper built on
//! the same store sees the others' writes. Construction is cheap: building a
//! fresh wrapper at each call site is fine.

use std::fmt;
use std::sync::Arc;

use fncache_core::{ArgList, EntryKey, Fingerprint, MemoError, MemoResult, ANONYMOUS};
use fncache_storage::ValueStore;

use crate::callable::Callable;

/// A function that caches its results in a [`ValueStore`].
///
/// # Example
///
/// ```ignore
/// let store = Arc::new(MemoryStore::new());
/// let fib = Memoized::new(store, "fib", fib);
///
/// assert_eq!(fib.call((10u64,))?, 55);
/// assert_eq!(fib.call((10u64,))?, 55); // served from the store
/// ```
pub struct Memoized<S, F> {
    store: Arc<S>,
    identifier: Arc<str>,
    func: F,
}

impl<S, F> Memoized<S, F> {
    pub fn new(store: Arc<S>, identifier: impl Into<Arc<str>>, func: F) -> Self {
        Self {
            store,
            identifier: identifier.into(),
            func,
        }
    }

    /// Wrap under the shared `"anonymous"` identifier.
    ///
    /// Two different functions wrapped anonymously and called with equal
    /// arguments share an entry. Only use this for one-off calls.
    pub fn anonymous(store: Arc<S>, func: F) -> Self {
        Self::new(store, ANONYMOUS, func)
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn func(&self) -> &F {
        &self.func
    }

    /// Call through the cache, keyed by the identifier and `args`.
    pub fn call<A>(&self, args: A) -> MemoResult<<F as Callable<A>>::Output>
    where
        A: ArgList,
        F: Callable<A>,
        S: ValueStore<<F as Callable<A>>::Output>,
    {
        let key = EntryKey::derive(&self.identifier, &args)?;
        self.store.get_or_compute(&key, || self.func.invoke(args))
    }

    /// Call through the cache under a precomputed fingerprint.
    ///
    /// `args` are not hashed and need not be `Hash`. The caller is responsible
    /// for choosing a fingerprint that is unique per distinct call.
    pub fn call_with_fingerprint<A>(
        &self,
        fingerprint: Fingerprint,
        args: A,
    ) -> MemoResult<<F as Callable<A>>::Output>
    where
        F: Callable<A>,
        S: ValueStore<<F as Callable<A>>::Output>,
    {
        let key = EntryKey::new(&*self.identifier, fingerprint)?;
        self.store.get_or_compute(&key, || self.func.invoke(args))
    }

    /// Call through the cache under an arbitrary seed.
    pub fn call_seeded<A>(&self, seed: u64, args: A) -> MemoResult<<F as Callable<A>>::Output>
    where
        F: Callable<A>,
        S: ValueStore<<F as Callable<A>>::Output>,
    {
        self.call_with_fingerprint(Fingerprint::from_seed(seed), args)
    }

    /// Call a fallible function through the cache.
    ///
    /// Only `Ok` results are stored. An `Err` from the function is returned
    /// unmodified; cache failures are converted into `E`.
    pub fn try_call<A, T, E>(&self, args: A) -> Result<T, E>
    where
        A: ArgList,
        F: Callable<A, Output = Result<T, E>>,
        S: ValueStore<T>,
        E: From<MemoError>,
    {
        let key = EntryKey::derive(&self.identifier, &args)
            .map_err(|e| E::from(MemoError::from(e)))?;
        self.store.get_or_try_compute(&key, || self.func.invoke(args))
    }
}

impl<S, F, A> Callable<A> for Memoized<S, F>
where
    A: ArgList,
    F: Callable<A>,
    S: ValueStore<<F as Callable<A>>::Output>,
{
    type Output = MemoResult<<F as Callable<A>>::Output>;

    fn invoke(&self, args: A) -> Self::Output {
        self.call(args)
    }
}

impl<S, F: Clone> Clone for Memoized<S, F> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            identifier: Arc::clone(&self.identifier),
            func: self.func.clone(),
        }
    }
}

impl<S, F> fmt::Debug for Memoized<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoized")
            .field("identifier", &self.identifier)
            .field("store", &std::any::type_name::<S>())
            .finish_non_exhaustive()
    }
}
