//! Self-reference registry.
//!
//! A recursive function cannot be handed its own memoized wrapper before
//! that wrapper exists. Instead, the function is registered once under an
//! explicit tag, and recursive calls go through [`Registry::call`] (or the
//! global [`call_memoized`]), which rebuilds the wrapper from the stored
//! (identifier, store) pair.
//!
//! # Keys
//!
//! Registrations are keyed by `(store type, tag)`. Tags are chosen by the
//! caller; nothing is inferred from function identity, which Rust does not
//! expose reliably for closures.
//!
//! # First Registration Wins
//!
//! Registering a tag that is already present is a no-op for the registry:
//! the wrapper returned uses the arguments passed, but later recursive calls
//! keep resolving to the FIRST store and identifier. This is surprising and
//! intentional; a mismatching re-registration is logged at `debug`.
//!
//! # Lifetimes
//!
//! A registration holds a clone of the store's `Arc`, so the store lives at
//! least as long as the registration. For [`Registry::global`] that is the
//! rest of the process.

use std::any::{type_name, Any, TypeId};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use fncache_core::{
    ArgList, CacheEvent, EventSink, MemoError, MemoResult, RegistryError, TracingSink,
};
use fncache_storage::ValueStore;
use once_cell::sync::Lazy;

use crate::callable::Callable;
use crate::memoized::Memoized;

static GLOBAL: Lazy<Registry> = Lazy::new(Registry::new);

type StoreHandle = Arc<dyn Any + Send + Sync>;

#[derive(Clone)]
struct Registration {
    identifier: Arc<str>,
    store: StoreHandle,
}

/// Table of (identifier, store) pairs for recursively memoized functions.
pub struct Registry {
    table: RwLock<HashMap<(TypeId, String), Registration>>,
    sink: Arc<dyn EventSink>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(HashMap::new()),
            sink: Arc::new(TracingSink),
        }
    }

    /// Replace the event sink.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// The process-wide registry used by [`register_or_get`] and
    /// [`call_memoized`].
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    /// Register `tag` with `store` and `identifier` unless it is already
    /// registered for this store type, then return a wrapper for `func`.
    ///
    /// The returned wrapper always uses the `store` and `identifier` passed
    /// here, even when an earlier registration keeps the tag.
    pub fn register_or_get<S, F>(
        &self,
        tag: &str,
        store: &Arc<S>,
        identifier: &str,
        func: F,
    ) -> Memoized<S, F>
    where
        S: Send + Sync + 'static,
    {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);

        let newly_registered = match table.entry((TypeId::of::<S>(), tag.to_string())) {
            Entry::Vacant(slot) => {
                slot.insert(Registration {
                    identifier: Arc::from(identifier),
                    store: Arc::clone(store) as StoreHandle,
                });
                true
            }
            Entry::Occupied(existing) => {
                let existing = existing.get();
                let same_store =
                    Arc::as_ptr(&existing.store) as *const () == Arc::as_ptr(store) as *const ();
                if !same_store || &*existing.identifier != identifier {
                    tracing::debug!(
                        tag = %tag,
                        registered_identifier = %existing.identifier,
                        requested_identifier = %identifier,
                        same_store,
                        "registration ignored, tag already registered"
                    );
                }
                false
            }
        };
        drop(table);

        if newly_registered {
            self.sink.record(&CacheEvent::Registered {
                identifier: identifier.to_string(),
                tag: tag.to_string(),
            });
        }

        Memoized::new(Arc::clone(store), identifier, func)
    }

    /// Call `func` through the store and identifier registered for `tag`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotRegistered`] if `tag` was never registered
    /// with a store of type `S`, plus whatever the memoized call returns.
    pub fn call<S, F, A>(
        &self,
        tag: &str,
        func: F,
        args: A,
    ) -> MemoResult<<F as Callable<A>>::Output>
    where
        S: ValueStore<<F as Callable<A>>::Output> + 'static,
        F: Callable<A>,
        A: ArgList,
    {
        self.resolve::<S, F>(tag, func)?.call(args)
    }

    /// Fallible counterpart of [`Registry::call`].
    pub fn try_call<S, F, A, T, E>(&self, tag: &str, func: F, args: A) -> Result<T, E>
    where
        S: ValueStore<T> + 'static,
        F: Callable<A, Output = Result<T, E>>,
        A: ArgList,
        E: From<MemoError>,
    {
        self.resolve::<S, F>(tag, func)
            .map_err(|e| E::from(MemoError::from(e)))?
            .try_call(args)
    }

    /// Whether `tag` is registered for store type `S`.
    pub fn is_registered<S: 'static>(&self, tag: &str) -> bool {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&(TypeId::of::<S>(), tag.to_string()))
    }

    /// The identifier registered for `tag` and store type `S`.
    pub fn identifier_of<S: 'static>(&self, tag: &str) -> Option<String> {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(TypeId::of::<S>(), tag.to_string()))
            .map(|registration| registration.identifier.to_string())
    }

    /// Number of registrations across all store types.
    pub fn len(&self) -> usize {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build a wrapper from the registration. The table lock is released
    /// before returning so the wrapped function may recurse.
    fn resolve<S, F>(&self, tag: &str, func: F) -> Result<Memoized<S, F>, RegistryError>
    where
        S: Send + Sync + 'static,
    {
        let not_registered = || RegistryError::NotRegistered {
            tag: tag.to_string(),
            store_type: type_name::<S>().to_string(),
        };

        let registration = self
            .table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(TypeId::of::<S>(), tag.to_string()))
            .cloned()
            .ok_or_else(not_registered)?;

        let store = registration
            .store
            .downcast::<S>()
            .map_err(|_| not_registered())?;

        Ok(Memoized::new(store, registration.identifier, func))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("registrations", &self.len())
            .finish_non_exhaustive()
    }
}

/// [`Registry::register_or_get`] on the global registry.
pub fn register_or_get<S, F>(
    tag: &str,
    store: &Arc<S>,
    identifier: &str,
    func: F,
) -> Memoized<S, F>
where
    S: Send + Sync + 'static,
{
    Registry::global().register_or_get(tag, store, identifier, func)
}

/// [`Registry::call`] on the global registry.
pub fn call_memoized<S, F, A>(
    tag: &str,
    func: F,
    args: A,
) -> MemoResult<<F as Callable<A>>::Output>
where
    S: ValueStore<<F as Callable<A>>::Output> + 'static,
    F: Callable<A>,
    A: ArgList,
{
    Registry::global().call::<S, F, A>(tag, func, args)
}
