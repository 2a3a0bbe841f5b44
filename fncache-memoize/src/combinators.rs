//! Function-wrapping combinators.
//!
//! Every combinator takes a [`Callable`] and is itself a [`Callable`] with
//! the same argument tuple, so they nest by ordinary composition:
//!
//! ```ignore
//! // Logs every call, including hits.
//! let outer = Memoized::new(store.clone(), "fib", fib).logged("fib");
//!
//! // Logs only when the function actually runs (misses).
//! let inner = Memoized::new(store, "fib", Logged::new("fib", fib));
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::callable::Callable;

/// Logs the start and end of every call, with elapsed time.
pub struct Logged<C> {
    name: Arc<str>,
    inner: C,
}

impl<C> Logged<C> {
    pub fn new(name: impl Into<Arc<str>>, inner: C) -> Self {
        Self {
            name: name.into(),
            inner,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Invoke the wrapped callable.
    pub fn call<A>(&self, args: A) -> C::Output
    where
        C: Callable<A>,
    {
        self.invoke(args)
    }
}

impl<C, A> Callable<A> for Logged<C>
where
    C: Callable<A>,
{
    type Output = C::Output;

    fn invoke(&self, args: A) -> C::Output {
        let started = Instant::now();
        tracing::debug!(name = %self.name, "call started");

        let output = self.inner.invoke(args);

        tracing::debug!(
            name = %self.name,
            elapsed_us = started.elapsed().as_micros() as u64,
            "call finished"
        );
        output
    }
}

impl<C: Clone> Clone for Logged<C> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            inner: self.inner.clone(),
        }
    }
}

impl<C> fmt::Debug for Logged<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logged")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
