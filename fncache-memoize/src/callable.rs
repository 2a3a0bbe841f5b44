//! The callable capability shared by plain functions and combinators.
//!
//! Arguments are passed as a tuple, so a two-argument function `f(a, b)` is
//! invoked as `f.invoke((a, b))` and a unary one as `f.invoke((a,))`.

use std::sync::Arc;

use crate::combinators::Logged;
use crate::memoized::Memoized;

/// Something that can be called with the argument tuple `Args`.
pub trait Callable<Args> {
    type Output;

    fn invoke(&self, args: Args) -> Self::Output;
}

impl<F, R> Callable<()> for F
where
    F: Fn() -> R,
{
    type Output = R;

    fn invoke(&self, _args: ()) -> R {
        self()
    }
}

macro_rules! impl_callable {
    ($($name:ident),+) => {
        impl<Func, Ret, $($name),+> Callable<($($name,)+)> for Func
        where
            Func: Fn($($name),+) -> Ret,
        {
            type Output = Ret;

            #[allow(non_snake_case)]
            fn invoke(&self, ($($name,)+): ($($name,)+)) -> Ret {
                self($($name),+)
            }
        }
    };
}

impl_callable!(A);
impl_callable!(A, B);
impl_callable!(A, B, C);
impl_callable!(A, B, C, D);
impl_callable!(A, B, C, D, E);
impl_callable!(A, B, C, D, E, F);
impl_callable!(A, B, C, D, E, F, G);
impl_callable!(A, B, C, D, E, F, G, H);

/// Builder-style combinators available on every value.
pub trait CallableExt: Sized {
    /// Wrap in a start/stop logger.
    fn logged(self, name: impl Into<Arc<str>>) -> Logged<Self> {
        Logged::new(name, self)
    }

    /// Memoize through `store` under `identifier`.
    fn memoize<S>(self, store: Arc<S>, identifier: impl Into<Arc<str>>) -> Memoized<S, Self> {
        Memoized::new(store, identifier, self)
    }
}

impl<T> CallableExt for T {}
