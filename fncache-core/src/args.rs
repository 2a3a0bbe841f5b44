//! Ordered argument lists.
//!
//! Arguments travel as tuples: `()` for nullary calls, `(a,)` for one
//! argument, `(a, b)` for two, and so on up to eight. Every element must be
//! `Hash`, which is how unhashable arguments are rejected at compile time.

use std::hash::Hash;

use crate::fingerprint::{combine, hash_value};

/// An ordered list of hashable arguments.
pub trait ArgList {
    /// Fold every argument, in call order, into `seed`.
    fn fold_into(&self, seed: u64) -> u64;

    /// Number of arguments in the list.
    fn arity(&self) -> usize;
}

impl ArgList for () {
    fn fold_into(&self, seed: u64) -> u64 {
        seed
    }

    fn arity(&self) -> usize {
        0
    }
}

impl<T: Hash> ArgList for [T] {
    fn fold_into(&self, seed: u64) -> u64 {
        self.iter().fold(seed, |acc, arg| combine(acc, hash_value(arg)))
    }

    fn arity(&self) -> usize {
        self.len()
    }
}

macro_rules! impl_arg_list {
    ($len:expr; $($name:ident : $idx:tt),+) => {
        impl<$($name: Hash),+> ArgList for ($($name,)+) {
            fn fold_into(&self, seed: u64) -> u64 {
                let mut acc = seed;
                $(acc = combine(acc, hash_value(&self.$idx));)+
                acc
            }

            fn arity(&self) -> usize {
                $len
            }
        }
    };
}

impl_arg_list!(1; A: 0);
impl_arg_list!(2; A: 0, B: 1);
impl_arg_list!(3; A: 0, B: 1, C: 2);
impl_arg_list!(4; A: 0, B: 1, C: 2, D: 3);
impl_arg_list!(5; A: 0, B: 1, C: 2, D: 3, E: 4);
impl_arg_list!(6; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
impl_arg_list!(7; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6);
impl_arg_list!(8; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7);
