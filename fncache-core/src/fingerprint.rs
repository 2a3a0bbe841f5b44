//! Key derivation: folds an identifier and an ordered argument list into a
//! fixed-width [`Fingerprint`].
//!
//! # Stability
//!
//! Fingerprints are deterministic within a single build of this crate. They
//! are NOT a stable on-disk format: the per-value hash comes from the standard
//! library's default hasher, whose algorithm may change between Rust releases.
//! A durable record written by one build may simply miss under another.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{BuildHasher, BuildHasherDefault, Hash};

use serde::{Deserialize, Serialize};

use crate::args::ArgList;

/// Seed every derivation starts from.
pub const SEED: u64 = 0;

/// Golden-ratio constant used by [`combine`].
const GOLDEN: u64 = 0x9e37_79b9_7f4a_7c15;

/// Opaque fixed-width key derived from an identifier and an argument list.
///
/// The textual form is the decimal rendering of the inner integer, which is
/// what appears in durable record names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Derive the fingerprint for `identifier` called with `args`.
    ///
    /// The identifier is folded into [`SEED`] first, then each argument in
    /// call order. Swapping two unequal arguments changes the result.
    pub fn derive<A: ArgList + ?Sized>(identifier: &str, args: &A) -> Self {
        let seed = combine(SEED, hash_value(identifier));
        Self(args.fold_into(seed))
    }

    /// Derive from a homogeneous sequence instead of a tuple. Agrees with
    /// [`Fingerprint::derive`] on the equivalent tuple or slice.
    pub fn derive_seq<I>(identifier: &str, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Hash,
    {
        let args: Vec<I::Item> = args.into_iter().collect();
        Self::derive(identifier, &args[..])
    }

    /// Use an externally chosen seed as the fingerprint.
    ///
    /// Nothing about the call's arguments is hashed, so equal arguments are no
    /// longer guaranteed to map to the same entry. The caller owns uniqueness.
    pub fn from_seed(seed: u64) -> Self {
        Self(seed)
    }

    /// The raw integer value.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order-sensitive combining step (64-bit `hash_combine`).
pub fn combine(seed: u64, hash: u64) -> u64 {
    seed ^ hash
        .wrapping_add(GOLDEN)
        .wrapping_add(seed << 6)
        .wrapping_add(seed >> 2)
}

/// Structural hash of a single value with a fixed-key hasher.
pub fn hash_value<T: Hash + ?Sized>(value: &T) -> u64 {
    BuildHasherDefault::<DefaultHasher>::default().hash_one(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_is_deterministic() {
        let a = Fingerprint::derive("fib", &(10u64,));
        let b = Fingerprint::derive("fib", &(10u64,));
        assert_eq!(a, b);
    }

    #[test]
    fn test_derive_is_order_sensitive() {
        let a = Fingerprint::derive("f", &(1i32, 2i32));
        let b = Fingerprint::derive("f", &(2i32, 1i32));
        assert_ne!(a, b);
    }

    #[test]
    fn test_derive_is_identifier_sensitive() {
        let a = Fingerprint::derive("f", &(1i32, 2i32));
        let b = Fingerprint::derive("g", &(1i32, 2i32));
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_args_depend_only_on_identifier() {
        let a = Fingerprint::derive("now", &());
        let b = Fingerprint::derive("now", &());
        let c = Fingerprint::derive("later", &());
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.value(), combine(SEED, hash_value("now")));
    }

    #[test]
    fn test_tuple_and_sequence_agree() {
        let tuple = Fingerprint::derive("sum", &(1u32, 2u32, 3u32));
        let seq = Fingerprint::derive_seq("sum", [1u32, 2, 3]);
        assert_eq!(tuple, seq);
    }

    #[test]
    fn test_compound_arguments() {
        let v = vec![5i32; 100];
        let a = Fingerprint::derive("times", &(v.clone(), 5i32));
        let b = Fingerprint::derive("times", &(v, 6i32));
        assert_ne!(a, b);
    }

    #[test]
    fn test_from_seed_is_verbatim() {
        let fp = Fingerprint::from_seed(28725);
        assert_eq!(fp.value(), 28725);
        assert_eq!(fp.to_string(), "28725");
    }

    #[test]
    fn test_combine_depends_on_seed() {
        assert_ne!(combine(0, 42), combine(1, 42));
        assert_ne!(combine(combine(0, 1), 2), combine(combine(0, 2), 1));
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        /// Property: the same identifier and arguments reproduce the same key.
        #[test]
        fn prop_derive_deterministic(
            identifier in "[a-z_]{1,16}",
            a in any::<i64>(),
            b in ".{0,32}",
        ) {
            let first = Fingerprint::derive(&identifier, &(a, b.clone()));
            let second = Fingerprint::derive(&identifier, &(a, b));
            prop_assert_eq!(first, second);
        }

        /// Property: swapping two unequal arguments changes the key.
        #[test]
        fn prop_derive_order_sensitive(
            identifier in "[a-z_]{1,16}",
            a in any::<u64>(),
            b in any::<u64>(),
        ) {
            prop_assume!(a != b);
            prop_assert_ne!(
                Fingerprint::derive(&identifier, &(a, b)),
                Fingerprint::derive(&identifier, &(b, a))
            );
        }

        /// Property: distinct identifiers separate otherwise equal calls.
        #[test]
        fn prop_derive_identifier_sensitive(
            f in "[a-z]{1,12}",
            g in "[a-z]{1,12}",
            arg in any::<i32>(),
        ) {
            prop_assume!(f != g);
            prop_assert_ne!(
                Fingerprint::derive(&f, &(arg,)),
                Fingerprint::derive(&g, &(arg,))
            );
        }
    }
}
