//! Entry keys: an identifier paired with a fingerprint.
//!
//! `EntryKey`'s private inner struct means a key can only be built through
//! [`EntryKey::new`], which rejects identifiers that cannot name a durable
//! record. Every store therefore sees only well-formed keys.

use std::fmt;

use crate::args::ArgList;
use crate::error::KeyError;
use crate::fingerprint::Fingerprint;

/// Identifier used when a caller does not name the function.
pub const ANONYMOUS: &str = "anonymous";

/// Separator between identifier and fingerprint in the record name.
const SEPARATOR: char = '-';

/// Longest file name most file systems accept, in bytes.
const MAX_RECORD_NAME: usize = 255;

/// Widest decimal rendering of a fingerprint (`u64::MAX`).
const MAX_FINGERPRINT_DIGITS: usize = 20;

/// Longest identifier whose record name still fits in 255 bytes.
pub const MAX_IDENTIFIER_LEN: usize = MAX_RECORD_NAME - 1 - MAX_FINGERPRINT_DIGITS;

/// The (identifier, fingerprint) pair a cache entry lives under.
///
/// # Record Name
///
/// The textual form is `<identifier>-<fingerprint>`, e.g. `fib-1234567`.
/// The durable store uses it verbatim as the file name inside its root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryKey {
    inner: EntryKeyInner,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct EntryKeyInner {
    identifier: String,
    fingerprint: Fingerprint,
}

impl EntryKey {
    /// Pair an identifier with an already computed fingerprint.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidIdentifier`] if the identifier is empty,
    /// starts with `.`, is longer than [`MAX_IDENTIFIER_LEN`] bytes, or
    /// contains a path separator or NUL byte.
    pub fn new(identifier: impl Into<String>, fingerprint: Fingerprint) -> Result<Self, KeyError> {
        let identifier = identifier.into();
        validate_identifier(&identifier)?;
        Ok(Self {
            inner: EntryKeyInner {
                identifier,
                fingerprint,
            },
        })
    }

    /// Derive the fingerprint from `args` and pair it with `identifier`.
    pub fn derive<A: ArgList + ?Sized>(identifier: &str, args: &A) -> Result<Self, KeyError> {
        Self::new(identifier, Fingerprint::derive(identifier, args))
    }

    /// Pair `identifier` with an externally chosen seed.
    pub fn seeded(identifier: &str, seed: u64) -> Result<Self, KeyError> {
        Self::new(identifier, Fingerprint::from_seed(seed))
    }

    pub fn identifier(&self) -> &str {
        &self.inner.identifier
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.inner.fingerprint
    }

    /// The record name, `<identifier>-<fingerprint>`.
    pub fn record_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.inner.identifier, SEPARATOR, self.inner.fingerprint
        )
    }
}

fn validate_identifier(identifier: &str) -> Result<(), KeyError> {
    let reason = if identifier.is_empty() {
        "identifier must not be empty"
    } else if identifier.starts_with('.') {
        "identifier must not start with '.'"
    } else if identifier.len() > MAX_IDENTIFIER_LEN {
        "identifier is too long to form a record name"
    } else if identifier.contains(['/', '\\']) {
        "identifier must not contain a path separator"
    } else if identifier.contains('\0') {
        "identifier must not contain a NUL byte"
    } else {
        return Ok(());
    };

    Err(KeyError::InvalidIdentifier {
        identifier: identifier.to_string(),
        reason: reason.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_name_format() {
        let key = EntryKey::seeded("fib", 28725).unwrap();
        assert_eq!(key.record_name(), "fib-28725");
        assert_eq!(key.identifier(), "fib");
        assert_eq!(key.fingerprint(), Fingerprint::from_seed(28725));
    }

    #[test]
    fn test_derive_matches_fingerprint() {
        let key = EntryKey::derive("fib", &(10u64,)).unwrap();
        assert_eq!(key.fingerprint(), Fingerprint::derive("fib", &(10u64,)));
    }

    #[test]
    fn test_identifiers_with_dashes_are_allowed() {
        let key = EntryKey::seeded("fib-2", 1).unwrap();
        assert_eq!(key.to_string(), "fib-2-1");
    }

    #[test]
    fn test_invalid_identifiers_rejected() {
        let too_long = "f".repeat(MAX_IDENTIFIER_LEN + 1);
        for bad in [
            "",
            ".",
            "..",
            ".fncache-x",
            "a/b",
            "a\\b",
            "nul\0byte",
            too_long.as_str(),
        ] {
            let err = EntryKey::seeded(bad, 1).unwrap_err();
            assert!(
                matches!(err, KeyError::InvalidIdentifier { .. }),
                "expected rejection for {bad:?}"
            );
        }
    }

    #[test]
    fn test_longest_identifier_fits_record_name() {
        let longest = "f".repeat(MAX_IDENTIFIER_LEN);
        let key = EntryKey::seeded(&longest, u64::MAX).unwrap();
        assert_eq!(key.record_name().len(), MAX_RECORD_NAME);
    }

    #[test]
    fn test_same_fingerprint_different_identifier_differs() {
        let a = EntryKey::seeded("a", 7).unwrap();
        let b = EntryKey::seeded("b", 7).unwrap();
        assert_ne!(a, b);
        assert_ne!(a.record_name(), b.record_name());
    }
}
