//! ETag Value Module
//!
//! Weak validators derived from the SHA-256 digest of a file's full content.

use std::fmt;
use std::io::{self, Read};

use sha2::{Digest, Sha256};

// == ETag ==
/// A weak validator of the form `W/"<lowercase hex sha256>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ETag(String);

impl ETag {
    // == Constructors ==
    /// Formats a raw digest as a weak validator.
    pub fn from_digest(digest: &[u8]) -> Self {
        Self(format!("W/\"{}\"", hex::encode(digest)))
    }

    /// Streams `reader` to the end through SHA-256.
    pub fn compute<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        let mut hasher = Sha256::new();
        io::copy(reader, &mut hasher)?;
        Ok(Self::from_digest(&hasher.finalize()))
    }

    /// Returns the header value, quotes and `W/` prefix included.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the quoted opaque tag without the weakness indicator.
    fn opaque(&self) -> &str {
        self.0.trim_start_matches("W/")
    }

    // == Weak Comparison ==
    /// Checks an `If-None-Match` header value against this tag.
    ///
    /// Uses weak comparison: `W/` prefixes are ignored on both sides and `*`
    /// matches any current representation.
    pub fn matches(&self, if_none_match: &str) -> bool {
        candidates(if_none_match).any(|candidate| {
            candidate == "*" || candidate.trim_start_matches("W/") == self.opaque()
        })
    }

    // == Strong Comparison ==
    /// Checks an `If-Match` header value against this tag.
    ///
    /// A weak tag never matches under strong comparison, so only `*` succeeds.
    pub fn strong_matches(&self, if_match: &str) -> bool {
        candidates(if_match).any(|candidate| candidate == "*")
    }
}

/// Splits an entity-tag list header into its trimmed, non-empty members.
fn candidates(header: &str) -> impl Iterator<Item = &str> {
    header
        .split(',')
        .map(str::trim)
        .filter(|candidate| !candidate.is_empty())
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
