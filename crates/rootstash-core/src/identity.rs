//! Content-based snapshot identities.
//!
//! An identity is the short revision of the checkout, suffixed with
//! `+<digest>` when the working tree carries uncommitted changes. The digest
//! is the first [`DIGEST_LEN`] hex characters of the SHA-1 of the diff, so
//! the same revision with the same diff always maps to the same snapshot.

use std::fmt;

use sha1::{Digest, Sha1};
use tracing::debug;

use crate::error::Result;
use crate::vcs::Vcs;

/// Hex characters of the diff digest kept in an identity.
pub const DIGEST_LEN: usize = 10;

/// Name of a snapshot directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(String);

impl Identity {
    /// Identity of a clean checkout.
    pub fn clean(revision: impl Into<String>) -> Self {
        Self(revision.into())
    }

    /// Identity of a checkout with the given uncommitted diff.
    pub fn dirty(revision: &str, diff: &[u8]) -> Self {
        Self(format!("{}+{}", revision, diff_digest(diff)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the identity carries a diff digest.
    pub fn is_dirty(&self) -> bool {
        self.0.contains('+')
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Short digest of a diff, as used in dirty identities.
pub fn diff_digest(diff: &[u8]) -> String {
    let mut digest = hex::encode(Sha1::digest(diff));
    digest.truncate(DIGEST_LEN);
    digest
}

/// An identity plus the diff it was derived from, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub identity: Identity,
    pub diff: Option<Vec<u8>>,
}

/// Derives the identity of the checkout behind `vcs`.
///
/// A diff that is only whitespace counts as clean.
pub fn resolve_identity(vcs: &dyn Vcs) -> Result<ResolvedIdentity> {
    let revision = vcs.short_revision()?;
    let diff = vcs.diff()?;

    let resolved = if String::from_utf8_lossy(&diff).chars().all(char::is_whitespace) {
        ResolvedIdentity {
            identity: Identity::clean(revision),
            diff: None,
        }
    } else {
        ResolvedIdentity {
            identity: Identity::dirty(&revision, &diff),
            diff: Some(diff),
        }
    };

    debug!(identity = %resolved.identity, "Resolved checkout identity");
    Ok(resolved)
}
