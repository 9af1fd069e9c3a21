//! Freshness-domain tracking (mark-and-sweep staleness).
//!
//! Each full sweep against the scheduler store is tagged with a domain
//! token. Records written during the sweep carry the domain name; at the end
//! of a successful sweep the token is bumped (committed) so the store can
//! treat anything an earlier, incomplete sweep left behind as stale and
//! expire it itself. The reconciler never deletes unseen-but-unconfirmed
//! records directly.

/// The token threaded through one sweep's corrective calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainToken {
    name: String,
    epoch: u64,
}

impl DomainToken {
    /// The domain name records are marked with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The sweep epoch this token belongs to.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

impl std::fmt::Display for DomainToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.name, self.epoch)
    }
}

/// Per-reconciler freshness domain state.
///
/// The epoch only advances after the downstream store acknowledged the bump,
/// so a crashed or interrupted sweep re-runs under the same token.
#[derive(Debug, Clone)]
pub struct FreshnessDomain {
    name: String,
    epoch: u64,
}

impl FreshnessDomain {
    /// Creates a domain starting at epoch 1.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            epoch: 1,
        }
    }

    /// The domain name records are marked with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The token for the sweep currently in progress.
    pub fn token(&self) -> DomainToken {
        DomainToken {
            name: self.name.clone(),
            epoch: self.epoch,
        }
    }

    /// Commits the current epoch after a successful bump.
    pub fn advance(&mut self) {
        self.epoch += 1;
    }
}
