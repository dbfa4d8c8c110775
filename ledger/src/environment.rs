//! Environment: the ledger's injected dependencies.
//!
//! All external collaborators — storage, the token contract, time, and the
//! owner capability check — are traits injected through one environment
//! value, so production and test wiring differ only in construction.

use crate::config::LedgerConfig;
use crate::token::TokenContract;
use crate::types::Address;
use std::sync::Arc;
use turnstile_core::{Clock, KvStore};

/// Capability check: is this identity the authorized event owner?
///
/// Reduces the underlying account/signature machinery to the one question the
/// ledger needs answered.
pub trait OwnerAuthority: Send + Sync {
    /// Whether `caller` holds the owner capability.
    fn is_authorized(&self, caller: &Address) -> bool;
}

/// The standard authority: a single fixed owner address.
#[derive(Debug, Clone, Copy)]
pub struct SingleOwner {
    owner: Address,
}

impl SingleOwner {
    /// Creates an authority accepting exactly `owner`.
    #[must_use]
    pub const fn new(owner: Address) -> Self {
        Self { owner }
    }
}

impl OwnerAuthority for SingleOwner {
    fn is_authorized(&self, caller: &Address) -> bool {
        *caller == self.owner
    }
}

/// Environment dependencies for the ledger.
#[derive(Clone)]
pub struct LedgerEnvironment {
    /// Key-value storage backend.
    pub store: Arc<dyn KvStore>,
    /// Token contract for withdrawals.
    pub token: Arc<dyn TokenContract>,
    /// Time source for the purchase timing gate.
    pub clock: Arc<dyn Clock>,
    /// Owner capability check.
    pub authority: Arc<dyn OwnerAuthority>,
    /// Static configuration.
    pub config: LedgerConfig,
}

impl LedgerEnvironment {
    /// Creates a new environment.
    #[must_use]
    pub fn new(
        store: Arc<dyn KvStore>,
        token: Arc<dyn TokenContract>,
        clock: Arc<dyn Clock>,
        authority: Arc<dyn OwnerAuthority>,
        config: LedgerConfig,
    ) -> Self {
        Self {
            store,
            token,
            clock,
            authority,
            config,
        }
    }

    /// Creates an environment whose authority is the configured owner
    /// address.
    #[must_use]
    pub fn with_single_owner(
        store: Arc<dyn KvStore>,
        token: Arc<dyn TokenContract>,
        clock: Arc<dyn Clock>,
        config: LedgerConfig,
    ) -> Self {
        let authority = Arc::new(SingleOwner::new(config.owner));
        Self::new(store, token, clock, authority, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ADDRESS_LEN;

    #[test]
    fn single_owner_accepts_only_the_owner() {
        let owner = Address::from_array([5; ADDRESS_LEN]);
        let other = Address::from_array([6; ADDRESS_LEN]);
        let authority = SingleOwner::new(owner);
        assert!(authority.is_authorized(&owner));
        assert!(!authority.is_authorized(&other));
    }
}
