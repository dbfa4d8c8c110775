//! The ledger handle: shared state, lock discipline, typed storage access.
//!
//! The store offers single-key atomicity only, so the ledger brings its own
//! serialization:
//!
//! - one async mutex guards every read-modify-write of the tier-list record
//!   (tier append, purchase apply);
//! - a keyed lock table serializes writers of the same holding or deposit
//!   record; distinct buyers never contend.
//!
//! Lock order is always tier-list lock before any keyed lock, and no path
//! holds two keyed locks at once.

use crate::environment::LedgerEnvironment;
use crate::error::LedgerError;
use crate::keys;
use crate::retry::put_with_retry;
use crate::types::TierList;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Mutex as StdMutex, PoisonError};
use std::sync::Arc;
use tokio::sync::Mutex;
use turnstile_core::{StorageKey, codec};

/// Lazily created per-key async mutexes.
///
/// A lock cell is created on first use and kept for the ledger's lifetime;
/// the set of contended keys (holdings, deposits) is bounded by the set of
/// active buyers.
#[derive(Default)]
pub(crate) struct KeyLocks {
    cells: StdMutex<HashMap<Vec<u8>, Arc<Mutex<()>>>>,
}

impl KeyLocks {
    /// The lock cell for `key`, creating it if absent.
    pub(crate) fn cell(&self, key: &StorageKey) -> Arc<Mutex<()>> {
        let mut cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        cells
            .entry(key.as_bytes().to_vec())
            .or_default()
            .clone()
    }
}

/// The event-ticketing ledger.
///
/// One value owns the event record, the tier list, buyer holdings, identity
/// verification records, and the owner-income counter, all persisted through
/// the environment's store. Operations are grouped by module:
/// inventory, purchase, holdings, identity, withdraw, command.
pub struct Ledger {
    pub(crate) env: LedgerEnvironment,
    pub(crate) tier_lock: Mutex<()>,
    pub(crate) key_locks: KeyLocks,
}

impl Ledger {
    /// Creates a ledger over the given environment.
    #[must_use]
    pub fn new(env: LedgerEnvironment) -> Self {
        Self {
            env,
            tier_lock: Mutex::new(()),
            key_locks: KeyLocks::default(),
        }
    }

    /// The environment this ledger runs against.
    #[must_use]
    pub const fn environment(&self) -> &LedgerEnvironment {
        &self.env
    }

    /// Read and decode the record under `key`, if any.
    pub(crate) async fn read_record<T: DeserializeOwned>(
        &self,
        key: StorageKey,
    ) -> Result<Option<T>, LedgerError> {
        match self.env.store.get(key).await? {
            Some(bytes) => Ok(Some(codec::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Encode and persist `record` under `key`, retrying transient failures.
    pub(crate) async fn write_record<T: Serialize>(
        &self,
        key: StorageKey,
        record: &T,
    ) -> Result<(), LedgerError> {
        let bytes = codec::encode(record)?;
        put_with_retry(
            self.env.store.as_ref(),
            &self.env.config.store_retry,
            key,
            bytes,
        )
        .await
        .map_err(LedgerError::from)
    }

    /// The tier list, or `NotFound` if none has been created yet.
    pub(crate) async fn read_tier_list(&self) -> Result<TierList, LedgerError> {
        self.read_record(keys::tier_list())
            .await?
            .ok_or(LedgerError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_locks_hand_out_one_cell_per_key() {
        let locks = KeyLocks::default();
        let a1 = locks.cell(&StorageKey::from_static("a"));
        let a2 = locks.cell(&StorageKey::from_static("a"));
        let b = locks.cell(&StorageKey::from_static("b"));
        assert!(Arc::ptr_eq(&a1, &a2));
        assert!(!Arc::ptr_eq(&a1, &b));
    }
}
