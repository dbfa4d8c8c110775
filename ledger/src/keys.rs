//! Storage-key construction.
//!
//! The store is a flat byte-key namespace, so every record kind gets its key
//! built here and nowhere else. Kind prefixes keep records that share an
//! address (deposits, verification hashes) from colliding; holding records
//! are keyed by a digest of the tier label and buyer address.

use crate::types::Address;
use sha2::{Digest, Sha256};
use turnstile_core::StorageKey;
use uuid::Uuid;

/// Sentinel key of the tier list record.
pub const TIER_LIST_KEY: &str = "allTickets";

/// Sentinel key of the owner-income counter.
pub const OWNER_INCOME_KEY: &str = "ownerIncome";

const DEPOSIT_PREFIX: &str = "deposit";
const PROOF_PREFIX: &str = "proof";
const TRANSFER_PREFIX: &str = "transfer";

/// Key of the tier list.
#[must_use]
pub fn tier_list() -> StorageKey {
    StorageKey::from_static(TIER_LIST_KEY)
}

/// Key of the owner-income counter.
#[must_use]
pub fn owner_income() -> StorageKey {
    StorageKey::from_static(OWNER_INCOME_KEY)
}

/// Key of the event record, keyed by the owner identity.
#[must_use]
pub fn event(owner: &Address) -> StorageKey {
    StorageKey::from_bytes(owner.as_bytes().to_vec())
}

/// Key of a (tier, buyer) holding record: `sha256(label || buyer)`.
///
/// The buyer address is fixed-length, so the concatenation is unambiguous.
#[must_use]
pub fn holding(tier_label: &str, buyer: &Address) -> StorageKey {
    let mut hasher = Sha256::new();
    hasher.update(tier_label.as_bytes());
    hasher.update(buyer.as_bytes());
    StorageKey::from_bytes(hasher.finalize().to_vec())
}

/// Key of a sender's accumulated plain-deposit total.
#[must_use]
pub fn deposit(sender: &Address) -> StorageKey {
    StorageKey::join(DEPOSIT_PREFIX, sender.as_bytes())
}

/// Key of a buyer's identity-verification record.
#[must_use]
pub fn verification(buyer: &Address) -> StorageKey {
    StorageKey::join(PROOF_PREFIX, buyer.as_bytes())
}

/// Key of a processed-transfer receipt, keyed by the transfer id.
#[must_use]
pub fn transfer_receipt(transfer_id: &Uuid) -> StorageKey {
    StorageKey::join(TRANSFER_PREFIX, transfer_id.as_bytes())
}
