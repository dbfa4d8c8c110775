//! Buyer identity verification.
//!
//! A verification record is written at purchase time (last purchase wins) and
//! compared bytewise against a buyer-supplied hash. This is an out-of-band
//! flow, independent of redemption: a verified identity says nothing about
//! whether the ticket was used.

use crate::error::LedgerError;
use crate::keys;
use crate::ledger::Ledger;
use crate::types::{Address, ProofHash};

impl Ledger {
    /// Whether `claimed` matches the buyer's stored verification record.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the buyer has no verification record
    /// - `Storage`/`Codec` on read failure
    pub async fn verify_identity(
        &self,
        buyer: &Address,
        claimed: &ProofHash,
    ) -> Result<bool, LedgerError> {
        let stored: ProofHash = self
            .read_record(keys::verification(buyer))
            .await?
            .ok_or(LedgerError::NotFound)?;
        let matched = stored == *claimed;
        tracing::debug!(%buyer, matched, "identity verification");
        Ok(matched)
    }
}
