//! Holding and redemption ledger.

use crate::error::LedgerError;
use crate::keys;
use crate::ledger::Ledger;
use crate::metrics;
use crate::types::{Address, Holding, TierId};

impl Ledger {
    /// The buyer's holding for `tier`: accumulated quantity and redemption
    /// flag. Pure read.
    ///
    /// # Errors
    ///
    /// `NotFound` if no tier list exists, `tier` is out of range, or the
    /// buyer holds nothing in that tier.
    pub async fn my_ticket(&self, buyer: &Address, tier: TierId) -> Result<Holding, LedgerError> {
        let tiers = self.read_tier_list().await?;
        let record = tiers.get(tier).ok_or(LedgerError::NotFound)?;
        let holding: Holding = self
            .read_record(keys::holding(&record.label, buyer))
            .await?
            .ok_or(LedgerError::NotFound)?;
        tracing::debug!(%buyer, %tier, quantity = holding.quantity, used = holding.used, "holding queried");
        Ok(holding)
    }

    /// Redeems the buyer's holding for `tier`: a one-time transition.
    ///
    /// Redemption is terminal. A second call fails with `AlreadyRedeemed`
    /// forever; nothing re-arms the flag except a fresh purchase.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the tier or holding is absent, or the holding is empty
    /// - `AlreadyRedeemed` once the holding has been used
    /// - `Storage`/`Codec` on persistence failure
    pub async fn use_ticket(&self, buyer: &Address, tier: TierId) -> Result<(), LedgerError> {
        let tiers = self.read_tier_list().await?;
        let record = tiers.get(tier).ok_or(LedgerError::NotFound)?;
        let key = keys::holding(&record.label, buyer);

        let cell = self.key_locks.cell(&key);
        let _guard = cell.lock().await;

        let holding: Holding = self
            .read_record(key.clone())
            .await?
            .ok_or(LedgerError::NotFound)?;
        if holding.quantity == 0 {
            return Err(LedgerError::NotFound);
        }
        if holding.used {
            tracing::warn!(%buyer, %tier, "redemption rejected: already used");
            return Err(LedgerError::AlreadyRedeemed { tier });
        }

        let updated = Holding {
            quantity: holding.quantity,
            used: true,
        };
        self.write_record(key, &updated).await?;

        tracing::info!(%buyer, %tier, quantity = holding.quantity, "ticket redeemed");
        metrics::record_redemption();
        Ok(())
    }
}
