//! Event and inventory ledger: deploy, tier management, availability queries.

use crate::error::LedgerError;
use crate::keys;
use crate::ledger::Ledger;
use crate::metrics;
use crate::types::{
    Address, EventRecord, TicketsInfo, TierId, TierList, TierRecord, TierStatus, TokenAmount,
};
use chrono::{DateTime, Utc};

impl Ledger {
    /// Deploys the event: records its name, start time, and announced slots.
    ///
    /// The event record is immutable once written; a second deploy fails and
    /// mutates nothing.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` unless `caller` holds the owner capability
    /// - `Validation` if an event record already exists
    /// - `Storage`/`Codec` on persistence failure
    pub async fn deploy(
        &self,
        caller: &Address,
        name: &str,
        start_time: DateTime<Utc>,
        total_slots: u32,
    ) -> Result<(), LedgerError> {
        if !self.env.authority.is_authorized(caller) {
            tracing::warn!(%caller, "deploy rejected: caller is not the owner");
            return Err(LedgerError::Unauthorized);
        }

        let key = keys::event(&self.env.config.owner);
        let _guard = self.tier_lock.lock().await;
        if self.env.store.get(key.clone()).await?.is_some() {
            tracing::warn!("deploy rejected: event record already exists");
            return Err(LedgerError::Validation(
                "an event record already exists".to_string(),
            ));
        }

        let record = EventRecord {
            name: name.to_string(),
            start_time,
            total_ticket_slots: total_slots,
        };
        self.write_record(key, &record).await?;

        tracing::info!(event = name, %start_time, total_slots, "event deployed");
        metrics::record_event_deployed();
        Ok(())
    }

    /// Appends a ticket tier with the given price and supply cap.
    ///
    /// The new tier starts with nothing sold and its id is its position in
    /// the tier list. Duplicate labels are permitted and create a second,
    /// independent tier entry.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` unless `caller` holds the owner capability
    /// - `Storage`/`Codec` on persistence failure
    pub async fn add_tier(
        &self,
        caller: &Address,
        label: &str,
        unit_price: TokenAmount,
        total_supply: u32,
    ) -> Result<TierId, LedgerError> {
        if !self.env.authority.is_authorized(caller) {
            tracing::warn!(%caller, label, "add_tier rejected: caller is not the owner");
            return Err(LedgerError::Unauthorized);
        }

        let _guard = self.tier_lock.lock().await;
        let mut tiers: TierList = self
            .read_record(keys::tier_list())
            .await?
            .unwrap_or_default();
        let id = tiers.push(TierRecord::new(label.to_string(), unit_price, total_supply));
        self.write_record(keys::tier_list(), &tiers).await?;

        tracing::info!(%id, label, %unit_price, total_supply, "tier added");
        metrics::record_tier_added();
        Ok(id)
    }

    /// Tickets still available in `tier`.
    ///
    /// # Errors
    ///
    /// `NotFound` if no tier list exists or `tier` is out of range.
    pub async fn remaining_tickets(&self, tier: TierId) -> Result<u32, LedgerError> {
        let tiers = self.read_tier_list().await?;
        let record = tiers.get(tier).ok_or(LedgerError::NotFound)?;
        tracing::debug!(%tier, remaining = record.remaining(), "remaining tickets queried");
        Ok(record.remaining())
    }

    /// Availability snapshot of every tier, in tier-id order.
    ///
    /// # Errors
    ///
    /// `NotFound` if no tier list exists.
    pub async fn all_tickets(&self) -> Result<Vec<TierStatus>, LedgerError> {
        let tiers = self.read_tier_list().await?;
        Ok(tiers.iter().map(TierStatus::from).collect())
    }

    /// All-tiers snapshot as parallel sequences.
    ///
    /// # Errors
    ///
    /// `NotFound` if no tier list exists.
    pub async fn tickets_info(&self) -> Result<TicketsInfo, LedgerError> {
        let tiers = self.read_tier_list().await?;
        Ok(TicketsInfo::from(&tiers))
    }

    /// The cumulative token income collected from purchases.
    ///
    /// Zero until the first purchase lands.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` unless `caller` holds the owner capability
    /// - `Storage`/`Codec` on read failure
    pub async fn owner_income(&self, caller: &Address) -> Result<TokenAmount, LedgerError> {
        if !self.env.authority.is_authorized(caller) {
            return Err(LedgerError::Unauthorized);
        }
        Ok(self
            .read_record(keys::owner_income())
            .await?
            .unwrap_or_default())
    }

    /// The recorded event, or `NotFound` before deploy.
    pub(crate) async fn read_event(&self) -> Result<EventRecord, LedgerError> {
        self.read_record(keys::event(&self.env.config.owner))
            .await?
            .ok_or(LedgerError::NotFound)
    }
}
