//! Purchase engine: the inbound token-transfer state machine.
//!
//! The sole mutating entry point for buyers is a transfer notification from
//! the token contract — value moves first, side effects follow. Per
//! (tier, buyer) pair the holding state only moves forward:
//!
//! ```text
//! NoHolding → Holding{used: false} → Holding{used: true}
//! ```
//!
//! with one deliberate exception: a repeat purchase resets `used` to `false`
//! (see [`Ledger::on_token_transfer`]).
//!
//! The tier-list lock is held across the whole validate-and-apply sequence,
//! so concurrent purchases cannot lose updates to the `sold` counter. The
//! multi-key persist that follows is not transactional; a mid-sequence
//! failure is logged and surfaced, never silently dropped.

use crate::error::LedgerError;
use crate::keys;
use crate::ledger::Ledger;
use crate::metrics;
use crate::token::{TransferNotice, TransferPurpose};
use crate::types::{Holding, ProofHash, TierId, TokenAmount};
use serde::{Deserialize, Serialize};

/// Receipt persisted for each processed purchase transfer, keyed by the
/// transfer id. Redelivered notifications return the receipt instead of
/// crediting again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseReceipt {
    /// Tier that was purchased.
    pub tier: TierId,
    /// Tickets credited.
    pub quantity: u32,
    /// Income recorded, in smallest units (the required price, not the
    /// possibly larger transferred amount).
    pub charged: TokenAmount,
}

/// Outcome of handling a transfer notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PurchaseOutcome {
    /// Owner balance top-up; accepted with no side effects.
    TopUp,
    /// Plain deposit credited to the sender's running total.
    Deposited {
        /// The sender's accumulated deposit total after this transfer.
        total: TokenAmount,
    },
    /// Tickets were purchased and credited.
    Purchased(PurchaseReceipt),
    /// The transfer id was already processed; nothing was re-applied.
    AlreadyProcessed(PurchaseReceipt),
}

impl Ledger {
    /// Handles a confirmed inbound token transfer.
    ///
    /// Rejects notices that do not originate from the configured token
    /// contract or do not name this ledger as recipient. Owner transfers are
    /// balance top-ups. Transfers without purchase intent accumulate into the
    /// sender's deposit total. `buyTickets` transfers run the purchase state
    /// machine: timing gate, price check, supply check, then apply.
    ///
    /// A repeat purchase for a (tier, buyer) pair accumulates quantity and
    /// resets `used` to `false`, re-arming a previously redeemed holding.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if the notice does not come from the token contract
    /// - `Validation` for a foreign recipient or a closed sales window
    /// - `NotFound` if the event, tier list, or tier is absent
    /// - `InsufficientPayment` / `SupplyExhausted` per the purchase checks
    /// - `Storage`/`Codec` on persistence failure (earlier writes in the
    ///   sequence are not rolled back)
    pub async fn on_token_transfer(
        &self,
        notice: &TransferNotice,
    ) -> Result<PurchaseOutcome, LedgerError> {
        if notice.token_contract != self.env.config.token_contract {
            tracing::warn!(
                origin = %notice.token_contract,
                "transfer notice rejected: unknown token contract"
            );
            metrics::record_transfer("rejected");
            return Err(LedgerError::Unauthorized);
        }
        if notice.to != self.env.config.ledger_address {
            tracing::warn!(recipient = %notice.to, "transfer notice rejected: foreign recipient");
            metrics::record_transfer("rejected");
            return Err(LedgerError::Validation(
                "transfer recipient is not this ledger".to_string(),
            ));
        }

        if notice.from == self.env.config.owner {
            tracing::info!(amount = %notice.amount, "owner balance top-up accepted");
            metrics::record_transfer("top_up");
            return Ok(PurchaseOutcome::TopUp);
        }

        match notice.purpose {
            TransferPurpose::Plain => self.accept_deposit(notice).await,
            TransferPurpose::BuyTickets {
                tier,
                quantity,
                proof,
            } => self.apply_purchase(notice, tier, quantity, proof).await,
        }
    }

    /// Accumulates a plain transfer into the sender's deposit total.
    async fn accept_deposit(
        &self,
        notice: &TransferNotice,
    ) -> Result<PurchaseOutcome, LedgerError> {
        let key = keys::deposit(&notice.from);
        let cell = self.key_locks.cell(&key);
        let _guard = cell.lock().await;

        let total: TokenAmount = self.read_record(key.clone()).await?.unwrap_or_default();
        let total = total
            .checked_add(notice.amount)
            .ok_or_else(|| LedgerError::Validation("deposit total overflow".to_string()))?;
        self.write_record(key, &total).await?;

        tracing::info!(sender = %notice.from, amount = %notice.amount, %total, "deposit accepted");
        metrics::record_transfer("deposit");
        metrics::record_deposit(notice.amount.raw());
        Ok(PurchaseOutcome::Deposited { total })
    }

    /// Validates and applies a ticket purchase.
    async fn apply_purchase(
        &self,
        notice: &TransferNotice,
        tier_id: TierId,
        quantity: u32,
        proof: ProofHash,
    ) -> Result<PurchaseOutcome, LedgerError> {
        let receipt_key = keys::transfer_receipt(&notice.transfer_id);
        let _tier_guard = self.tier_lock.lock().await;

        if let Some(receipt) = self
            .read_record::<PurchaseReceipt>(receipt_key.clone())
            .await?
        {
            tracing::info!(
                transfer = %notice.transfer_id,
                "transfer already processed; returning recorded receipt"
            );
            metrics::record_transfer("duplicate");
            return Ok(PurchaseOutcome::AlreadyProcessed(receipt));
        }

        // Sales open strictly after the recorded event start.
        let event = self.read_event().await?;
        let now = self.env.clock.now();
        if now <= event.start_time {
            tracing::warn!(
                %now,
                start = %event.start_time,
                "purchase rejected: sales are not open"
            );
            metrics::record_transfer("rejected");
            return Err(LedgerError::Validation("sales are not open yet".to_string()));
        }

        let mut tiers = self.read_tier_list().await?;
        let tier = tiers.get(tier_id).ok_or(LedgerError::NotFound)?;
        let required = tier
            .unit_price
            .checked_mul(quantity)
            .ok_or_else(|| LedgerError::Validation("price computation overflow".to_string()))?;

        if notice.amount < required {
            tracing::warn!(
                buyer = %notice.from,
                %tier_id,
                %required,
                offered = %notice.amount,
                "purchase rejected: payment too low"
            );
            metrics::record_transfer("rejected");
            return Err(LedgerError::InsufficientPayment {
                required,
                offered: notice.amount,
            });
        }

        let label = tier.label.clone();
        tiers
            .get_mut(tier_id)
            .ok_or(LedgerError::NotFound)?
            .record_sale(quantity)
            .inspect_err(|_| {
                tracing::warn!(buyer = %notice.from, %tier_id, quantity, "purchase rejected: supply exhausted");
                metrics::record_transfer("rejected");
            })?;

        let income: TokenAmount = self
            .read_record(keys::owner_income())
            .await?
            .unwrap_or_default();
        let income = income
            .checked_add(required)
            .ok_or_else(|| LedgerError::Validation("owner income overflow".to_string()))?;

        let holding_key = keys::holding(&label, &notice.from);
        let cell = self.key_locks.cell(&holding_key);
        let _holding_guard = cell.lock().await;
        let holding = match self.read_record::<Holding>(holding_key.clone()).await? {
            // A repeat purchase re-arms the holding: `used` resets to false.
            Some(prev) => Holding {
                quantity: prev.quantity.saturating_add(quantity),
                used: false,
            },
            None => Holding::new(quantity),
        };

        let receipt = PurchaseReceipt {
            tier: tier_id,
            quantity,
            charged: required,
        };

        let persist = async {
            self.write_record(keys::verification(&notice.from), &proof)
                .await?;
            self.write_record(keys::owner_income(), &income).await?;
            self.write_record(holding_key.clone(), &holding).await?;
            self.write_record(keys::tier_list(), &tiers).await?;
            self.write_record(receipt_key, &receipt).await?;
            Ok::<(), LedgerError>(())
        };
        if let Err(err) = persist.await {
            tracing::error!(
                error = %err,
                transfer = %notice.transfer_id,
                buyer = %notice.from,
                "purchase persistence failed part-way; earlier writes are not rolled back"
            );
            metrics::record_transfer("persist_failed");
            return Err(err);
        }

        tracing::info!(
            buyer = %notice.from,
            %tier_id,
            tier = %label,
            quantity,
            charged = %required,
            holding_quantity = holding.quantity,
            "purchase applied"
        );
        metrics::record_transfer("purchased");
        metrics::record_tickets_sold(quantity);
        metrics::record_revenue(required.raw());
        Ok(PurchaseOutcome::Purchased(receipt))
    }
}
