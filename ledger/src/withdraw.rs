//! Withdrawal gateway: token transfers out of the ledger's custody.
//!
//! Amounts arrive in whole tokens and are scaled to smallest units with the
//! token contract's declared decimal scale before the transfer call.

use crate::error::LedgerError;
use crate::ledger::Ledger;
use crate::types::{Address, TokenAmount};

impl Ledger {
    /// Withdraws `whole_amount` whole tokens from the ledger's custodial
    /// balance to `destination`.
    ///
    /// No entitlement check ties the withdrawal to the caller's holdings or
    /// to recorded income; the token contract's own balance enforcement is
    /// the only backstop.
    ///
    /// # Errors
    ///
    /// - `Validation` if scaling the amount overflows
    /// - `Upstream` if the token contract rejects or fails the transfer
    pub async fn user_withdraw(
        &self,
        destination: &Address,
        whole_amount: u64,
    ) -> Result<(), LedgerError> {
        let amount = self.scale(whole_amount)?;
        self.env
            .token
            .transfer(self.env.config.ledger_address, *destination, amount)
            .await?;
        tracing::info!(%destination, %amount, "user withdrawal transferred");
        Ok(())
    }

    /// Withdraws `whole_amount` whole tokens to the owner.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` unless `caller` holds the owner capability
    /// - `Validation` if scaling the amount overflows
    /// - `Upstream` if the token contract rejects or fails the transfer
    pub async fn owner_withdraw(
        &self,
        caller: &Address,
        whole_amount: u64,
    ) -> Result<(), LedgerError> {
        if !self.env.authority.is_authorized(caller) {
            tracing::warn!(%caller, "owner withdrawal rejected: caller is not the owner");
            return Err(LedgerError::Unauthorized);
        }
        let amount = self.scale(whole_amount)?;
        let owner = self.env.config.owner;
        self.env
            .token
            .transfer(self.env.config.ledger_address, owner, amount)
            .await?;
        tracing::info!(%amount, "owner withdrawal transferred");
        Ok(())
    }

    fn scale(&self, whole_amount: u64) -> Result<TokenAmount, LedgerError> {
        TokenAmount::from_whole(whole_amount, self.env.config.token_scale).ok_or_else(|| {
            LedgerError::Validation(format!("withdrawal amount {whole_amount} overflows"))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::config::LedgerConfig;
    use crate::environment::LedgerEnvironment;
    use crate::error::LedgerError;
    use crate::ledger::Ledger;
    use crate::test_support::{buyer, harness, ledger_address, owner, token_contract};
    use crate::token::{MockToken, TransferRecord};
    use crate::types::TokenAmount;
    use std::sync::Arc;
    use turnstile_testing::{MemoryKv, test_clock};

    #[tokio::test]
    async fn user_withdraw_scales_and_transfers() {
        let h = harness();
        h.ledger.user_withdraw(&buyer(4), 2).await.unwrap();

        assert_eq!(
            h.token.transfers(),
            vec![TransferRecord {
                from: ledger_address(),
                to: buyer(4),
                amount: TokenAmount::from_raw(200_000_000),
            }]
        );
    }

    #[tokio::test]
    async fn owner_withdraw_targets_the_owner() {
        let h = harness();
        h.ledger.owner_withdraw(&owner(), 1).await.unwrap();

        assert_eq!(
            h.token.transfers(),
            vec![TransferRecord {
                from: ledger_address(),
                to: owner(),
                amount: TokenAmount::from_raw(100_000_000),
            }]
        );
    }

    #[tokio::test]
    async fn owner_withdraw_requires_the_owner_capability() {
        let h = harness();
        let result = h.ledger.owner_withdraw(&buyer(1), 1).await;
        assert!(matches!(result, Err(LedgerError::Unauthorized)));
        assert!(h.token.transfers().is_empty());
    }

    #[tokio::test]
    async fn rejected_transfer_surfaces_upstream_error() {
        let token = Arc::new(MockToken::rejecting("insufficient balance"));
        let env = LedgerEnvironment::with_single_owner(
            MemoryKv::shared(),
            token,
            Arc::new(test_clock()),
            LedgerConfig::new(owner(), ledger_address(), token_contract()),
        );
        let ledger = Ledger::new(env);

        let result = ledger.user_withdraw(&buyer(4), 1).await;
        assert!(matches!(result, Err(LedgerError::Upstream(_))));
    }

    #[tokio::test]
    async fn withdrawal_amount_overflow_is_rejected() {
        let h = harness();
        let result = h.ledger.user_withdraw(&buyer(4), u64::MAX).await;
        assert!(matches!(result, Err(LedgerError::Validation(_))));
        assert!(h.token.transfers().is_empty());
    }
}
