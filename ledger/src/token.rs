//! Token-contract collaborator interface.
//!
//! The ledger never moves value itself. It consumes transfer notifications
//! the token contract emits after tokens land in the ledger's custody, and
//! it calls back into the token contract for withdrawals.
//!
//! The wire-side notification carries loosely typed trailing arguments; the
//! [`TransferNotice::from_wire`] boundary turns them into a discriminated
//! [`TransferPurpose`] so malformed shapes are rejected before any business
//! logic runs.

use crate::error::LedgerError;
use crate::types::{Address, ProofHash, TierId, TokenAmount};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use uuid::Uuid;

/// Errors from token-contract calls.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The token contract refused the transfer (balance, policy, or state).
    #[error("transfer rejected: {0}")]
    Rejected(String),

    /// The token contract could not be reached.
    #[error("token contract unreachable: {0}")]
    Unreachable(String),
}

/// Token contract abstraction.
///
/// The contract enforces balances itself; the ledger only requests transfers
/// from its own custodial balance and trusts the contract's verdict.
pub trait TokenContract: Send + Sync {
    /// Move `amount` smallest units from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns a [`TokenError`] if the contract rejects or cannot complete
    /// the transfer.
    fn transfer(
        &self,
        from: Address,
        to: Address,
        amount: TokenAmount,
    ) -> Pin<Box<dyn Future<Output = Result<(), TokenError>> + Send + '_>>;
}

// ============================================================================
// Transfer Notifications
// ============================================================================

/// Purpose attached to an inbound transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransferPurpose {
    /// No purchase intent: a generic deposit into the ledger's custody.
    Plain,
    /// A ticket purchase for `quantity` tickets of `tier`.
    BuyTickets {
        /// Tier being purchased.
        tier: TierId,
        /// Number of tickets requested.
        quantity: u32,
        /// Buyer-supplied proof hash, stored for later identity verification.
        proof: ProofHash,
    },
}

/// A confirmed inbound token transfer, as notified by the token contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferNotice {
    /// Unique id of the underlying transfer; the idempotency key.
    pub transfer_id: Uuid,
    /// Identity of the contract that emitted the notification.
    pub token_contract: Address,
    /// Account the tokens came from.
    pub from: Address,
    /// Account the tokens went to.
    pub to: Address,
    /// Transferred amount in smallest units.
    pub amount: TokenAmount,
    /// What the sender attached the transfer for.
    pub purpose: TransferPurpose,
}

/// A loosely typed trailing argument on a wire-side transfer notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WireValue {
    /// UTF-8 text argument.
    Text(String),
    /// Unsigned integer argument.
    Uint(u64),
    /// Raw byte-string argument.
    Blob(Vec<u8>),
}

/// Tag that marks a transfer as a ticket purchase.
pub const BUY_TICKETS_TAG: &str = "buyTickets";

impl TransferNotice {
    /// Validates a wire-side notification into a typed notice.
    ///
    /// Addresses must be exactly the wire length. A `buyTickets` tag demands
    /// exactly four trailing arguments (the tag, a tier id, a quantity, and a
    /// proof hash); any other trailing shape is treated as a plain deposit,
    /// matching the token contract's free-form attachment convention.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` for malformed addresses or a
    /// malformed `buyTickets` argument shape.
    pub fn from_wire(
        transfer_id: Uuid,
        token_contract: &[u8],
        from: &[u8],
        to: &[u8],
        amount: u64,
        extra: &[WireValue],
    ) -> Result<Self, LedgerError> {
        let token_contract = Address::from_slice(token_contract)?;
        let from = Address::from_slice(from)?;
        let to = Address::from_slice(to)?;

        let purpose = match extra.first() {
            Some(WireValue::Text(tag)) if tag == BUY_TICKETS_TAG => {
                Self::parse_buy_tickets(extra)?
            }
            _ => TransferPurpose::Plain,
        };

        Ok(Self {
            transfer_id,
            token_contract,
            from,
            to,
            amount: TokenAmount::from_raw(amount),
            purpose,
        })
    }

    fn parse_buy_tickets(extra: &[WireValue]) -> Result<TransferPurpose, LedgerError> {
        let [_, tier, quantity, proof] = extra else {
            return Err(LedgerError::Validation(format!(
                "buyTickets expects 4 arguments, got {}",
                extra.len()
            )));
        };
        let WireValue::Uint(tier) = tier else {
            return Err(LedgerError::Validation(
                "buyTickets tier id must be an integer".to_string(),
            ));
        };
        let tier = u32::try_from(*tier)
            .map_err(|_| LedgerError::Validation(format!("tier id {tier} out of range")))?;
        let WireValue::Uint(quantity) = quantity else {
            return Err(LedgerError::Validation(
                "buyTickets quantity must be an integer".to_string(),
            ));
        };
        let quantity = u32::try_from(*quantity)
            .map_err(|_| LedgerError::Validation(format!("quantity {quantity} out of range")))?;
        let WireValue::Blob(proof) = proof else {
            return Err(LedgerError::Validation(
                "buyTickets proof must be a byte string".to_string(),
            ));
        };

        Ok(TransferPurpose::BuyTickets {
            tier: TierId::new(tier),
            quantity,
            proof: ProofHash::from_slice(proof)?,
        })
    }
}

// ============================================================================
// Mock Implementation
// ============================================================================

/// A transfer the mock token contract performed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferRecord {
    /// Source account.
    pub from: Address,
    /// Destination account.
    pub to: Address,
    /// Transferred amount in smallest units.
    pub amount: TokenAmount,
}

/// Mock token contract for development and testing.
///
/// Records every requested transfer; succeeds unless constructed with
/// [`MockToken::rejecting`].
#[derive(Debug, Default)]
pub struct MockToken {
    transfers: Mutex<Vec<TransferRecord>>,
    reject_with: Option<String>,
}

impl MockToken {
    /// Creates a mock that accepts every transfer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock that rejects every transfer with `reason`.
    #[must_use]
    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self {
            transfers: Mutex::new(Vec::new()),
            reject_with: Some(reason.into()),
        }
    }

    /// Transfers performed so far, in call order.
    #[must_use]
    pub fn transfers(&self) -> Vec<TransferRecord> {
        self.transfers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TokenContract for MockToken {
    fn transfer(
        &self,
        from: Address,
        to: Address,
        amount: TokenAmount,
    ) -> Pin<Box<dyn Future<Output = Result<(), TokenError>> + Send + '_>> {
        Box::pin(async move {
            if let Some(reason) = &self.reject_with {
                tracing::warn!(%from, %to, %amount, reason = %reason, "mock token rejecting transfer");
                return Err(TokenError::Rejected(reason.clone()));
            }
            self.transfers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(TransferRecord { from, to, amount });
            tracing::info!(%from, %to, %amount, "mock token transfer");
            Ok(())
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{ADDRESS_LEN, PROOF_LEN};

    fn addr(fill: u8) -> Vec<u8> {
        vec![fill; ADDRESS_LEN]
    }

    fn buy_args(tier: u64, quantity: u64) -> Vec<WireValue> {
        vec![
            WireValue::Text(BUY_TICKETS_TAG.to_string()),
            WireValue::Uint(tier),
            WireValue::Uint(quantity),
            WireValue::Blob(vec![7; PROOF_LEN]),
        ]
    }

    #[test]
    fn from_wire_parses_buy_tickets() {
        let notice = TransferNotice::from_wire(
            Uuid::new_v4(),
            &addr(1),
            &addr(2),
            &addr(3),
            150,
            &buy_args(0, 3),
        )
        .unwrap();

        assert_eq!(notice.amount, TokenAmount::from_raw(150));
        assert_eq!(
            notice.purpose,
            TransferPurpose::BuyTickets {
                tier: TierId::new(0),
                quantity: 3,
                proof: ProofHash::from_array([7; PROOF_LEN]),
            }
        );
    }

    #[test]
    fn from_wire_rejects_short_buy_args() {
        let mut args = buy_args(0, 3);
        args.pop();
        let result =
            TransferNotice::from_wire(Uuid::new_v4(), &addr(1), &addr(2), &addr(3), 150, &args);
        assert!(matches!(result, Err(LedgerError::Validation(_))));
    }

    #[test]
    fn from_wire_rejects_malformed_address() {
        let result = TransferNotice::from_wire(
            Uuid::new_v4(),
            &addr(1),
            &[0u8; 19],
            &addr(3),
            150,
            &[],
        );
        assert!(matches!(result, Err(LedgerError::Validation(_))));
    }

    #[test]
    fn from_wire_treats_other_tags_as_plain_deposit() {
        let notice = TransferNotice::from_wire(
            Uuid::new_v4(),
            &addr(1),
            &addr(2),
            &addr(3),
            99,
            &[WireValue::Text("staking".to_string())],
        )
        .unwrap();
        assert_eq!(notice.purpose, TransferPurpose::Plain);
    }

    #[test]
    fn from_wire_rejects_wrong_proof_length() {
        let mut args = buy_args(0, 3);
        args[3] = WireValue::Blob(vec![7; 16]);
        let result =
            TransferNotice::from_wire(Uuid::new_v4(), &addr(1), &addr(2), &addr(3), 150, &args);
        assert!(matches!(result, Err(LedgerError::Validation(_))));
    }

    #[tokio::test]
    async fn mock_token_records_transfers() {
        let token = MockToken::new();
        let from = Address::from_array([1; ADDRESS_LEN]);
        let to = Address::from_array([2; ADDRESS_LEN]);

        token
            .transfer(from, to, TokenAmount::from_raw(500))
            .await
            .unwrap();

        assert_eq!(
            token.transfers(),
            vec![TransferRecord {
                from,
                to,
                amount: TokenAmount::from_raw(500),
            }]
        );
    }

    #[tokio::test]
    async fn rejecting_mock_fails_transfers() {
        let token = MockToken::rejecting("frozen");
        let result = token
            .transfer(
                Address::from_array([1; ADDRESS_LEN]),
                Address::from_array([2; ADDRESS_LEN]),
                TokenAmount::from_raw(1),
            )
            .await;
        assert_eq!(result, Err(TokenError::Rejected("frozen".to_string())));
        assert!(token.transfers().is_empty());
    }
}
