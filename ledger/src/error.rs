//! Error taxonomy for ledger operations.
//!
//! Every operation returns a typed error internally; the command dispatch
//! boundary collapses errors to the caller-visible boolean/absent form after
//! logging them. No operation retries automatically except the bounded
//! storage-write retry, and there is no rollback of writes already applied.

use crate::token::TokenError;
use crate::types::{TokenAmount, TierId};
use thiserror::Error;
use turnstile_core::{CodecError, KvError};

/// Errors surfaced by ledger operations.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The caller lacks the required capability.
    #[error("caller lacks the required capability")]
    Unauthorized,

    /// An event, tier, or holding record is absent.
    #[error("record not found")]
    NotFound,

    /// A malformed argument: bad shape, bad length, or out-of-range value.
    #[error("invalid argument: {0}")]
    Validation(String),

    /// The transferred amount is below the required price.
    #[error("payment too low: required {required}, offered {offered}")]
    InsufficientPayment {
        /// Price for the requested quantity, in smallest units.
        required: TokenAmount,
        /// Amount actually transferred, in smallest units.
        offered: TokenAmount,
    },

    /// The requested quantity exceeds the tier's remaining supply.
    #[error("supply exhausted: requested {requested}, remaining {remaining}")]
    SupplyExhausted {
        /// Tickets requested.
        requested: u32,
        /// Tickets still available.
        remaining: u32,
    },

    /// The holding was already redeemed.
    #[error("ticket for tier {tier} already redeemed")]
    AlreadyRedeemed {
        /// Tier whose holding was already used.
        tier: TierId,
    },

    /// The token contract rejected or failed a transfer call.
    #[error("token contract call failed: {0}")]
    Upstream(#[from] TokenError),

    /// The storage backend failed, including after retries were exhausted.
    #[error("storage error: {0}")]
    Storage(#[from] KvError),

    /// A stored record could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}
