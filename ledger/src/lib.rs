//! Turnstile - an event-ticketing ledger over a key-value store.
//!
//! An owner deploys an event, defines ticket tiers with a price and supply
//! cap, and buyers purchase tickets by paying a fungible token. The ledger
//! tracks per-buyer holdings, enforces supply limits, and lets a buyer redeem
//! a ticket exactly once.
//!
//! Purchases are not direct calls: value moves first, through the external
//! token contract, which then notifies the ledger. The purchase engine reacts
//! to that notification.
//!
//! # Architecture
//!
//! ```text
//!                     ┌────────────────┐
//!   token contract ──▶│ TransferNotice │──▶ Purchase Engine ──┐
//!                     └────────────────┘    (timing, price,   │
//!                                            supply checks)   │
//!   owner commands ──▶ Inventory Ledger ◀────────────────────┘
//!   (deploy, tiers)         │                     │
//!                           ▼                     ▼
//!                      tier list           holdings, income,
//!                     (one record)        verification records
//!                           │                     │
//!                           └────── KvStore ──────┘
//!                              (Get/Put/Delete)
//! ```
//!
//! The store offers no multi-key transactions; the ledger serializes every
//! read-modify-write on the tier list behind one lock and holding updates
//! behind per-key locks, and retries transient storage failures with bounded
//! backoff.
//!
//! # Key Behaviors
//!
//! - Sales open strictly *after* the recorded event start time.
//! - A repeat purchase accumulates quantity and resets the `used` flag,
//!   re-arming a previously redeemed holding.
//! - Transfer notifications carry an idempotency key; redelivery returns the
//!   recorded receipt instead of crediting twice.
//! - Withdrawals trust the token contract's balance enforcement; the ledger
//!   performs no entitlement check of its own.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod command;
pub mod config;
pub mod environment;
pub mod error;
pub mod holdings;
pub mod identity;
pub mod inventory;
pub mod keys;
pub mod ledger;
pub mod metrics;
pub mod purchase;
pub mod retry;
pub mod token;
pub mod types;
pub mod withdraw;

#[cfg(test)]
pub(crate) mod test_support;

pub use command::{Command, Reply};
pub use config::LedgerConfig;
pub use environment::{LedgerEnvironment, OwnerAuthority, SingleOwner};
pub use error::LedgerError;
pub use ledger::Ledger;
pub use purchase::{PurchaseOutcome, PurchaseReceipt};
pub use token::{
    MockToken, TokenContract, TokenError, TransferNotice, TransferPurpose, WireValue,
};
pub use types::{
    Address, EventRecord, Holding, ProofHash, TicketsInfo, TierId, TierList, TierRecord,
    TierStatus, TokenAmount,
};
