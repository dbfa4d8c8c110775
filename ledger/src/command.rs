//! Command dispatch: the caller-facing operation surface.
//!
//! Operations arrive as a discriminated [`Command`] — one variant per
//! operation, statically shaped — instead of an operation-name string with a
//! positional argument list. Dispatch keeps the caller-visible result shapes
//! simple: success booleans and absent-on-failure values. Typed errors are
//! logged here and collapse to the boolean form at this boundary only.

use crate::ledger::Ledger;
use crate::token::TransferNotice;
use crate::types::{Address, Holding, ProofHash, TicketsInfo, TierId, TokenAmount};
use chrono::{DateTime, Utc};

/// A ledger operation.
#[derive(Clone, Debug)]
pub enum Command {
    /// Record the event: name, start time, announced ticket slots.
    Deploy {
        /// Invoking identity; must hold the owner capability.
        caller: Address,
        /// Event name.
        event_name: String,
        /// Instant after which sales open.
        start_time: DateTime<Utc>,
        /// Announced total ticket slots.
        total_slots: u32,
    },
    /// Append a ticket tier.
    AddTickets {
        /// Invoking identity; must hold the owner capability.
        caller: Address,
        /// Tier label.
        label: String,
        /// Price per ticket in smallest units.
        unit_price: TokenAmount,
        /// Supply cap.
        total_supply: u32,
    },
    /// Compare a buyer's claimed hash against the stored verification record.
    VerifyTickets {
        /// Buyer whose record is checked.
        buyer: Address,
        /// Claimed hash.
        claimed: ProofHash,
    },
    /// Tickets still available in a tier.
    CheckTicketsLeft {
        /// Tier to query.
        tier: TierId,
    },
    /// A buyer's holding for a tier.
    CheckMyTicket {
        /// Buyer to query.
        buyer: Address,
        /// Tier to query.
        tier: TierId,
    },
    /// All-tiers availability snapshot.
    GetTicketsInfo,
    /// Redeem a buyer's holding.
    UseMyTicket {
        /// Redeeming buyer.
        buyer: Address,
        /// Tier to redeem.
        tier: TierId,
    },
    /// Withdraw whole tokens from the ledger's custody to any address.
    UserWithdraw {
        /// Destination account.
        destination: Address,
        /// Whole-token amount.
        amount: u64,
    },
    /// Withdraw whole tokens to the owner.
    OwnerWithdraw {
        /// Invoking identity; must hold the owner capability.
        caller: Address,
        /// Whole-token amount.
        amount: u64,
    },
    /// Inbound transfer notification; the caller must be the token contract,
    /// which the notice's origin field proves.
    TokenReceived(TransferNotice),
}

impl Command {
    const fn name(&self) -> &'static str {
        match self {
            Self::Deploy { .. } => "deploy",
            Self::AddTickets { .. } => "addTickets",
            Self::VerifyTickets { .. } => "verifyTickets",
            Self::CheckTicketsLeft { .. } => "checkTicketsLeft",
            Self::CheckMyTicket { .. } => "checkMyTicket",
            Self::GetTicketsInfo => "getTicketsInfo",
            Self::UseMyTicket { .. } => "useMyTicket",
            Self::UserWithdraw { .. } => "userWithdraw",
            Self::OwnerWithdraw { .. } => "ownerWithdraw",
            Self::TokenReceived(_) => "onTokenTransfer",
        }
    }
}

/// Caller-visible result of a dispatched command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    /// Success flag for mutating operations and verification.
    Ack(bool),
    /// Remaining tickets, absent on failure.
    TicketsLeft(Option<u32>),
    /// A buyer's holding, absent on failure.
    Ticket(Option<Holding>),
    /// All-tiers snapshot, absent on failure.
    Info(Option<TicketsInfo>),
}

impl Reply {
    /// Whether the dispatched operation succeeded.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        match self {
            Self::Ack(ok) => *ok,
            Self::TicketsLeft(value) => value.is_some(),
            Self::Ticket(value) => value.is_some(),
            Self::Info(value) => value.is_some(),
        }
    }
}

impl Ledger {
    /// Dispatches a command, collapsing typed errors to the boolean/absent
    /// reply form after logging them.
    pub async fn dispatch(&self, command: Command) -> Reply {
        let operation = command.name();
        tracing::debug!(operation, "dispatching command");

        let reply = match command {
            Command::Deploy {
                caller,
                event_name,
                start_time,
                total_slots,
            } => Reply::Ack(ack(
                operation,
                self.deploy(&caller, &event_name, start_time, total_slots)
                    .await,
            )),
            Command::AddTickets {
                caller,
                label,
                unit_price,
                total_supply,
            } => Reply::Ack(ack(
                operation,
                self.add_tier(&caller, &label, unit_price, total_supply)
                    .await,
            )),
            Command::VerifyTickets { buyer, claimed } => Reply::Ack(
                self.verify_identity(&buyer, &claimed)
                    .await
                    .inspect_err(|err| {
                        tracing::warn!(operation, error = %err, "operation failed");
                    })
                    .unwrap_or(false),
            ),
            Command::CheckTicketsLeft { tier } => {
                Reply::TicketsLeft(self.remaining_tickets(tier).await.ok())
            }
            Command::CheckMyTicket { buyer, tier } => {
                Reply::Ticket(self.my_ticket(&buyer, tier).await.ok())
            }
            Command::GetTicketsInfo => Reply::Info(self.tickets_info().await.ok()),
            Command::UseMyTicket { buyer, tier } => {
                Reply::Ack(ack(operation, self.use_ticket(&buyer, tier).await))
            }
            Command::UserWithdraw {
                destination,
                amount,
            } => Reply::Ack(ack(operation, self.user_withdraw(&destination, amount).await)),
            Command::OwnerWithdraw { caller, amount } => {
                Reply::Ack(ack(operation, self.owner_withdraw(&caller, amount).await))
            }
            Command::TokenReceived(notice) => {
                Reply::Ack(ack(operation, self.on_token_transfer(&notice).await))
            }
        };

        tracing::debug!(operation, succeeded = reply.succeeded(), "command dispatched");
        reply
    }
}

fn ack<T>(operation: &'static str, result: Result<T, crate::error::LedgerError>) -> bool {
    match result {
        Ok(_) => true,
        Err(err) => {
            tracing::warn!(operation, error = %err, "operation failed");
            false
        }
    }
}
