//! End-to-end walk-through of the ticketing ledger against in-memory
//! collaborators: deploy, add tiers, purchase via transfer notification,
//! query, redeem, withdraw.

use anyhow::Result;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use turnstile_ledger::{
    Address, Command, LedgerConfig, Ledger, LedgerEnvironment, MockToken, ProofHash, Reply,
    TierId, TokenAmount, TransferNotice, TransferPurpose,
};
use turnstile_testing::MemoryKv;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    turnstile_ledger::metrics::register_ledger_metrics();

    let config = LedgerConfig::from_env();
    let owner = config.owner;
    let ledger_address = config.ledger_address;
    let token_contract = config.token_contract;

    let store = MemoryKv::shared();
    let token = Arc::new(MockToken::new());
    let clock = Arc::new(turnstile_core::SystemClock::new());
    let env = LedgerEnvironment::with_single_owner(store, token, clock, config);
    let ledger = Ledger::new(env);

    // Deploy an event whose sales opened an hour ago.
    let start_time = Utc::now() - Duration::hours(1);
    let deployed = ledger
        .dispatch(Command::Deploy {
            caller: owner,
            event_name: "Rustfest".to_string(),
            start_time,
            total_slots: 150,
        })
        .await;
    tracing::info!(?deployed, "deploy");

    ledger
        .dispatch(Command::AddTickets {
            caller: owner,
            label: "VIP".to_string(),
            unit_price: TokenAmount::from_raw(50),
            total_supply: 10,
        })
        .await;
    ledger
        .dispatch(Command::AddTickets {
            caller: owner,
            label: "GA".to_string(),
            unit_price: TokenAmount::from_raw(10),
            total_supply: 140,
        })
        .await;

    // A buyer pays 150 units for 3 VIP tickets; the token contract notifies us.
    let alice = Address::from_array([0x11; 20]);
    let proof = ProofHash::from_array([0x42; 32]);
    let bought = ledger
        .dispatch(Command::TokenReceived(TransferNotice {
            transfer_id: Uuid::new_v4(),
            token_contract,
            from: alice,
            to: ledger_address,
            amount: TokenAmount::from_raw(150),
            purpose: TransferPurpose::BuyTickets {
                tier: TierId::new(0),
                quantity: 3,
                proof,
            },
        }))
        .await;
    tracing::info!(?bought, "purchase");

    let left = ledger
        .dispatch(Command::CheckTicketsLeft {
            tier: TierId::new(0),
        })
        .await;
    let info = ledger.dispatch(Command::GetTicketsInfo).await;
    tracing::info!(?left, ?info, "availability after purchase");

    let verified = ledger
        .dispatch(Command::VerifyTickets {
            buyer: alice,
            claimed: proof,
        })
        .await;
    tracing::info!(?verified, "identity verification");

    let used = ledger
        .dispatch(Command::UseMyTicket {
            buyer: alice,
            tier: TierId::new(0),
        })
        .await;
    let used_again = ledger
        .dispatch(Command::UseMyTicket {
            buyer: alice,
            tier: TierId::new(0),
        })
        .await;
    tracing::info!(?used, ?used_again, "redemption is one-time");

    let withdrawn = ledger
        .dispatch(Command::OwnerWithdraw {
            caller: owner,
            amount: 1,
        })
        .await;
    tracing::info!(?withdrawn, "owner withdrawal");

    if let Reply::Ack(false) = withdrawn {
        anyhow::bail!("owner withdrawal failed");
    }
    Ok(())
}
