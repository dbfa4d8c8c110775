//! Races on the tier list and on individual holdings.
//!
//! The store has no multi-key transactions, so these tests hammer the two
//! contended paths: concurrent purchases of the same tier (lost-update risk
//! on the `sold` counter) and concurrent redemption of one holding
//! (double-spend risk on the `used` flag).

#![allow(clippy::unwrap_used)]

use chrono::Duration;
use futures::future::join_all;
use std::sync::Arc;
use turnstile_core::Clock;
use turnstile_ledger::{
    Address, Ledger, LedgerConfig, LedgerEnvironment, MockToken, ProofHash, PurchaseOutcome,
    TierId, TokenAmount, TransferNotice, TransferPurpose,
};
use turnstile_testing::{MemoryKv, test_clock};
use uuid::Uuid;

const OWNER: Address = Address::from_array([0xaa; 20]);
const LEDGER: Address = Address::from_array([0xbb; 20]);
const TOKEN: Address = Address::from_array([0xcc; 20]);

async fn deployed_ledger(supply: u32) -> Arc<Ledger> {
    let clock = Arc::new(test_clock());
    let start = clock.now() - Duration::hours(1);
    let env = LedgerEnvironment::with_single_owner(
        MemoryKv::shared(),
        Arc::new(MockToken::new()),
        clock,
        LedgerConfig::new(OWNER, LEDGER, TOKEN),
    );
    let ledger = Ledger::new(env);
    ledger.deploy(&OWNER, "Concert", start, 1_000).await.unwrap();
    ledger
        .add_tier(&OWNER, "GA", TokenAmount::from_raw(10), supply)
        .await
        .unwrap();
    Arc::new(ledger)
}

fn buyer(seed: u8) -> Address {
    Address::from_array([seed; 20])
}

fn purchase(from: Address, quantity: u32, amount: u64) -> TransferNotice {
    TransferNotice {
        transfer_id: Uuid::new_v4(),
        token_contract: TOKEN,
        from,
        to: LEDGER,
        amount: TokenAmount::from_raw(amount),
        purpose: TransferPurpose::BuyTickets {
            tier: TierId::new(0),
            quantity,
            proof: ProofHash::from_array([0x42; 32]),
        },
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_purchases_never_oversell() {
    let ledger = deployed_ledger(10).await;

    let tasks = (0..20u8).map(|i| {
        let ledger = Arc::clone(&ledger);
        tokio::spawn(async move {
            ledger
                .on_token_transfer(&purchase(buyer(i + 1), 1, 10))
                .await
        })
    });
    let results = join_all(tasks).await;

    let succeeded = results
        .into_iter()
        .map(|joined| joined.unwrap())
        .filter(|outcome| matches!(outcome, Ok(PurchaseOutcome::Purchased(_))))
        .count();

    assert_eq!(succeeded, 10);
    assert_eq!(
        ledger.remaining_tickets(TierId::new(0)).await.unwrap(),
        0
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_redemptions_redeem_exactly_once() {
    let ledger = deployed_ledger(10).await;
    let alice = buyer(1);
    ledger
        .on_token_transfer(&purchase(alice, 2, 20))
        .await
        .unwrap();

    let tasks = (0..8).map(|_| {
        let ledger = Arc::clone(&ledger);
        tokio::spawn(async move { ledger.use_ticket(&alice, TierId::new(0)).await })
    });
    let results = join_all(tasks).await;

    let succeeded = results
        .into_iter()
        .filter(|joined| matches!(joined, Ok(Ok(()))))
        .count();
    assert_eq!(succeeded, 1);
    assert!(
        ledger
            .my_ticket(&alice, TierId::new(0))
            .await
            .unwrap()
            .used
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_deposits_accumulate_exactly() {
    let ledger = deployed_ledger(10).await;
    let carol = buyer(3);

    let tasks = (0..16).map(|_| {
        let ledger = Arc::clone(&ledger);
        tokio::spawn(async move {
            ledger
                .on_token_transfer(&TransferNotice {
                    transfer_id: Uuid::new_v4(),
                    token_contract: TOKEN,
                    from: carol,
                    to: LEDGER,
                    amount: TokenAmount::from_raw(5),
                    purpose: TransferPurpose::Plain,
                })
                .await
        })
    });
    let results = join_all(tasks).await;

    let max_total = results
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .filter_map(|outcome| match outcome {
            PurchaseOutcome::Deposited { total } => Some(total),
            _ => None,
        })
        .max();
    assert_eq!(max_total, Some(TokenAmount::from_raw(80)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_tier_appends_keep_every_tier() {
    let ledger = deployed_ledger(10).await;

    let tasks = (0..9).map(|i| {
        let ledger = Arc::clone(&ledger);
        tokio::spawn(async move {
            ledger
                .add_tier(
                    &OWNER,
                    &format!("tier-{i}"),
                    TokenAmount::from_raw(1),
                    1,
                )
                .await
        })
    });
    let results = join_all(tasks).await;
    assert!(results.into_iter().all(|joined| joined.unwrap().is_ok()));

    // The seeded "GA" tier plus nine appended tiers all survived the race.
    assert_eq!(ledger.all_tickets().await.unwrap().len(), 10);
}
