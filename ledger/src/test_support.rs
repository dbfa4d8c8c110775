//! Shared fixtures for unit tests.

#![allow(clippy::unwrap_used)]

use crate::config::LedgerConfig;
use crate::environment::LedgerEnvironment;
use crate::ledger::Ledger;
use crate::token::{MockToken, TransferNotice, TransferPurpose};
use crate::types::{ADDRESS_LEN, Address, PROOF_LEN, ProofHash, TierId, TokenAmount};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use turnstile_core::Clock;
use turnstile_testing::{FixedClock, MemoryKv, test_clock};
use uuid::Uuid;

/// The configured owner address used by every test harness.
pub(crate) fn owner() -> Address {
    Address::from_array([0xaa; ADDRESS_LEN])
}

/// The ledger's own address.
pub(crate) fn ledger_address() -> Address {
    Address::from_array([0xbb; ADDRESS_LEN])
}

/// The configured token-contract address.
pub(crate) fn token_contract() -> Address {
    Address::from_array([0xcc; ADDRESS_LEN])
}

/// A distinct buyer address per seed.
pub(crate) fn buyer(seed: u8) -> Address {
    Address::from_array([seed; ADDRESS_LEN])
}

/// A distinct proof hash per seed.
pub(crate) fn proof(seed: u8) -> ProofHash {
    ProofHash::from_array([seed; PROOF_LEN])
}

/// Event start time: one hour before the harness clock, so purchases are
/// open unless a test moves the clock.
pub(crate) fn start_time() -> DateTime<Utc> {
    test_clock().now() - Duration::hours(1)
}

pub(crate) struct TestHarness {
    pub ledger: Ledger,
    pub clock: Arc<FixedClock>,
    pub token: Arc<MockToken>,
    pub store: Arc<MemoryKv>,
}

/// A ledger over fresh in-memory collaborators.
pub(crate) fn harness() -> TestHarness {
    let store = MemoryKv::shared();
    let token = Arc::new(MockToken::new());
    let clock = Arc::new(test_clock());
    let config = LedgerConfig::new(owner(), ledger_address(), token_contract());
    let env = LedgerEnvironment::with_single_owner(
        store.clone(),
        token.clone(),
        clock.clone(),
        config,
    );
    TestHarness {
        ledger: Ledger::new(env),
        clock,
        token,
        store,
    }
}

/// A harness with the event deployed (start one hour in the past) and a
/// "VIP" tier of 10 tickets at 50 units.
pub(crate) async fn deployed_harness() -> TestHarness {
    let h = harness();
    h.ledger
        .deploy(&owner(), "Concert", start_time(), 100)
        .await
        .unwrap();
    h.ledger
        .add_tier(&owner(), "VIP", TokenAmount::from_raw(50), 10)
        .await
        .unwrap();
    h
}

/// A well-formed purchase notice addressed to the harness ledger.
pub(crate) fn buy_notice(
    from: Address,
    tier: TierId,
    quantity: u32,
    amount: u64,
    proof_seed: u8,
) -> TransferNotice {
    TransferNotice {
        transfer_id: Uuid::new_v4(),
        token_contract: token_contract(),
        from,
        to: ledger_address(),
        amount: TokenAmount::from_raw(amount),
        purpose: TransferPurpose::BuyTickets {
            tier,
            quantity,
            proof: proof(proof_seed),
        },
    }
}

/// A plain-deposit notice addressed to the harness ledger.
pub(crate) fn deposit_notice(from: Address, amount: u64) -> TransferNotice {
    TransferNotice {
        transfer_id: Uuid::new_v4(),
        token_contract: token_contract(),
        from,
        to: ledger_address(),
        amount: TokenAmount::from_raw(amount),
        purpose: TransferPurpose::Plain,
    }
}
