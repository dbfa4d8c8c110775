//! Configuration management for the ledger.
//!
//! Loads configuration from environment variables with development defaults.

use crate::retry::StoreRetry;
use crate::types::{ADDRESS_LEN, Address};
use std::env;
use std::time::Duration;

/// Decimal scale of the payment token: 8 decimals, so one whole token is
/// `100_000_000` smallest units.
pub const DEFAULT_TOKEN_SCALE: u64 = 100_000_000;

/// Ledger configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// The event owner's address; the only identity the owner capability
    /// check accepts.
    pub owner: Address,
    /// This ledger's own address; inbound transfers must name it as the
    /// recipient.
    pub ledger_address: Address,
    /// Address of the token contract; the only accepted origin for transfer
    /// notifications.
    pub token_contract: Address,
    /// Smallest units per whole token, as the token contract declares it.
    pub token_scale: u64,
    /// Retry policy for storage writes in mutation paths.
    pub store_retry: StoreRetry,
}

impl LedgerConfig {
    /// Creates a configuration with explicit addresses and default knobs.
    #[must_use]
    pub fn new(owner: Address, ledger_address: Address, token_contract: Address) -> Self {
        Self {
            owner,
            ledger_address,
            token_contract,
            token_scale: DEFAULT_TOKEN_SCALE,
            store_retry: StoreRetry::default(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Unset or unparseable variables fall back to development defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let retry_defaults = StoreRetry::default();
        Self {
            owner: addr_from_env("TURNSTILE_OWNER", [0xaa; ADDRESS_LEN]),
            ledger_address: addr_from_env("TURNSTILE_ADDRESS", [0xbb; ADDRESS_LEN]),
            token_contract: addr_from_env("TURNSTILE_TOKEN", [0xcc; ADDRESS_LEN]),
            token_scale: env::var("TURNSTILE_TOKEN_SCALE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TOKEN_SCALE),
            store_retry: StoreRetry {
                max_attempts: env::var("TURNSTILE_STORE_RETRIES")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(retry_defaults.max_attempts),
                initial_delay: env::var("TURNSTILE_STORE_RETRY_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .map_or(retry_defaults.initial_delay, Duration::from_millis),
                max_delay: retry_defaults.max_delay,
            },
        }
    }
}

fn addr_from_env(var: &str, fallback: [u8; ADDRESS_LEN]) -> Address {
    env::var(var)
        .ok()
        .and_then(|s| Address::from_hex(&s).ok())
        .unwrap_or(Address::from_array(fallback))
}
