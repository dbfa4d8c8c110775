//! # Turnstile Core
//!
//! Core abstractions for the Turnstile ticketing ledger.
//!
//! This crate provides the leaf dependencies the ledger is built on:
//!
//! - **`KvStore`**: a byte-level Get/Put/Delete storage contract
//! - **Codec**: structured encode/decode of composite records to/from bytes
//! - **`Clock`**: injectable time source
//!
//! ## Design
//!
//! The storage contract is deliberately minimal: opaque byte keys, opaque byte
//! values, no multi-key transactions. Everything structured — record layouts,
//! key namespacing, and the concurrency discipline that makes read-modify-write
//! safe — lives above it, in the ledger crate. This keeps any key-value
//! backend (embedded or networked) pluggable behind one small trait.
//!
//! All external dependencies of the ledger are abstracted behind `Send + Sync`
//! traits so they can be injected via an environment and replaced in tests.

// Re-export commonly used types
pub use chrono::{DateTime, Utc};

pub mod clock;
pub mod codec;
pub mod kv;

pub use clock::{Clock, SystemClock};
pub use codec::{CodecError, decode, encode};
pub use kv::{KvError, KvStore, StorageKey};
