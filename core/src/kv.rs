//! Key-value store trait and related types.
//!
//! This module defines the storage contract the ledger runs on: `Get`, `Put`,
//! and `Delete` over opaque byte keys and values.
//!
//! # Design
//!
//! The trait is deliberately byte-level. It does NOT provide:
//!
//! - Typed records (the codec layer handles that)
//! - Multi-key transactions (the ledger serializes read-modify-write itself)
//! - Iteration or range scans (records are accessed by exact key only)
//!
//! Implementations must be `Send + Sync` so a store handle can be shared
//! across tasks as `Arc<dyn KvStore>`.
//!
//! # Dyn Compatibility
//!
//! The trait uses explicit `Pin<Box<dyn Future>>` returns instead of
//! `async fn` to remain object-safe, which the ledger relies on for
//! environment injection.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors that can occur during key-value store operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KvError {
    /// The backend rejected or failed the operation.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// The backend is temporarily unavailable; the operation may be retried.
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

impl KvError {
    /// Whether a retry of the failed operation could reasonably succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// An opaque byte key into the store.
///
/// Keys are owned byte strings. Composite keys are built with [`StorageKey::join`],
/// which namespaces a byte suffix under a textual prefix so records of
/// different kinds can never collide in the flat key space.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageKey(Vec<u8>);

impl StorageKey {
    /// Creates a key from a static string (used for sentinel keys).
    #[must_use]
    pub fn from_static(key: &'static str) -> Self {
        Self(key.as_bytes().to_vec())
    }

    /// Creates a key from raw bytes.
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Creates a namespaced key: `prefix`, a `:` separator, then `suffix`.
    #[must_use]
    pub fn join(prefix: &str, suffix: &[u8]) -> Self {
        let mut bytes = Vec::with_capacity(prefix.len() + 1 + suffix.len());
        bytes.extend_from_slice(prefix.as_bytes());
        bytes.push(b':');
        bytes.extend_from_slice(suffix);
        Self(bytes)
    }

    /// The raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consumes the key, returning the raw bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Printable keys render as text, binary keys as hex.
        match std::str::from_utf8(&self.0) {
            Ok(text) if text.chars().all(|c| !c.is_control()) => write!(f, "{text}"),
            _ => write!(f, "0x{}", hex::encode(&self.0)),
        }
    }
}

/// Key-value storage abstraction.
///
/// # Semantics
///
/// - `get` returns `None` for absent keys (absence is not an error)
/// - `put` overwrites unconditionally
/// - `delete` reports whether a record existed
///
/// # Concurrency
///
/// Implementations guarantee only single-key atomicity: each call is applied
/// in full or not at all, but nothing coordinates a read followed by a write.
/// Callers that read-modify-write must serialize those sequences themselves.
pub trait KvStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// - `Backend`: the backend failed the read
    /// - `Unavailable`: the backend is temporarily unreachable
    fn get(
        &self,
        key: StorageKey,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Vec<u8>>, KvError>> + Send + '_>>;

    /// Store `value` under `key`, replacing any existing record.
    ///
    /// # Errors
    ///
    /// - `Backend`: the backend failed the write
    /// - `Unavailable`: the backend is temporarily unreachable
    fn put(
        &self,
        key: StorageKey,
        value: Vec<u8>,
    ) -> Pin<Box<dyn Future<Output = Result<(), KvError>> + Send + '_>>;

    /// Remove the record under `key`, returning whether one existed.
    ///
    /// # Errors
    ///
    /// - `Backend`: the backend failed the delete
    /// - `Unavailable`: the backend is temporarily unreachable
    fn delete(
        &self,
        key: StorageKey,
    ) -> Pin<Box<dyn Future<Output = Result<bool, KvError>> + Send + '_>>;
}
