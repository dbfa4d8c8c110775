//! In-memory key-value store implementations.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use turnstile_core::{KvError, KvStore, StorageKey};

/// In-memory [`KvStore`] backed by a `HashMap`.
///
/// Fast and deterministic; the reference backend for unit and integration
/// tests and for the demo binary. Cheap to share via `Arc`.
#[derive(Debug, Default)]
pub struct MemoryKv {
    records: RwLock<HashMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryKv {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an Arc-wrapped store for sharing.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Number of records currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KvStore for MemoryKv {
    fn get(
        &self,
        key: StorageKey,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Vec<u8>>, KvError>> + Send + '_>> {
        Box::pin(async move {
            let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
            Ok(records.get(key.as_bytes()).cloned())
        })
    }

    fn put(
        &self,
        key: StorageKey,
        value: Vec<u8>,
    ) -> Pin<Box<dyn Future<Output = Result<(), KvError>> + Send + '_>> {
        Box::pin(async move {
            let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
            records.insert(key.into_bytes(), value);
            Ok(())
        })
    }

    fn delete(
        &self,
        key: StorageKey,
    ) -> Pin<Box<dyn Future<Output = Result<bool, KvError>> + Send + '_>> {
        Box::pin(async move {
            let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
            Ok(records.remove(key.as_bytes()).is_some())
        })
    }
}

/// Store wrapper that fails the first N `put` calls with a transient error.
///
/// Reads and deletes pass straight through. Used to exercise the ledger's
/// bounded-retry persistence path.
pub struct FlakyKv {
    inner: Arc<dyn KvStore>,
    put_failures_left: AtomicUsize,
}

impl FlakyKv {
    /// Wraps `inner`, injecting `failures` transient put failures.
    #[must_use]
    pub fn new(inner: Arc<dyn KvStore>, failures: usize) -> Self {
        Self {
            inner,
            put_failures_left: AtomicUsize::new(failures),
        }
    }

    /// How many injected failures remain.
    #[must_use]
    pub fn failures_left(&self) -> usize {
        self.put_failures_left.load(Ordering::SeqCst)
    }
}

impl KvStore for FlakyKv {
    fn get(
        &self,
        key: StorageKey,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Vec<u8>>, KvError>> + Send + '_>> {
        self.inner.get(key)
    }

    fn put(
        &self,
        key: StorageKey,
        value: Vec<u8>,
    ) -> Pin<Box<dyn Future<Output = Result<(), KvError>> + Send + '_>> {
        let consumed = self
            .put_failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if consumed {
            Box::pin(async { Err(KvError::Unavailable("injected put failure".to_string())) })
        } else {
            self.inner.put(key, value)
        }
    }

    fn delete(
        &self,
        key: StorageKey,
    ) -> Pin<Box<dyn Future<Output = Result<bool, KvError>> + Send + '_>> {
        self.inner.delete(key)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn key(name: &'static str) -> StorageKey {
        StorageKey::from_static(name)
    }

    #[tokio::test]
    async fn get_returns_none_for_absent_key() {
        let store = MemoryKv::new();
        assert_eq!(store.get(key("missing")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let store = MemoryKv::new();
        store.put(key("a"), vec![1, 2, 3]).await.unwrap();
        assert_eq!(store.get(key("a")).await.unwrap(), Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn put_overwrites_existing_value() {
        let store = MemoryKv::new();
        store.put(key("a"), vec![1]).await.unwrap();
        store.put(key("a"), vec![2]).await.unwrap();
        assert_eq!(store.get(key("a")).await.unwrap(), Some(vec![2]));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn delete_reports_existence() {
        let store = MemoryKv::new();
        store.put(key("a"), vec![1]).await.unwrap();
        assert!(store.delete(key("a")).await.unwrap());
        assert!(!store.delete(key("a")).await.unwrap());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn flaky_store_fails_exactly_n_puts() {
        let store = FlakyKv::new(MemoryKv::shared(), 2);

        assert!(matches!(
            store.put(key("a"), vec![1]).await,
            Err(KvError::Unavailable(_))
        ));
        assert!(matches!(
            store.put(key("a"), vec![1]).await,
            Err(KvError::Unavailable(_))
        ));
        store.put(key("a"), vec![1]).await.unwrap();
        assert_eq!(store.failures_left(), 0);
    }

    #[tokio::test]
    async fn flaky_store_passes_reads_through() {
        let inner = MemoryKv::shared();
        inner.put(key("a"), vec![9]).await.unwrap();
        let store = FlakyKv::new(inner, 5);
        assert_eq!(store.get(key("a")).await.unwrap(), Some(vec![9]));
    }
}
