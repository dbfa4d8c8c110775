//! # Turnstile Testing
//!
//! Deterministic implementations of the `turnstile-core` traits for tests,
//! demos, and development:
//!
//! - [`MemoryKv`]: in-memory key-value store
//! - [`FlakyKv`]: store wrapper that injects transient write failures
//! - [`FixedClock`]: settable clock for exercising time-gated logic
//!
//! ## Example
//!
//! ```
//! use turnstile_core::{Clock, KvStore, StorageKey};
//! use turnstile_testing::{MemoryKv, test_clock};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = MemoryKv::new();
//! store
//!     .put(StorageKey::from_static("k"), b"v".to_vec())
//!     .await
//!     .expect("in-memory put cannot fail");
//! assert_eq!(
//!     store.get(StorageKey::from_static("k")).await.expect("get"),
//!     Some(b"v".to_vec())
//! );
//!
//! let clock = test_clock();
//! assert_eq!(clock.now(), clock.now());
//! # }
//! ```

pub mod clock;
pub mod store;

pub use clock::{FixedClock, test_clock};
pub use store::{FlakyKv, MemoryKv};
