//! Shared backing store for the pipeline.
//!
//! Everything shared across processes goes through here: the delivery
//! queue (one named list), rate-limit counters, and ephemeral credentials.
//! All operations are atomic single-key commands (increment, set with
//! expiry, list push/pop), so no multi-key transaction discipline is
//! needed anywhere above this seam.
//!
//! Backends:
//! - [`RedisStore`]: production backend over a Redis connection
//! - [`MemoryStore`]: in-process backend for tests and local development

pub mod memory;
pub mod redis;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Error from a backing-store operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The Redis command or connection failed.
    #[error("redis: {0}")]
    Redis(#[from] ::redis::RedisError),
}

/// Atomic single-key operations over the shared store.
#[async_trait]
pub trait Store: Send + Sync {
    /// Atomically increment the integer at `key`, returning the new value.
    /// A missing key counts as zero.
    async fn incr(&self, key: &str) -> Result<i64, StoreError>;

    /// Set the remaining time to live of an existing `key`.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Set `key` to `value` with a time to live, overwriting any previous
    /// value and expiry.
    async fn set_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), StoreError>;

    /// Read `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Delete `key`. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Append `payload` to the tail of the named list.
    async fn push_back(&self, list: &str, payload: &[u8]) -> Result<(), StoreError>;

    /// Pop the head of the named list, waiting up to `timeout` for an
    /// element to arrive. `None` means the wait timed out.
    async fn pop_front(
        &self,
        list: &str,
        timeout: Duration,
    ) -> Result<Option<Vec<u8>>, StoreError>;
}
