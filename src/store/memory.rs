//! In-process backend for the shared store.
//!
//! Mirrors the Redis semantics closely enough for tests and local
//! development without a Redis instance: TTLs expire against a monotonic
//! clock, `incr` preserves an existing expiry, and `pop_front` waits for a
//! push the way `BLPOP` does.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use super::{Store, StoreError};

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

/// Shared store held entirely in process memory.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
    lists: Mutex<HashMap<String, VecDeque<Vec<u8>>>>,
    pushed: Notify,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of elements currently queued in the named list.
    pub fn list_len(&self, list: &str) -> usize {
        self.lists.lock().get(list).map_or(0, VecDeque::len)
    }

    /// Read a live entry, dropping it if its TTL has lapsed.
    fn live_value(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn incr(&self, key: &str) -> Result<i64, StoreError> {
        let mut entries = self.entries.lock();
        let (current, expires_at) = match entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                (entry.value.parse::<i64>().unwrap_or(0), entry.expires_at)
            }
            _ => (0, None),
        };
        let next = current + 1;
        entries.insert(
            key.to_string(),
            Entry {
                value: next.to_string(),
                expires_at,
            },
        );
        Ok(next)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get_mut(key) {
            entry.expires_at = Some(Instant::now() + ttl);
        }
        Ok(())
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        self.entries.lock().insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Some(Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.live_value(key))
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().remove(key);
        Ok(())
    }

    async fn push_back(&self, list: &str, payload: &[u8]) -> Result<(), StoreError> {
        self.lists
            .lock()
            .entry(list.to_string())
            .or_default()
            .push_back(payload.to_vec());
        self.pushed.notify_waiters();
        Ok(())
    }

    async fn pop_front(
        &self,
        list: &str,
        timeout: Duration,
    ) -> Result<Option<Vec<u8>>, StoreError> {
        let deadline = Instant::now() + timeout;
        loop {
            // Register for wakeups before checking, so a push between the
            // check and the await cannot be missed.
            let pushed = self.pushed.notified();

            if let Some(payload) = self
                .lists
                .lock()
                .get_mut(list)
                .and_then(VecDeque::pop_front)
            {
                return Ok(Some(payload));
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            if tokio::time::timeout(deadline - now, pushed).await.is_err() {
                return Ok(None);
            }
        }
    }
}
