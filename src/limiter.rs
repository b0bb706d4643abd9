//! Per-recipient send cap.
//!
//! Fixed counting window anchored at the recipient's first send: the
//! increment that takes the counter from 0 to 1 also sets the one-hour
//! expiry. Deliberately coarse: bursts straddling a window edge are
//! accepted.

use std::sync::Arc;
use std::time::Duration;

use crate::store::{Store, StoreError};

/// Counts send attempts per recipient in the shared store.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn Store>,
    prefix: String,
    max_per_window: i64,
    window: Duration,
}

impl RateLimiter {
    pub fn new(
        store: Arc<dyn Store>,
        prefix: impl Into<String>,
        max_per_window: i64,
        window: Duration,
    ) -> Self {
        Self {
            store,
            prefix: prefix.into(),
            max_per_window,
            window,
        }
    }

    /// Count one send attempt for `recipient` and report whether it may
    /// proceed.
    ///
    /// Always increments; a denied attempt is not refunded. The expiry is
    /// set only when this attempt opened the window.
    pub async fn allow(&self, recipient: &str) -> Result<bool, StoreError> {
        let key = format!("{}{}", self.prefix, recipient);
        let count = self.store.incr(&key).await?;
        if count == 1 {
            self.store.expire(&key, self.window).await?;
        }
        Ok(count <= self.max_per_window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn limiter(store: Arc<MemoryStore>, window: Duration) -> RateLimiter {
        RateLimiter::new(store, "rl:", 5, window)
    }

    #[tokio::test]
    async fn allows_five_then_denies() {
        let store = Arc::new(MemoryStore::new());
        let limiter = limiter(store, Duration::from_secs(3600));
        for attempt in 1..=5 {
            assert!(
                limiter.allow("a@b.com").await.unwrap(),
                "attempt {attempt} should pass"
            );
        }
        assert!(!limiter.allow("a@b.com").await.unwrap());
        assert!(!limiter.allow("a@b.com").await.unwrap());
    }

    #[tokio::test]
    async fn recipients_are_counted_independently() {
        let store = Arc::new(MemoryStore::new());
        let limiter = limiter(store, Duration::from_secs(3600));
        for _ in 0..5 {
            assert!(limiter.allow("a@b.com").await.unwrap());
        }
        assert!(!limiter.allow("a@b.com").await.unwrap());
        assert!(limiter.allow("c@d.com").await.unwrap());
    }

    #[tokio::test]
    async fn window_expiry_resets_the_counter() {
        let store = Arc::new(MemoryStore::new());
        let limiter = limiter(store, Duration::from_millis(30));
        for _ in 0..6 {
            let _ = limiter.allow("a@b.com").await.unwrap();
        }
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(limiter.allow("a@b.com").await.unwrap());
    }
}
