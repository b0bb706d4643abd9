//! Test utilities and pipeline harness.
//!
//! Provides:
//! - In-process pipeline setup (in-memory store, scripted mailer)
//! - A running dispatcher with fast pop/backoff timings
//! - Helpers for awaiting asynchronous delivery

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use tandem_notify::credential::CredentialStore;
use tandem_notify::dispatch::Dispatcher;
use tandem_notify::idgen::EventIdGenerator;
use tandem_notify::limiter::RateLimiter;
use tandem_notify::mailer::{MailError, Mailer};
use tandem_notify::notify::Notifier;
use tandem_notify::observability::tracing::init_test_tracing;
use tandem_notify::queue::{NotificationTask, TaskQueue};
use tandem_notify::store::{MemoryStore, Store};

/// Queue key used by every test pipeline.
pub const QUEUE_KEY: &str = "test:notify:queue";

/// Bounded wait per queue pop. Short, so shutdown is fast.
pub const POP_TIMEOUT: Duration = Duration::from_millis(25);

/// Backoff unit between retries (retry n waits n times this).
pub const RETRY_DELAY: Duration = Duration::from_millis(25);

/// Mail transport double: records every delivered task and can be scripted
/// to fail the first N sends (or all of them).
pub struct RecordingMailer {
    calls: AtomicU32,
    fail_remaining: AtomicU32,
    sent: Mutex<Vec<NotificationTask>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::failing_first(0)
    }

    /// Fail the first `n` sends, then succeed.
    pub fn failing_first(n: u32) -> Self {
        Self {
            calls: AtomicU32::new(0),
            fail_remaining: AtomicU32::new(n),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Fail every send.
    pub fn always_failing() -> Self {
        Self::failing_first(u32::MAX)
    }

    /// Total transport invocations, successful or not.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn sent(&self) -> Vec<NotificationTask> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, task: &NotificationTask) -> Result<(), MailError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.fail_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            if remaining != u32::MAX {
                self.fail_remaining.store(remaining - 1, Ordering::SeqCst);
            }
            return Err(MailError::Rejected { status: 503 });
        }
        self.sent.lock().unwrap().push(task.clone());
        Ok(())
    }
}

/// A complete in-process pipeline: store, producer facade, and a running
/// dispatcher wired to a [`RecordingMailer`].
pub struct TestPipeline {
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<RecordingMailer>,
    pub queue: TaskQueue,
    pub notifier: Notifier,
    cancel: CancellationToken,
    worker: tokio::task::JoinHandle<()>,
}

impl TestPipeline {
    /// Start a pipeline whose transport always succeeds.
    pub fn start() -> Self {
        Self::with_mailer(Arc::new(RecordingMailer::new()))
    }

    /// Start a pipeline around a scripted mailer.
    pub fn with_mailer(mailer: Arc<RecordingMailer>) -> Self {
        init_test_tracing();

        let store = Arc::new(MemoryStore::new());
        let shared: Arc<dyn Store> = store.clone();

        let queue = TaskQueue::new(Arc::clone(&shared), QUEUE_KEY);
        let ids = Arc::new(EventIdGenerator::new(1).expect("valid node id"));
        let limiter = RateLimiter::new(
            Arc::clone(&shared),
            "test:rl:",
            5,
            Duration::from_secs(3600),
        );
        let credentials = CredentialStore::new(shared);
        let notifier = Notifier::new(ids, queue.clone(), limiter, credentials);

        let transport: Arc<dyn Mailer> = mailer.clone();
        let dispatcher = Dispatcher::new(queue.clone(), transport, POP_TIMEOUT, RETRY_DELAY);
        let cancel = CancellationToken::new();
        let worker = tokio::spawn(dispatcher.run(cancel.clone()));

        Self {
            store,
            mailer,
            queue,
            notifier,
            cancel,
            worker,
        }
    }

    /// Cancel the dispatcher and wait for the loop to exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.worker.await;
    }
}

/// Wait for a condition to become true with timeout.
///
/// # Arguments
///
/// * `timeout` - Maximum time to wait
/// * `condition` - Closure that returns true when condition is met
///
/// # Returns
///
/// `true` if condition was met, `false` if timeout expired
pub async fn wait_for<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
