//! Queue consumer and delivery dispatcher.
//!
//! One long-lived loop per process pulls tasks off the delivery queue,
//! hands them to the mail transport, and owns the whole failure protocol:
//! linear-backoff retries up to [`MAX_RETRIES`], then a logged terminal
//! drop. Delivery failures are never propagated back to the producer; by
//! the time a task is on the queue, the producer has already been told it
//! succeeded.
//!
//! Retries are scheduled, not slept in-loop: a failed task waits out its
//! backoff on a spawned timer task while the consumer keeps draining the
//! queue.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::mailer::{MailError, Mailer};
use crate::queue::{NotificationTask, TaskQueue, MAX_RETRIES};

/// Long-running consumer for the delivery queue.
pub struct Dispatcher {
    queue: TaskQueue,
    mailer: Arc<dyn Mailer>,
    pop_timeout: Duration,
    retry_delay: Duration,
}

impl Dispatcher {
    /// `pop_timeout` bounds each blocking pop (and is therefore the
    /// cancellation latency); `retry_delay` is the backoff unit, so a task
    /// on retry `n` waits `n * retry_delay` before re-enqueue.
    pub fn new(
        queue: TaskQueue,
        mailer: Arc<dyn Mailer>,
        pop_timeout: Duration,
        retry_delay: Duration,
    ) -> Self {
        Self {
            queue,
            mailer,
            pop_timeout,
            retry_delay,
        }
    }

    /// Consume until `cancel` fires.
    ///
    /// Each iteration finishes its bounded pop before checking the token,
    /// so shutdown takes at most one `pop_timeout`. Tasks in flight when
    /// the token fires are re-enqueued best-effort only.
    pub async fn run(self, cancel: CancellationToken) {
        tracing::info!(queue = self.queue.key(), "dispatcher started");
        loop {
            if cancel.is_cancelled() {
                break;
            }
            match self.queue.pop(self.pop_timeout).await {
                Ok(Some(payload)) => self.process(&payload).await,
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "queue pop failed, backing off");
                    tokio::time::sleep(self.pop_timeout).await;
                }
            }
        }
        tracing::info!("dispatcher stopped");
    }

    async fn process(&self, payload: &[u8]) {
        let task: NotificationTask = match serde_json::from_slice(payload) {
            Ok(task) => task,
            Err(e) => {
                // Retrying cannot fix a payload that does not parse.
                tracing::warn!(error = %e, "discarding malformed task");
                return;
            }
        };

        match self.mailer.send(&task).await {
            Ok(()) => {
                tracing::debug!(
                    kind = task.kind.as_str(),
                    to = %task.to_address,
                    retry = task.retry_count,
                    "notification delivered"
                );
            }
            Err(e) => self.schedule_retry(task, &e),
        }
    }

    /// Re-enqueue a failed task after its backoff, or drop it once the
    /// retry budget is spent.
    fn schedule_retry(&self, mut task: NotificationTask, err: &MailError) {
        if task.retry_count >= MAX_RETRIES {
            tracing::error!(
                kind = task.kind.as_str(),
                to = %task.to_address,
                attempts = task.retry_count + 1,
                error = %err,
                "notification dropped after exhausting retries"
            );
            return;
        }

        task.retry_count += 1;
        let delay = self.retry_delay * task.retry_count;
        tracing::warn!(
            kind = task.kind.as_str(),
            to = %task.to_address,
            retry = task.retry_count,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "delivery failed, retry scheduled"
        );

        let queue = self.queue.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = queue.enqueue(&task).await {
                tracing::error!(
                    to = %task.to_address,
                    error = %e,
                    "failed to re-enqueue task for retry"
                );
            }
        });
    }
}
