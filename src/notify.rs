//! Producer facade.
//!
//! The domain layer calls these entry points when something notification-
//! worthy happens: registration, a password-reset request, a detected
//! anniversary, a festival campaign. Each send mints a record id and
//! renders the task, then counts it against the recipient's rate window
//! before enqueueing. The consumer side takes over from there.

use std::sync::Arc;

use crate::credential::{self, CredentialStore, Purpose};
use crate::error::Error;
use crate::idgen::EventIdGenerator;
use crate::limiter::RateLimiter;
use crate::queue::{NotificationTask, TaskQueue};
use crate::render;

/// What became of a send request.
///
/// Rate-limit denial is an expected outcome, not an error: the caller
/// turns it into a "try again later" message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Task accepted onto the delivery queue; `event_id` is the minted
    /// record identifier.
    Queued { event_id: i64 },
    /// The recipient's hourly send window is spent.
    RateLimited,
}

impl SendOutcome {
    pub fn is_queued(&self) -> bool {
        matches!(self, Self::Queued { .. })
    }
}

/// Producer-side entry points for every notification kind.
#[derive(Clone)]
pub struct Notifier {
    ids: Arc<EventIdGenerator>,
    queue: TaskQueue,
    limiter: RateLimiter,
    credentials: CredentialStore,
}

impl Notifier {
    pub fn new(
        ids: Arc<EventIdGenerator>,
        queue: TaskQueue,
        limiter: RateLimiter,
        credentials: CredentialStore,
    ) -> Self {
        Self {
            ids,
            queue,
            limiter,
            credentials,
        }
    }

    /// Issue a fresh verification code for `to`, store it (15 min TTL,
    /// replacing any previous code), and queue the email carrying it.
    pub async fn send_verification_code(&self, to: &str) -> Result<SendOutcome, Error> {
        let code = credential::generate_code();
        self.credentials
            .store(Purpose::EmailVerify, to, &code, None)
            .await?;
        self.dispatch(render::verification(to, &code)).await
    }

    /// Check a user-submitted verification code. Consumes it on success.
    pub async fn verify_code(&self, to: &str, candidate: &str) -> Result<bool, Error> {
        Ok(self
            .credentials
            .verify(Purpose::EmailVerify, to, candidate)
            .await?)
    }

    /// Issue a reset token for `to` (30 min TTL) and queue the email.
    pub async fn send_password_reset(&self, to: &str) -> Result<SendOutcome, Error> {
        let token = credential::generate_token();
        self.credentials
            .store(Purpose::PasswordReset, to, &token, None)
            .await?;
        self.dispatch(render::password_reset(to, &token)).await
    }

    /// Check a submitted reset token. Consumes it on success.
    pub async fn consume_reset_token(&self, to: &str, candidate: &str) -> Result<bool, Error> {
        Ok(self
            .credentials
            .verify(Purpose::PasswordReset, to, candidate)
            .await?)
    }

    /// Queue the post-registration greeting.
    pub async fn send_welcome(&self, to: &str, name: &str) -> Result<SendOutcome, Error> {
        self.dispatch(render::welcome(to, name)).await
    }

    /// Queue an anniversary reminder.
    pub async fn send_anniversary(
        &self,
        to: &str,
        partner: &str,
        years: u32,
    ) -> Result<SendOutcome, Error> {
        self.dispatch(render::anniversary(to, partner, years)).await
    }

    /// Queue a festival greeting.
    pub async fn send_festival(&self, to: &str, festival: &str) -> Result<SendOutcome, Error> {
        self.dispatch(render::festival(to, festival)).await
    }

    /// Queue a free-form notification.
    pub async fn send_notification(
        &self,
        to: &str,
        subject: &str,
        message: &str,
    ) -> Result<SendOutcome, Error> {
        self.dispatch(render::generic(to, subject, message)).await
    }

    /// Mint the record id, count the attempt against the recipient's
    /// window, and enqueue. Enqueue failures surface to the caller.
    async fn dispatch(&self, task: NotificationTask) -> Result<SendOutcome, Error> {
        let event_id = self.ids.next_id();

        if !self.limiter.allow(&task.to_address).await? {
            tracing::info!(
                kind = task.kind.as_str(),
                to = %task.to_address,
                "send denied by rate limit"
            );
            return Ok(SendOutcome::RateLimited);
        }

        self.queue.enqueue(&task).await?;
        tracing::debug!(
            event_id,
            kind = task.kind.as_str(),
            to = %task.to_address,
            "notification queued"
        );
        Ok(SendOutcome::Queued { event_id })
    }
}
