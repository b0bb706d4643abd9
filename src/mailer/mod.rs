//! Outbound mail transport.
//!
//! The dispatcher talks to a [`Mailer`] trait object; which implementation
//! it gets is decided once at startup:
//! - [`HttpMailer`]: delivers through an HTTP email API
//! - [`DisabledMailer`]: accepts and discards everything (outbound mail
//!   turned off, e.g. local development)

pub mod http;

pub use http::HttpMailer;

use async_trait::async_trait;
use thiserror::Error;

use crate::queue::NotificationTask;

/// Error from a delivery attempt. All variants are treated as transient by
/// the dispatcher and go through the retry protocol.
#[derive(Debug, Error)]
pub enum MailError {
    /// The request to the mail API could not be completed.
    #[error("transport request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The mail API answered with a non-success status.
    #[error("mail API rejected the message: status {status}")]
    Rejected { status: u16 },
}

/// Sends one rendered notification to its recipient.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, task: &NotificationTask) -> Result<(), MailError>;
}

/// Null transport: every send succeeds without leaving the process.
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, task: &NotificationTask) -> Result<(), MailError> {
        tracing::debug!(
            kind = task.kind.as_str(),
            to = %task.to_address,
            "mail transport disabled, discarding rendered message"
        );
        Ok(())
    }
}
