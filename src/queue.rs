//! Notification tasks and the delivery queue producer.
//!
//! Tasks travel as JSON on a single named list in the backing store. The
//! wire shape below is shared with every consumer process and must stay
//! backward compatible: queued tasks outlive process restarts.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::store::{Store, StoreError};

/// Upper bound on delivery retries; a task failing with this count is
/// dropped rather than re-enqueued.
pub const MAX_RETRIES: u32 = 3;

/// What a queued notification is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationKind {
    Verification,
    PasswordReset,
    GenericNotification,
    Welcome,
    Anniversary,
    Festival,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verification => "verification",
            Self::PasswordReset => "password-reset",
            Self::GenericNotification => "generic-notification",
            Self::Welcome => "welcome",
            Self::Anniversary => "anniversary",
            Self::Festival => "festival",
        }
    }
}

/// One notification waiting for (or undergoing) delivery.
///
/// Bodies are rendered by the producer before enqueue; `data` keeps the
/// rendering inputs alongside them for replay and debugging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationTask {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub to_address: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
    #[serde(default)]
    pub data: HashMap<String, String>,
    #[serde(default)]
    pub retry_count: u32,
    pub created_at: DateTime<Utc>,
}

impl NotificationTask {
    /// Build a fresh task with a zero retry count, stamped now.
    pub fn new(
        kind: NotificationKind,
        to_address: impl Into<String>,
        subject: impl Into<String>,
        html_body: impl Into<String>,
        text_body: impl Into<String>,
        data: HashMap<String, String>,
    ) -> Self {
        Self {
            kind,
            to_address: to_address.into(),
            subject: subject.into(),
            html_body: html_body.into(),
            text_body: text_body.into(),
            data,
            retry_count: 0,
            created_at: Utc::now(),
        }
    }
}

/// Producer handle for the delivery queue.
///
/// Appends tasks to the tail of the named list; never blocks on consumer
/// availability. Enqueue failures (serialization, store transport) are
/// surfaced synchronously to the caller.
#[derive(Clone)]
pub struct TaskQueue {
    store: Arc<dyn Store>,
    key: String,
}

impl TaskQueue {
    pub fn new(store: Arc<dyn Store>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// The list key this queue produces to.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Serialize `task` and append it to the queue tail.
    pub async fn enqueue(&self, task: &NotificationTask) -> Result<(), Error> {
        let payload = serde_json::to_vec(task)?;
        self.store.push_back(&self.key, &payload).await?;
        tracing::debug!(
            kind = task.kind.as_str(),
            to = %task.to_address,
            retry = task.retry_count,
            "task enqueued"
        );
        Ok(())
    }

    /// Pop the queue head, waiting up to `timeout`.
    pub async fn pop(&self, timeout: Duration) -> Result<Option<Vec<u8>>, StoreError> {
        self.store.pop_front(&self.key, timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task() -> NotificationTask {
        let mut data = HashMap::new();
        data.insert("code".to_string(), "123456".to_string());
        NotificationTask::new(
            NotificationKind::Verification,
            "a@b.com",
            "Your code",
            "<p>123456</p>",
            "123456",
            data,
        )
    }

    #[test]
    fn wire_format_uses_the_agreed_field_names() {
        let value = serde_json::to_value(sample_task()).unwrap();
        let obj = value.as_object().unwrap();
        for field in [
            "type",
            "to_address",
            "subject",
            "html_body",
            "text_body",
            "data",
            "retry_count",
            "created_at",
        ] {
            assert!(obj.contains_key(field), "missing wire field {field}");
        }
        assert_eq!(obj["type"], "verification");
        assert_eq!(obj["retry_count"], 0);
        // created_at must be an RFC3339 string, not an epoch number.
        let created_at = obj["created_at"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(created_at).is_ok());
    }

    #[test]
    fn kinds_serialize_kebab_case() {
        for (kind, wire) in [
            (NotificationKind::Verification, "\"verification\""),
            (NotificationKind::PasswordReset, "\"password-reset\""),
            (
                NotificationKind::GenericNotification,
                "\"generic-notification\"",
            ),
            (NotificationKind::Welcome, "\"welcome\""),
            (NotificationKind::Anniversary, "\"anniversary\""),
            (NotificationKind::Festival, "\"festival\""),
        ] {
            assert_eq!(serde_json::to_string(&kind).unwrap(), wire);
        }
    }

    #[test]
    fn decoding_tolerates_missing_optional_fields() {
        let raw = r#"{
            "type": "welcome",
            "to_address": "a@b.com",
            "subject": "s",
            "html_body": "<p>h</p>",
            "text_body": "t",
            "created_at": "2026-08-07T12:00:00Z"
        }"#;
        let task: NotificationTask = serde_json::from_str(raw).unwrap();
        assert_eq!(task.retry_count, 0);
        assert!(task.data.is_empty());
    }

    #[test]
    fn round_trips_through_the_wire_format() {
        let task = sample_task();
        let bytes = serde_json::to_vec(&task).unwrap();
        let decoded: NotificationTask = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(decoded, task);
    }
}
