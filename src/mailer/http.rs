//! HTTP email-API transport.

use async_trait::async_trait;

use super::{MailError, Mailer};
use crate::queue::NotificationTask;

/// Delivers mail by POSTing JSON to a transactional email API.
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
    from: String,
}

impl HttpMailer {
    /// `endpoint` is the API's send URL; `token` an optional bearer
    /// credential; `from` the sender header for every message.
    pub fn new(endpoint: impl Into<String>, token: Option<String>, from: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            token,
            from: from.into(),
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, task: &NotificationTask) -> Result<(), MailError> {
        let body = serde_json::json!({
            "from": self.from,
            "to": [task.to_address],
            "subject": task.subject,
            "html": task.html_body,
            "text": task.text_body,
        });

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MailError::Rejected {
                status: status.as_u16(),
            });
        }

        tracing::debug!(
            kind = task.kind.as_str(),
            to = %task.to_address,
            "message accepted by mail API"
        );
        Ok(())
    }
}
