//! Email channel.

use std::sync::Mutex;

use async_trait::async_trait;
use tracing::{debug, info};

use engagement_core::config::channels::MailConfig;
use engagement_core::result::AppResult;
use engagement_entity::notification::EmailPayload;

use super::{ensure_success, request_error};

/// Sends an email.
#[async_trait]
pub trait MailChannel: Send + Sync + std::fmt::Debug + 'static {
    /// Deliver `payload`.
    async fn send(&self, payload: &EmailPayload) -> AppResult<()>;
}

/// Mail channel posting a form to a transactional mail API.
#[derive(Debug, Clone)]
pub struct HttpMailChannel {
    client: reqwest::Client,
    config: MailConfig,
}

impl HttpMailChannel {
    /// Create a channel posting to `config.endpoint`.
    pub fn new(client: reqwest::Client, config: MailConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl MailChannel for HttpMailChannel {
    async fn send(&self, payload: &EmailPayload) -> AppResult<()> {
        let to = payload.to.join(",");
        let mut form = vec![
            ("from", self.config.from.as_str()),
            ("to", to.as_str()),
            ("subject", payload.subject.as_str()),
            ("text", payload.text.as_str()),
        ];
        if let Some(html) = payload.html.as_deref() {
            form.push(("html", html));
        }

        let response = self
            .client
            .post(&self.config.endpoint)
            .basic_auth("api", Some(&self.config.api_key))
            .form(&form)
            .send()
            .await
            .map_err(|e| request_error("failed to send email", e))?;
        ensure_success("failed to send email", response).await?;

        debug!(recipients = payload.to.len(), "Email sent");
        Ok(())
    }
}

/// Mail channel that logs and records each email instead of sending it.
#[derive(Debug, Default)]
pub struct LoggingMailChannel {
    sent: Mutex<Vec<EmailPayload>>,
}

impl LoggingMailChannel {
    /// Create an empty channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every email handed to this channel.
    pub fn sent(&self) -> Vec<EmailPayload> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl MailChannel for LoggingMailChannel {
    async fn send(&self, payload: &EmailPayload) -> AppResult<()> {
        info!(
            recipients = payload.to.len(),
            subject = %payload.subject,
            "Email notification"
        );
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(payload.clone());
        }
        Ok(())
    }
}
