//! Device push channel.

use std::sync::Mutex;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use engagement_core::config::channels::FcmConfig;
use engagement_core::result::AppResult;
use engagement_entity::notification::{FirebaseSimpleNotification, SendNotificationPayload};

use super::{ensure_success, request_error};

/// Sends a push to a set of device tokens.
#[async_trait]
pub trait PushChannel: Send + Sync + std::fmt::Debug + 'static {
    /// Deliver `payload`.
    async fn send(&self, payload: &SendNotificationPayload) -> AppResult<()>;
}

/// Legacy FCM HTTP request body.
#[derive(Debug, Serialize)]
struct FcmRequest<'a> {
    registration_ids: &'a [String],
    #[serde(skip_serializing_if = "std::collections::HashMap::is_empty")]
    data: &'a std::collections::HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notification: Option<FcmNotification<'a>>,
}

#[derive(Debug, Serialize)]
struct FcmNotification<'a> {
    title: &'a str,
    body: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<&'a str>,
}

impl<'a> From<&'a FirebaseSimpleNotification> for FcmNotification<'a> {
    fn from(n: &'a FirebaseSimpleNotification) -> Self {
        Self {
            title: &n.title,
            body: &n.body,
            image: n.image_url.as_deref(),
        }
    }
}

/// Push channel calling the FCM HTTP endpoint.
#[derive(Debug, Clone)]
pub struct FcmPushChannel {
    client: reqwest::Client,
    config: FcmConfig,
}

impl FcmPushChannel {
    /// Create a channel posting to `config.endpoint`.
    pub fn new(client: reqwest::Client, config: FcmConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl PushChannel for FcmPushChannel {
    async fn send(&self, payload: &SendNotificationPayload) -> AppResult<()> {
        let request = FcmRequest {
            registration_ids: &payload.registration_tokens,
            data: &payload.data,
            notification: payload.notification.as_ref().map(FcmNotification::from),
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .header("Authorization", format!("key={}", self.config.server_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| request_error("failed to send FCM push", e))?;
        ensure_success("failed to send FCM push", response).await?;

        debug!(tokens = payload.registration_tokens.len(), "FCM push sent");
        Ok(())
    }
}

/// Push channel that logs and records each push instead of sending it.
#[derive(Debug, Default)]
pub struct LoggingPushChannel {
    sent: Mutex<Vec<SendNotificationPayload>>,
}

impl LoggingPushChannel {
    /// Create an empty channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every push handed to this channel.
    pub fn sent(&self) -> Vec<SendNotificationPayload> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PushChannel for LoggingPushChannel {
    async fn send(&self, payload: &SendNotificationPayload) -> AppResult<()> {
        info!(
            tokens = payload.registration_tokens.len(),
            title = payload.notification.as_ref().map(|n| n.title.as_str()).unwrap_or(""),
            "Push notification"
        );
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(payload.clone());
        }
        Ok(())
    }
}
