//! Contract between the feed engine and the notification bus.

use std::collections::HashMap;

use async_trait::async_trait;

use engagement_core::Flavour;
use engagement_core::result::AppResult;
use engagement_entity::envelope::EnvelopePayload;
use engagement_entity::notification::{EmailPayload, SendNotificationPayload};

use crate::topics::TopicId;

/// Publishes feed mutations and direct sends onto the bus.
#[async_trait]
pub trait NotificationService: Send + Sync + std::fmt::Debug + 'static {
    /// Wrap `payload` in an envelope and publish it to `topic`.
    async fn notify(
        &self,
        topic: TopicId,
        uid: &str,
        flavour: Flavour,
        payload: EnvelopePayload,
        metadata: HashMap<String, String>,
    ) -> AppResult<()>;

    /// Every deployed topic name.
    fn topic_ids(&self) -> Vec<String>;

    /// Deployed topic name to subscription id.
    fn subscription_ids(&self) -> HashMap<String, String>;

    /// Subscription id to deployed topic name.
    fn reverse_subscription_ids(&self) -> HashMap<String, String>;

    /// Queue a device push on the send-notification topic.
    async fn push(&self, sender: &str, payload: SendNotificationPayload) -> AppResult<()>;

    /// Queue an email on the send-email topic.
    async fn email(&self, payload: EmailPayload) -> AppResult<()>;
}
