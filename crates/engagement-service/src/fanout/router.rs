//! Maps delivered bus messages onto fan-out handlers.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use engagement_core::error::AppError;
use engagement_core::result::AppResult;
use engagement_pubsub::{MessageHandler, PubSubPayload, TopicNamer};

use super::sender::Sender;
use super::service::FanoutService;

/// Resolves the sender of a delivery and hands its data to [`FanoutService`].
#[derive(Debug, Clone)]
pub struct TopicRouter {
    namer: TopicNamer,
    fanout: Arc<FanoutService>,
}

impl TopicRouter {
    /// Create a router over the topics named by `namer`.
    pub fn new(namer: TopicNamer, fanout: Arc<FanoutService>) -> Self {
        Self { namer, fanout }
    }

    /// The sender of `payload`, taken from its topic attribute and falling
    /// back to its subscription.
    pub fn resolve_sender(&self, payload: &PubSubPayload) -> AppResult<Sender> {
        payload
            .message
            .topic_id()
            .and_then(|topic| self.namer.resolve_topic(topic))
            .or_else(|| self.namer.resolve_subscription(&payload.subscription))
            .map(Sender::from)
            .ok_or_else(|| {
                AppError::unexpected_sender(format!(
                    "unknown topic {:?} on subscription '{}'",
                    payload.message.topic_id(),
                    payload.subscription
                ))
            })
    }

    /// Decode `payload` and run the matching fan-out handler.
    pub async fn route(&self, payload: &PubSubPayload) -> AppResult<()> {
        let sender = self.resolve_sender(payload)?;
        let data = payload.message.decoded_data()?;
        debug!(
            message_id = %payload.message_id(),
            %sender,
            bytes = data.len(),
            "Routing delivery"
        );
        self.fanout
            .dispatch(sender, &data)
            .await
            .map_err(|e| e.context(format!("failed to handle {sender}")))
    }
}

#[async_trait]
impl MessageHandler for TopicRouter {
    async fn handle(&self, payload: &PubSubPayload) -> AppResult<()> {
        self.route(payload).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use engagement_core::Flavour;
    use engagement_core::config::NotificationsConfig;
    use engagement_core::error::ErrorKind;
    use engagement_database::{FeedRepository, InMemoryFeedRepository};
    use engagement_entity::envelope::{EnvelopePayload, NotificationEnvelope};
    use engagement_pubsub::{InMemoryBus, PubSubMessage};

    use super::*;
    use crate::channels::{Channels, LoggingMailChannel, LoggingPushChannel, StaticProfileDirectory};
    use crate::fanout::sender::{ItemSender, NudgeSender};
    use crate::fixtures;

    fn router() -> (TopicRouter, Arc<InMemoryFeedRepository>) {
        let namer = TopicNamer::new("engagement", "test", "v1");
        let repository = Arc::new(InMemoryFeedRepository::new());
        let channels = Channels {
            push: Arc::new(LoggingPushChannel::new()),
            mail: Arc::new(LoggingMailChannel::new()),
            profiles: Arc::new(StaticProfileDirectory::new()),
        };
        let fanout = FanoutService::new(
            repository.clone(),
            Arc::new(InMemoryBus::new(namer.clone())),
            channels,
            NotificationsConfig::default(),
        );
        (TopicRouter::new(namer, Arc::new(fanout)), repository)
    }

    fn delivery(subscription: &str, topic: Option<&str>, data: &[u8]) -> PubSubPayload {
        let mut message = PubSubMessage::new(topic.unwrap_or_default(), data, HashMap::new());
        if topic.is_none() {
            message.attributes.clear();
        }
        PubSubPayload {
            subscription: subscription.to_string(),
            message,
        }
    }

    #[test]
    fn test_sender_from_topic_attribute() {
        let (router, _) = router();
        let payload = delivery("", Some("engagement-item-publish-test-v1"), b"{}");
        assert_eq!(
            router.resolve_sender(&payload).unwrap(),
            Sender::Item(ItemSender::Published)
        );
    }

    #[test]
    fn test_sender_falls_back_to_subscription() {
        let (router, _) = router();
        let payload = delivery("engagement-nudge-resolve-test-v1-subscription", None, b"{}");
        assert_eq!(
            router.resolve_sender(&payload).unwrap(),
            Sender::Nudge(NudgeSender::Resolved)
        );
    }

    #[test]
    fn test_unknown_sender_rejected() {
        let (router, _) = router();
        let payload = delivery("projects/x/subscriptions/other", Some("other-topic"), b"{}");
        let err = router.resolve_sender(&payload).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedSender);
    }

    #[tokio::test]
    async fn test_published_item_delivery_saves_label() {
        let (router, repository) = router();
        let envelope = NotificationEnvelope::new(
            "user-1",
            Flavour::Consumer,
            EnvelopePayload::Item(fixtures::item("i-1")),
            HashMap::new(),
        );
        let payload = delivery(
            "",
            Some("engagement-item-publish-test-v1"),
            &envelope.to_bytes().unwrap(),
        );

        router.handle(&payload).await.unwrap();

        assert_eq!(
            repository.labels("user-1", Flavour::Consumer).await.unwrap(),
            vec!["RESULTS".to_string()]
        );
    }

    #[tokio::test]
    async fn test_malformed_data_is_an_error() {
        let (router, _) = router();
        let payload = delivery("", Some("engagement-item-publish-test-v1"), b"not json");
        let err = router.handle(&payload).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Serialization);
        assert!(err.message.starts_with("failed to handle ITEM_PUBLISHED"));
    }
}
