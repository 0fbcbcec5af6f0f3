//! In-process notification bus.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, warn};

use engagement_core::Flavour;
use engagement_core::error::AppError;
use engagement_core::result::AppResult;
use engagement_entity::envelope::{EnvelopePayload, NotificationEnvelope};
use engagement_entity::notification::{EmailPayload, SendNotificationPayload};

use crate::service::NotificationService;
use crate::topics::{TopicId, TopicNamer};
use crate::wire::{PubSubMessage, PubSubPayload, SENDER_ATTRIBUTE};

/// Notification bus held in process memory.
///
/// Topics and subscriptions are provisioned on construction. Every published
/// message is recorded per topic; when delivery is enabled it is also handed
/// to the [`DeliveryRunner`](crate::DeliveryRunner) through a bounded queue.
#[derive(Debug)]
pub struct InMemoryBus {
    namer: TopicNamer,
    topics: Mutex<HashSet<String>>,
    subscriptions: Mutex<HashMap<String, String>>,
    published: DashMap<String, Vec<PubSubMessage>>,
    delivery: Option<mpsc::Sender<PubSubPayload>>,
}

impl InMemoryBus {
    /// Create a bus that records messages without delivering them.
    pub fn new(namer: TopicNamer) -> Self {
        let bus = Self {
            namer,
            topics: Mutex::new(HashSet::new()),
            subscriptions: Mutex::new(HashMap::new()),
            published: DashMap::new(),
            delivery: None,
        };
        bus.ensure_topics_exist();
        bus
    }

    /// Create a bus that also queues every message for delivery.
    pub fn with_delivery(
        namer: TopicNamer,
        capacity: usize,
    ) -> (Self, mpsc::Receiver<PubSubPayload>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let mut bus = Self::new(namer);
        bus.delivery = Some(tx);
        (bus, rx)
    }

    /// The namer used by this bus.
    pub fn namer(&self) -> &TopicNamer {
        &self.namer
    }

    /// Create every catalogue topic and its subscription unless it exists.
    ///
    /// Returns the number of topics created by this call.
    pub fn ensure_topics_exist(&self) -> usize {
        let (Ok(mut topics), Ok(mut subscriptions)) =
            (self.topics.lock(), self.subscriptions.lock())
        else {
            return 0;
        };

        let mut created = 0;
        for topic in TopicId::ALL {
            let name = self.namer.namespaced(topic);
            if topics.insert(name.clone()) {
                created += 1;
                debug!(topic = %name, "Topic created");
            }
            subscriptions
                .entry(self.namer.subscription_id(topic))
                .or_insert(name);
        }
        if created > 0 {
            info!(created, "Provisioned pub/sub topics");
        }
        created
    }

    /// Messages published to `topic` so far.
    pub fn published(&self, topic: TopicId) -> Vec<PubSubMessage> {
        self.published
            .get(&self.namer.namespaced(topic))
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }

    /// Decoded envelopes published to `topic` so far.
    pub fn envelopes(&self, topic: TopicId) -> Vec<NotificationEnvelope> {
        self.published(topic)
            .iter()
            .filter_map(|m| m.decoded_data().ok())
            .filter_map(|data| NotificationEnvelope::from_bytes(&data).ok())
            .collect()
    }

    /// Total number of messages published on every topic.
    pub fn published_count(&self) -> usize {
        self.published.iter().map(|e| e.value().len()).sum()
    }

    async fn publish(
        &self,
        topic: TopicId,
        data: &[u8],
        attributes: HashMap<String, String>,
    ) -> AppResult<()> {
        let namespaced = self.namer.namespaced(topic);
        let known = self
            .topics
            .lock()
            .map(|topics| topics.contains(&namespaced))
            .unwrap_or(false);
        if !known {
            return Err(AppError::notify(format!("topic '{namespaced}' does not exist")));
        }

        let message = PubSubMessage::new(&namespaced, data, attributes);
        self.published
            .entry(namespaced.clone())
            .or_default()
            .push(message.clone());
        debug!(topic = %namespaced, message_id = %message.message_id, "Message published");

        if let Some(delivery) = &self.delivery {
            let payload = PubSubPayload {
                subscription: self.namer.subscription_id(topic),
                message,
            };
            // Handlers publish from inside the delivery runner, so a full queue
            // must never block the publisher.
            match delivery.try_send(payload) {
                Ok(()) => {}
                Err(TrySendError::Full(payload)) => {
                    debug!(topic = %namespaced, "Delivery queue full, deferring message");
                    let delivery = delivery.clone();
                    tokio::spawn(async move {
                        if delivery.send(payload).await.is_err() {
                            warn!(
                                topic = %namespaced,
                                "Delivery queue closed, deferred message dropped"
                            );
                        }
                    });
                }
                Err(TrySendError::Closed(_)) => {
                    return Err(AppError::notify(format!(
                        "delivery queue for '{namespaced}' is closed"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationService for InMemoryBus {
    async fn notify(
        &self,
        topic: TopicId,
        uid: &str,
        flavour: Flavour,
        payload: EnvelopePayload,
        metadata: HashMap<String, String>,
    ) -> AppResult<()> {
        let envelope = NotificationEnvelope::new(uid, flavour, payload, metadata);
        let data = envelope.to_bytes()?;
        self.publish(topic, &data, HashMap::new())
            .await
            .map_err(|e| e.context(format!("failed to notify {topic}")))
    }

    fn topic_ids(&self) -> Vec<String> {
        self.namer.topic_ids()
    }

    fn subscription_ids(&self) -> HashMap<String, String> {
        self.namer.subscription_ids()
    }

    fn reverse_subscription_ids(&self) -> HashMap<String, String> {
        self.namer.reverse_subscription_ids()
    }

    async fn push(&self, sender: &str, payload: SendNotificationPayload) -> AppResult<()> {
        let data = serde_json::to_vec(&payload)?;
        let attributes = HashMap::from([(SENDER_ATTRIBUTE.to_string(), sender.to_string())]);
        self.publish(TopicId::SendNotification, &data, attributes)
            .await
            .map_err(|e| e.context("failed to queue push"))
    }

    async fn email(&self, payload: EmailPayload) -> AppResult<()> {
        let data = serde_json::to_vec(&payload)?;
        self.publish(TopicId::SendEmail, &data, HashMap::new())
            .await
            .map_err(|e| e.context("failed to queue email"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bus() -> InMemoryBus {
        InMemoryBus::new(TopicNamer::new("engagement", "test", "v1"))
    }

    #[test]
    fn test_provisioning_is_idempotent() {
        let bus = bus();
        assert_eq!(bus.ensure_topics_exist(), 0);
        assert_eq!(bus.topic_ids().len(), TopicId::ALL.len());
    }

    #[tokio::test]
    async fn test_notify_records_envelope() {
        let bus = bus();
        bus.notify(
            TopicId::ItemPublish,
            "user-1",
            Flavour::Consumer,
            EnvelopePayload::UnreadCount(2),
            HashMap::from([("itemID".to_string(), "i-1".to_string())]),
        )
        .await
        .unwrap();

        let messages = bus.published(TopicId::ItemPublish);
        assert_eq!(messages.len(), 1);
        assert_eq!(
            messages[0].topic_id(),
            Some("engagement-item-publish-test-v1")
        );

        let envelopes = bus.envelopes(TopicId::ItemPublish);
        assert_eq!(envelopes[0].uid, "user-1");
        assert_eq!(envelopes[0].metadata["itemID"], "i-1");
        assert!(bus.published(TopicId::ItemDelete).is_empty());
    }

    #[tokio::test]
    async fn test_delivery_queue_receives_messages() {
        let (bus, mut rx) =
            InMemoryBus::with_delivery(TopicNamer::new("engagement", "test", "v1"), 4);
        bus.push(
            "ITEM_PUBLISHED",
            SendNotificationPayload {
                registration_tokens: vec!["token-1".to_string()],
                data: HashMap::new(),
                notification: None,
            },
        )
        .await
        .unwrap();

        let delivered = rx.recv().await.unwrap();
        assert_eq!(
            delivered.subscription,
            "engagement-send-notification-test-v1-subscription"
        );
        assert_eq!(delivered.message.attributes[SENDER_ATTRIBUTE], "ITEM_PUBLISHED");
    }

    #[tokio::test]
    async fn test_full_delivery_queue_does_not_block_publisher() {
        let (bus, mut rx) =
            InMemoryBus::with_delivery(TopicNamer::new("engagement", "test", "v1"), 1);
        for uid in ["user-1", "user-2", "user-3"] {
            bus.notify(
                TopicId::ItemPublish,
                uid,
                Flavour::Consumer,
                EnvelopePayload::UnreadCount(1),
                HashMap::new(),
            )
            .await
            .unwrap();
        }
        assert_eq!(bus.published(TopicId::ItemPublish).len(), 3);

        let mut delivered = 0;
        while delivered < 3 {
            rx.recv().await.unwrap();
            delivered += 1;
        }
    }

    #[tokio::test]
    async fn test_closed_delivery_queue_fails_notify() {
        let (bus, rx) = InMemoryBus::with_delivery(TopicNamer::new("engagement", "test", "v1"), 1);
        drop(rx);
        let err = bus
            .notify(
                TopicId::FeedRetrieval,
                "user-1",
                Flavour::Pro,
                EnvelopePayload::UnreadCount(0),
                HashMap::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, engagement_core::error::ErrorKind::Notify);
    }
}
