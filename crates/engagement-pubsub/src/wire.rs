//! Push wire payload exchanged with the bus.

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use engagement_core::error::AppError;
use engagement_core::result::AppResult;

/// Attribute carrying the deployed topic name.
pub const TOPIC_ID_ATTRIBUTE: &str = "topicID";

/// Attribute carrying the sender of a direct push.
pub const SENDER_ATTRIBUTE: &str = "sender";

/// A single bus message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PubSubMessage {
    /// Bus-assigned message id.
    #[serde(rename = "messageId", alias = "message_id", default)]
    pub message_id: String,
    /// Base64-encoded body.
    #[serde(default)]
    pub data: String,
    /// String attributes.
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    /// When the bus accepted the message.
    #[serde(
        rename = "publishTime",
        alias = "publish_time",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub publish_time: Option<DateTime<Utc>>,
}

impl PubSubMessage {
    /// Build a message for `topic`, encoding `data` as base64.
    pub fn new(topic: &str, data: &[u8], mut attributes: HashMap<String, String>) -> Self {
        attributes.insert(TOPIC_ID_ATTRIBUTE.to_string(), topic.to_string());
        Self {
            message_id: Uuid::new_v4().to_string(),
            data: STANDARD.encode(data),
            attributes,
            publish_time: Some(Utc::now()),
        }
    }

    /// Decode the base64 body.
    pub fn decoded_data(&self) -> AppResult<Vec<u8>> {
        STANDARD
            .decode(self.data.as_bytes())
            .map_err(|e| AppError::from(e).context("failed to decode pub/sub message data"))
    }

    /// Deployed topic name, when the publisher set it.
    pub fn topic_id(&self) -> Option<&str> {
        self.attributes.get(TOPIC_ID_ATTRIBUTE).map(String::as_str)
    }
}

/// Body of a push delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PubSubPayload {
    /// Subscription the message was delivered on.
    #[serde(default)]
    pub subscription: String,
    /// The message.
    pub message: PubSubMessage,
}

impl PubSubPayload {
    /// Identifier used in logs.
    pub fn message_id(&self) -> &str {
        &self.message.message_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_body_decodes() {
        let body = serde_json::json!({
            "subscription": "engagement-item-publish-development-v1-subscription",
            "message": {
                "messageId": "42",
                "data": STANDARD.encode(b"{\"hello\":1}"),
                "attributes": {"topicID": "engagement-item-publish-development-v1"}
            }
        });
        let payload: PubSubPayload = serde_json::from_value(body).unwrap();
        assert_eq!(payload.message_id(), "42");
        assert_eq!(
            payload.message.topic_id(),
            Some("engagement-item-publish-development-v1")
        );
        assert_eq!(payload.message.decoded_data().unwrap(), b"{\"hello\":1}");
    }

    #[test]
    fn test_invalid_base64_is_serialization_error() {
        let message = PubSubMessage {
            message_id: "1".to_string(),
            data: "%%%".to_string(),
            attributes: HashMap::new(),
            publish_time: None,
        };
        let err = message.decoded_data().unwrap_err();
        assert_eq!(err.kind, engagement_core::error::ErrorKind::Serialization);
    }

    #[test]
    fn test_new_sets_topic_attribute() {
        let message = PubSubMessage::new("topic-a", b"x", HashMap::new());
        assert_eq!(message.topic_id(), Some("topic-a"));
        assert!(!message.message_id.is_empty());
    }
}
