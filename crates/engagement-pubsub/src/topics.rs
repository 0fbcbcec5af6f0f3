//! Logical topic catalogue and namespacing.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use engagement_core::config::PubSubConfig;
use engagement_core::error::AppError;

/// Every topic the engagement service publishes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopicId {
    FeedRetrieval,
    ThinFeedRetrieval,
    ItemRetrieval,
    ItemPublish,
    ItemDelete,
    ItemResolve,
    ItemUnresolve,
    ItemHide,
    ItemShow,
    ItemPin,
    ItemUnpin,
    NudgeRetrieval,
    NudgePublish,
    NudgeDelete,
    NudgeResolve,
    NudgeUnresolve,
    NudgeHide,
    NudgeShow,
    ActionRetrieval,
    ActionPublish,
    ActionDelete,
    MessagePost,
    MessageDelete,
    IncomingEvent,
    SendNotification,
    SendEmail,
}

impl TopicId {
    /// The full catalogue.
    pub const ALL: [TopicId; 26] = [
        Self::FeedRetrieval,
        Self::ThinFeedRetrieval,
        Self::ItemRetrieval,
        Self::ItemPublish,
        Self::ItemDelete,
        Self::ItemResolve,
        Self::ItemUnresolve,
        Self::ItemHide,
        Self::ItemShow,
        Self::ItemPin,
        Self::ItemUnpin,
        Self::NudgeRetrieval,
        Self::NudgePublish,
        Self::NudgeDelete,
        Self::NudgeResolve,
        Self::NudgeUnresolve,
        Self::NudgeHide,
        Self::NudgeShow,
        Self::ActionRetrieval,
        Self::ActionPublish,
        Self::ActionDelete,
        Self::MessagePost,
        Self::MessageDelete,
        Self::IncomingEvent,
        Self::SendNotification,
        Self::SendEmail,
    ];

    /// Logical (un-namespaced) topic name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FeedRetrieval => "feed-retrieval",
            Self::ThinFeedRetrieval => "thin-feed-retrieval",
            Self::ItemRetrieval => "item-retrieval",
            Self::ItemPublish => "item-publish",
            Self::ItemDelete => "item-delete",
            Self::ItemResolve => "item-resolve",
            Self::ItemUnresolve => "item-unresolve",
            Self::ItemHide => "item-hide",
            Self::ItemShow => "item-show",
            Self::ItemPin => "item-pin",
            Self::ItemUnpin => "item-unpin",
            Self::NudgeRetrieval => "nudge-retrieval",
            Self::NudgePublish => "nudge-publish",
            Self::NudgeDelete => "nudge-delete",
            Self::NudgeResolve => "nudge-resolve",
            Self::NudgeUnresolve => "nudge-unresolve",
            Self::NudgeHide => "nudge-hide",
            Self::NudgeShow => "nudge-show",
            Self::ActionRetrieval => "action-retrieval",
            Self::ActionPublish => "action-publish",
            Self::ActionDelete => "action-delete",
            Self::MessagePost => "message-post",
            Self::MessageDelete => "message-delete",
            Self::IncomingEvent => "incoming-event",
            Self::SendNotification => "send-notification",
            Self::SendEmail => "send-email",
        }
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TopicId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| AppError::unexpected_sender(format!("unknown topic '{s}'")))
    }
}

/// Dead-letter topic for an already namespaced topic.
pub fn dead_letter_topic(namespaced: &str) -> String {
    format!("{namespaced}-dead-letter")
}

/// Maps logical topics to their deployed names and back.
///
/// A deployed topic is `{service}-{topic}-{environment}-{version}`, its
/// subscription `{deployed}-subscription`.
#[derive(Debug, Clone)]
pub struct TopicNamer {
    service: String,
    environment: String,
    version: String,
    by_topic: HashMap<String, TopicId>,
    by_subscription: HashMap<String, TopicId>,
}

impl TopicNamer {
    /// Create a namer for the given namespace components.
    pub fn new(
        service: impl Into<String>,
        environment: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        let mut namer = Self {
            service: service.into(),
            environment: environment.into(),
            version: version.into(),
            by_topic: HashMap::new(),
            by_subscription: HashMap::new(),
        };
        for topic in TopicId::ALL {
            namer.by_topic.insert(namer.namespaced(topic), topic);
            namer.by_subscription.insert(namer.subscription_id(topic), topic);
        }
        namer
    }

    /// Create a namer from the pub/sub configuration section.
    pub fn from_config(config: &PubSubConfig) -> Self {
        Self::new(&config.service_name, &config.environment, &config.version)
    }

    /// Deployed name of `topic`.
    pub fn namespaced(&self, topic: TopicId) -> String {
        format!(
            "{}-{}-{}-{}",
            self.service, topic, self.environment, self.version
        )
    }

    /// Subscription id for `topic`.
    pub fn subscription_id(&self, topic: TopicId) -> String {
        format!("{}-subscription", self.namespaced(topic))
    }

    /// Dead-letter topic for `topic`.
    pub fn dead_letter(&self, topic: TopicId) -> String {
        dead_letter_topic(&self.namespaced(topic))
    }

    /// Every deployed topic name.
    pub fn topic_ids(&self) -> Vec<String> {
        TopicId::ALL.iter().map(|t| self.namespaced(*t)).collect()
    }

    /// Deployed topic name to subscription id.
    pub fn subscription_ids(&self) -> HashMap<String, String> {
        TopicId::ALL
            .iter()
            .map(|t| (self.namespaced(*t), self.subscription_id(*t)))
            .collect()
    }

    /// Subscription id to deployed topic name.
    pub fn reverse_subscription_ids(&self) -> HashMap<String, String> {
        TopicId::ALL
            .iter()
            .map(|t| (self.subscription_id(*t), self.namespaced(*t)))
            .collect()
    }

    /// Logical topic behind a deployed topic name.
    pub fn resolve_topic(&self, namespaced: &str) -> Option<TopicId> {
        self.by_topic.get(namespaced).copied()
    }

    /// Logical topic behind a subscription id.
    pub fn resolve_subscription(&self, subscription: &str) -> Option<TopicId> {
        self.by_subscription.get(subscription).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn namer() -> TopicNamer {
        TopicNamer::new("engagement", "staging", "v2")
    }

    #[test]
    fn test_namespacing() {
        let namer = namer();
        assert_eq!(
            namer.namespaced(TopicId::ItemPublish),
            "engagement-item-publish-staging-v2"
        );
        assert_eq!(
            namer.subscription_id(TopicId::ItemPublish),
            "engagement-item-publish-staging-v2-subscription"
        );
        assert_eq!(
            namer.dead_letter(TopicId::NudgeHide),
            "engagement-nudge-hide-staging-v2-dead-letter"
        );
    }

    #[test]
    fn test_reverse_lookups() {
        let namer = namer();
        for topic in TopicId::ALL {
            assert_eq!(namer.resolve_topic(&namer.namespaced(topic)), Some(topic));
            assert_eq!(
                namer.resolve_subscription(&namer.subscription_id(topic)),
                Some(topic)
            );
        }
        assert_eq!(namer.resolve_topic("engagement-item-publish-prod-v2"), None);
    }

    #[test]
    fn test_subscription_maps_are_inverse() {
        let namer = namer();
        let forward = namer.subscription_ids();
        let reverse = namer.reverse_subscription_ids();
        assert_eq!(forward.len(), TopicId::ALL.len());
        for (topic, subscription) in &forward {
            assert_eq!(reverse.get(subscription), Some(topic));
        }
    }

    #[test]
    fn test_logical_name_parsing() {
        assert_eq!("message-post".parse::<TopicId>().unwrap(), TopicId::MessagePost);
        let err = "item-archive".parse::<TopicId>().unwrap_err();
        assert_eq!(err.kind, engagement_core::error::ErrorKind::UnexpectedSender);
    }
}
