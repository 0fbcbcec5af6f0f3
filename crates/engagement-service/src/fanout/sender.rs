//! Senders: what produced a bus message.

use std::fmt;

use engagement_pubsub::TopicId;

/// Item lifecycle senders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemSender {
    Published,
    Deleted,
    Resolved,
    Unresolved,
    Hidden,
    Shown,
    Pinned,
    Unpinned,
}

impl ItemSender {
    /// Wire name used as the FCM data key.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Published => "ITEM_PUBLISHED",
            Self::Deleted => "ITEM_DELETED",
            Self::Resolved => "ITEM_RESOLVED",
            Self::Unresolved => "ITEM_UNRESOLVED",
            Self::Hidden => "ITEM_HIDDEN",
            Self::Shown => "ITEM_SHOWN",
            Self::Pinned => "ITEM_PINNED",
            Self::Unpinned => "ITEM_UNPINNED",
        }
    }

    /// Whether pushes for this sender carry a tray notification.
    pub fn include_notification(self) -> bool {
        matches!(self, Self::Published)
    }
}

/// Nudge lifecycle senders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NudgeSender {
    Published,
    Deleted,
    Resolved,
    Unresolved,
    Hidden,
    Shown,
}

impl NudgeSender {
    /// Wire name used as the FCM data key.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Published => "NUDGE_PUBLISHED",
            Self::Deleted => "NUDGE_DELETED",
            Self::Resolved => "NUDGE_RESOLVED",
            Self::Unresolved => "NUDGE_UNRESOLVED",
            Self::Hidden => "NUDGE_HIDDEN",
            Self::Shown => "NUDGE_SHOWN",
        }
    }
}

/// Global action senders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionSender {
    Published,
    Deleted,
}

/// Conversation senders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSender {
    Posted,
    Deleted,
}

/// Read senders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalSender {
    Feed,
    ThinFeed,
    Item,
    Nudge,
    Action,
}

/// Every sender the fan-out engine handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    Item(ItemSender),
    Nudge(NudgeSender),
    Action(ActionSender),
    Message(MessageSender),
    Retrieval(RetrievalSender),
    IncomingEvent,
    SendNotification,
    SendEmail,
}

impl Sender {
    /// Wire name of the sender.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Item(s) => s.as_str(),
            Self::Nudge(s) => s.as_str(),
            Self::Action(ActionSender::Published) => "ACTION_PUBLISHED",
            Self::Action(ActionSender::Deleted) => "ACTION_DELETED",
            Self::Message(MessageSender::Posted) => "MESSAGE_POSTED",
            Self::Message(MessageSender::Deleted) => "MESSAGE_DELETED",
            Self::Retrieval(RetrievalSender::Feed) => "FEED_RETRIEVED",
            Self::Retrieval(RetrievalSender::ThinFeed) => "THIN_FEED_RETRIEVED",
            Self::Retrieval(RetrievalSender::Item) => "ITEM_RETRIEVED",
            Self::Retrieval(RetrievalSender::Nudge) => "NUDGE_RETRIEVED",
            Self::Retrieval(RetrievalSender::Action) => "ACTION_RETRIEVED",
            Self::IncomingEvent => "INCOMING_EVENT",
            Self::SendNotification => "SEND_NOTIFICATION",
            Self::SendEmail => "SEND_EMAIL",
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<TopicId> for Sender {
    fn from(topic: TopicId) -> Self {
        match topic {
            TopicId::FeedRetrieval => Self::Retrieval(RetrievalSender::Feed),
            TopicId::ThinFeedRetrieval => Self::Retrieval(RetrievalSender::ThinFeed),
            TopicId::ItemRetrieval => Self::Retrieval(RetrievalSender::Item),
            TopicId::NudgeRetrieval => Self::Retrieval(RetrievalSender::Nudge),
            TopicId::ActionRetrieval => Self::Retrieval(RetrievalSender::Action),
            TopicId::ItemPublish => Self::Item(ItemSender::Published),
            TopicId::ItemDelete => Self::Item(ItemSender::Deleted),
            TopicId::ItemResolve => Self::Item(ItemSender::Resolved),
            TopicId::ItemUnresolve => Self::Item(ItemSender::Unresolved),
            TopicId::ItemHide => Self::Item(ItemSender::Hidden),
            TopicId::ItemShow => Self::Item(ItemSender::Shown),
            TopicId::ItemPin => Self::Item(ItemSender::Pinned),
            TopicId::ItemUnpin => Self::Item(ItemSender::Unpinned),
            TopicId::NudgePublish => Self::Nudge(NudgeSender::Published),
            TopicId::NudgeDelete => Self::Nudge(NudgeSender::Deleted),
            TopicId::NudgeResolve => Self::Nudge(NudgeSender::Resolved),
            TopicId::NudgeUnresolve => Self::Nudge(NudgeSender::Unresolved),
            TopicId::NudgeHide => Self::Nudge(NudgeSender::Hidden),
            TopicId::NudgeShow => Self::Nudge(NudgeSender::Shown),
            TopicId::ActionPublish => Self::Action(ActionSender::Published),
            TopicId::ActionDelete => Self::Action(ActionSender::Deleted),
            TopicId::MessagePost => Self::Message(MessageSender::Posted),
            TopicId::MessageDelete => Self::Message(MessageSender::Deleted),
            TopicId::IncomingEvent => Self::IncomingEvent,
            TopicId::SendNotification => Self::SendNotification,
            TopicId::SendEmail => Self::SendEmail,
        }
    }
}
