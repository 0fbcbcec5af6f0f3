//! Notification envelope with a typed payload.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use engagement_core::Flavour;
use engagement_core::error::AppError;
use engagement_core::result::AppResult;

use crate::feed::{Action, Event, Feed, Item, Message, Nudge};

/// Keys used in [`NotificationEnvelope::metadata`].
pub mod metadata_keys {
    /// Id of the item the envelope refers to.
    pub const ITEM_ID: &str = "itemID";
    /// Id of the nudge the envelope refers to.
    pub const NUDGE_ID: &str = "nudgeID";
    /// Id of the action the envelope refers to.
    pub const ACTION_ID: &str = "actionID";
    /// Id of the message the envelope refers to.
    pub const MESSAGE_ID: &str = "messageID";
    /// Id of the event the envelope refers to.
    pub const EVENT_ID: &str = "eventID";
}

/// The domain entity carried by an envelope, tagged with its kind so that
/// consumers decode it once at the boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnvelopePayload {
    /// A hydrated feed.
    Feed(Feed),
    /// A feed item.
    Item(Item),
    /// A nudge.
    Nudge(Nudge),
    /// A global action.
    Action(Action),
    /// A conversation message.
    Message(Message),
    /// An incoming event.
    Event(Event),
    /// A recomputed unread counter.
    UnreadCount(i64),
}

impl EnvelopePayload {
    /// Wire name of the payload kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Feed(_) => "FEED",
            Self::Item(_) => "ITEM",
            Self::Nudge(_) => "NUDGE",
            Self::Action(_) => "ACTION",
            Self::Message(_) => "MESSAGE",
            Self::Event(_) => "EVENT",
            Self::UnreadCount(_) => "UNREAD_COUNT",
        }
    }
}

/// Wrapper published for every feed mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEnvelope {
    /// Owner uid.
    pub uid: String,
    /// Owner flavour.
    pub flavour: Flavour,
    /// The entity that changed.
    pub payload: EnvelopePayload,
    /// Auxiliary identifiers (see [`metadata_keys`]).
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl NotificationEnvelope {
    /// Create a new envelope.
    pub fn new(
        uid: impl Into<String>,
        flavour: Flavour,
        payload: EnvelopePayload,
        metadata: HashMap<String, String>,
    ) -> Self {
        Self {
            uid: uid.into(),
            flavour,
            payload,
            metadata,
        }
    }

    /// Encode as JSON bytes.
    pub fn to_bytes(&self) -> AppResult<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| AppError::from(e).context("failed to encode notification envelope"))
    }

    /// Decode from JSON bytes.
    pub fn from_bytes(bytes: &[u8]) -> AppResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| AppError::from(e).context("failed to decode notification envelope"))
    }

    /// The item carried by this envelope.
    pub fn item(&self) -> AppResult<&Item> {
        match &self.payload {
            EnvelopePayload::Item(item) => Ok(item),
            other => Err(self.unexpected("ITEM", other)),
        }
    }

    /// The nudge carried by this envelope.
    pub fn nudge(&self) -> AppResult<&Nudge> {
        match &self.payload {
            EnvelopePayload::Nudge(nudge) => Ok(nudge),
            other => Err(self.unexpected("NUDGE", other)),
        }
    }

    /// The event carried by this envelope.
    pub fn event(&self) -> AppResult<&Event> {
        match &self.payload {
            EnvelopePayload::Event(event) => Ok(event),
            other => Err(self.unexpected("EVENT", other)),
        }
    }

    fn unexpected(&self, expected: &str, got: &EnvelopePayload) -> AppError {
        AppError::serialization(format!(
            "expected {expected} payload in envelope for uid '{}', got {}",
            self.uid,
            got.kind()
        ))
    }
}
