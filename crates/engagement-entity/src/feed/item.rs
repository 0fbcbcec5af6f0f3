//! Feed item entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Toggleable;
use super::action::Action;
use super::enums::{Channel, Status, TextType, Visibility};
use super::link::Link;
use super::message::Message;

/// Action names flipped by item state transitions.
pub mod action_names {
    /// Offered while the item is pending.
    pub const RESOLVE: &str = "RESOLVE_ITEM";
    /// Offered once the item is done.
    pub const UNRESOLVE: &str = "UNRESOLVE_ITEM";
    /// Offered while the item is not persistent.
    pub const PIN: &str = "PIN_ITEM";
    /// Offered while the item is persistent.
    pub const UNPIN: &str = "UNPIN_ITEM";
    /// Offered while the item is shown.
    pub const HIDE: &str = "HIDE_ITEM";
    /// Offered while the item is hidden.
    pub const SHOW: &str = "SHOW_ITEM";
}

/// A feed entry, unique per `(uid, flavour, id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Item identifier.
    #[validate(length(min = 1, message = "item id is required"))]
    pub id: String,
    /// Monotonic version; zero is replaced by the current Unix time on publish.
    #[serde(default)]
    #[validate(range(min = 1, message = "item sequence number must be set"))]
    pub sequence_number: i64,
    /// When the item stops being relevant.
    pub expiry: DateTime<Utc>,
    /// Pinned to the top of the feed and counted in the inbox.
    #[serde(default)]
    pub persistent: bool,
    /// Completion state.
    #[serde(default)]
    pub status: Status,
    /// Whether the item is shown.
    #[serde(default)]
    pub visibility: Visibility,
    /// Item icon.
    #[validate(nested)]
    pub icon: Link,
    /// Display author.
    #[validate(length(min = 1, message = "item author is required"))]
    pub author: String,
    /// One-line headline.
    #[validate(length(min = 1, message = "item tagline is required"))]
    pub tagline: String,
    /// Grouping label used by feed filters.
    #[validate(length(min = 1, message = "item label is required"))]
    pub label: String,
    /// Short summary.
    #[validate(length(min = 1, message = "item summary is required"))]
    pub summary: String,
    /// Full body.
    #[validate(length(min = 1, message = "item text is required"))]
    pub text: String,
    /// Markup of `text`.
    #[serde(default)]
    pub text_type: TextType,
    /// Attachments.
    #[serde(default)]
    #[validate(nested)]
    pub links: Vec<Link>,
    /// Embedded affordances.
    #[serde(default)]
    #[validate(nested)]
    pub actions: Vec<Action>,
    /// Conversation thread.
    #[serde(default)]
    #[validate(nested)]
    pub conversations: Vec<Message>,
    /// Target user ids.
    #[serde(default)]
    pub users: Vec<String>,
    /// Target group ids.
    #[serde(default)]
    pub groups: Vec<String>,
    /// Channels the item may be announced on.
    #[serde(default)]
    pub notification_channels: Vec<Channel>,
}

impl Item {
    /// Whether the item's expiry lies before `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry < now
    }

    /// Whether the item counts towards the unread inbox counter.
    pub fn is_unread_persistent(&self) -> bool {
        self.persistent && self.status != Status::Done && self.visibility == Visibility::Show
    }
}

impl Toggleable for Item {
    fn id(&self) -> &str {
        &self.id
    }

    fn sequence_number(&self) -> i64 {
        self.sequence_number
    }

    fn sequence_number_mut(&mut self) -> &mut i64 {
        &mut self.sequence_number
    }

    fn actions_mut(&mut self) -> &mut Vec<Action> {
        &mut self.actions
    }
}
