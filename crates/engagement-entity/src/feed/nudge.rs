//! Nudge entity: a transient prompt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Toggleable;
use super::action::Action;
use super::enums::{Channel, Status, Visibility};
use super::link::Link;

/// Action names flipped by nudge state transitions.
pub mod action_names {
    /// Offered while the nudge is pending.
    pub const RESOLVE: &str = "RESOLVE_NUDGE";
    /// Offered once the nudge is done.
    pub const UNRESOLVE: &str = "UNRESOLVE_NUDGE";
    /// Offered while the nudge is shown.
    pub const HIDE: &str = "HIDE_NUDGE";
    /// Offered while the nudge is hidden.
    pub const SHOW: &str = "SHOW_NUDGE";
}

/// Push bodies used when a nudge is announced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationBody {
    /// Sent when the nudge is published.
    #[serde(default)]
    pub publish_message: String,
    /// Sent when the nudge is resolved.
    #[serde(default)]
    pub resolve_message: String,
}

/// A transient prompt shown above the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Nudge {
    /// Nudge identifier.
    #[validate(length(min = 1, message = "nudge id is required"))]
    pub id: String,
    /// Monotonic version; zero is replaced by the current Unix time on publish.
    #[serde(default)]
    #[validate(range(min = 1, message = "nudge sequence number must be set"))]
    pub sequence_number: i64,
    /// When the nudge stops being relevant.
    pub expiry: DateTime<Utc>,
    /// Completion state.
    #[serde(default)]
    pub status: Status,
    /// Whether the nudge is shown.
    #[serde(default)]
    pub visibility: Visibility,
    /// Headline.
    #[validate(length(min = 1, message = "nudge title is required"))]
    pub title: String,
    /// Body.
    #[validate(length(min = 1, message = "nudge text is required"))]
    pub text: String,
    /// Attachments.
    #[serde(default)]
    #[validate(nested)]
    pub links: Vec<Link>,
    /// Embedded affordances.
    #[serde(default)]
    #[validate(nested)]
    pub actions: Vec<Action>,
    /// Target user ids.
    #[serde(default)]
    pub users: Vec<String>,
    /// Target group ids.
    #[serde(default)]
    pub groups: Vec<String>,
    /// Channels the nudge may be announced on.
    #[serde(default)]
    pub notification_channels: Vec<Channel>,
    /// Push bodies.
    #[serde(default)]
    pub notification_body: NotificationBody,
}

impl Nudge {
    /// Whether the nudge's expiry lies before `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry < now
    }
}

impl Toggleable for Nudge {
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
