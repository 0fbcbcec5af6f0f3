//! Conversation message entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A conversation entry attached to an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Message identifier; assigned on post when blank.
    #[serde(default)]
    #[validate(length(min = 1, message = "message id is required"))]
    pub id: String,
    /// Monotonic version; assigned on post when zero.
    #[serde(default)]
    #[validate(range(min = 1, message = "message sequence number must be set"))]
    pub sequence_number: i64,
    /// Message body.
    #[validate(length(min = 1, message = "message text is required"))]
    pub text: String,
    /// Id of the message this one answers (lookup only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    /// Author uid.
    #[validate(length(min = 1, message = "message author uid is required"))]
    pub posted_by_uid: String,
    /// Author display name.
    #[validate(length(min = 1, message = "message author name is required"))]
    pub posted_by_name: String,
    /// When the message was posted; assigned on post when absent.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}
