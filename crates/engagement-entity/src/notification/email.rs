//! Email payloads.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// An email handed to the mail channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct EmailPayload {
    /// Recipient addresses.
    #[validate(length(min = 1, message = "at least one recipient is required"))]
    pub to: Vec<String>,
    /// Subject line.
    #[validate(length(min = 1, message = "email subject is required"))]
    pub subject: String,
    /// Plain-text body.
    #[serde(default)]
    pub text: String,
    /// Optional HTML body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}
