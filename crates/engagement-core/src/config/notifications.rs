//! Fan-out engine configuration.

use serde::{Deserialize, Serialize};

/// Controls how feed mutations are turned into user-facing notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Image attached to push notifications built from feed items and nudges.
    #[serde(default = "default_icon_url")]
    pub default_icon_url: String,
    /// Push notification bodies are truncated to this many characters.
    #[serde(default = "default_max_body_length")]
    pub max_body_length: usize,
    /// Push the recomputed unread counter to the user's devices.
    #[serde(default)]
    pub inbox_count_push_enabled: bool,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            default_icon_url: default_icon_url(),
            max_body_length: default_max_body_length(),
            inbox_count_push_enabled: false,
        }
    }
}

fn default_icon_url() -> String {
    "https://assets.example.com/engagement/default-icon.png".to_string()
}

fn default_max_body_length() -> usize {
    140
}
