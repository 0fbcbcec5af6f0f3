//! FCM push payloads.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Tray notification block of a push.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirebaseSimpleNotification {
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub body: String,
    /// Image shown with the notification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Extra string data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<HashMap<String, String>>,
}

/// A push request addressed to a set of device tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationPayload {
    /// Device registration tokens.
    pub registration_tokens: Vec<String>,
    /// Data message; the fan-out engine keys the envelope by sender name.
    #[serde(default)]
    pub data: HashMap<String, String>,
    /// Optional tray notification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification: Option<FirebaseSimpleNotification>,
}
