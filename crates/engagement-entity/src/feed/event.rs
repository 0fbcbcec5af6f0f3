//! Incoming event entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use engagement_core::Flavour;

/// Who raised an event and where.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EventContext {
    /// Uid the event belongs to; backfilled from the request when blank.
    #[serde(default)]
    #[validate(length(min = 1, message = "event user id is required"))]
    pub user_id: String,
    /// Flavour the event belongs to; backfilled from the request when absent.
    #[serde(default)]
    pub flavour: Option<Flavour>,
    /// Organization the user acted in.
    #[serde(default)]
    pub organization_id: String,
    /// Location the user acted at.
    #[serde(default)]
    pub location_id: String,
    /// When the event occurred.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Opaque event data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    /// Arbitrary key/value data.
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

/// An occurrence that downstream listeners may turn into feed mutations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Event identifier; assigned on ingestion when blank.
    #[serde(default)]
    #[validate(length(min = 1, message = "event id is required"))]
    pub id: String,
    /// Event name (e.g. `BOOKING_COMPLETED`).
    #[validate(length(min = 1, message = "event name is required"))]
    pub name: String,
    /// Origin of the event.
    #[serde(default)]
    #[validate(nested)]
    pub context: EventContext,
    /// Opaque data.
    #[serde(default)]
    pub payload: EventPayload,
}
