//! Computed feed view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use engagement_core::Flavour;

use super::action::Action;
use super::item::Item;
use super::nudge::Nudge;

/// The aggregate a client renders. Rebuilt on every read, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feed {
    /// Deterministic identifier derived from `(uid, flavour)`.
    pub id: String,
    /// Read time as a Unix timestamp.
    pub sequence_number: i64,
    /// Owner uid.
    pub uid: String,
    /// Owner flavour.
    pub flavour: Flavour,
    /// Global actions.
    #[serde(default)]
    pub actions: Vec<Action>,
    /// Items.
    #[serde(default)]
    pub items: Vec<Item>,
    /// Nudges.
    #[serde(default)]
    pub nudges: Vec<Nudge>,
    /// Whether the reader is anonymous.
    #[serde(default)]
    pub is_anonymous: bool,
}

impl Feed {
    /// Derive the feed id for `(uid, flavour)`.
    pub fn derive_id(uid: &str, flavour: Flavour) -> String {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("{uid}|{flavour}").as_bytes()).to_string()
    }

    /// Build a feed carrying only identity fields.
    pub fn thin(uid: &str, flavour: Flavour, is_anonymous: bool, now: DateTime<Utc>) -> Self {
        Self {
            id: Self::derive_id(uid, flavour),
            sequence_number: now.timestamp(),
            uid: uid.to_string(),
            flavour,
            actions: Vec::new(),
            items: Vec::new(),
            nudges: Vec::new(),
            is_anonymous,
        }
    }
}
