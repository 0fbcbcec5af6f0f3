//! Action entity: a user-invocable affordance.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::enums::{ActionType, Handling};
use super::link::Link;

/// An affordance rendered on an item, a nudge, or the feed itself.
///
/// The `name` drives the toggle protocol: after a state transition the
/// action is renamed to its semantic inverse (e.g. `RESOLVE_ITEM` becomes
/// `UNRESOLVE_ITEM`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    /// Action identifier.
    #[validate(length(min = 1, message = "action id is required"))]
    pub id: String,
    /// Monotonic version of the action.
    #[serde(default)]
    #[validate(range(min = 1, message = "action sequence number must be set"))]
    pub sequence_number: i64,
    /// Identifier the client dispatches on.
    #[validate(length(min = 1, message = "action name is required"))]
    pub name: String,
    /// Icon shown on the affordance.
    #[validate(nested)]
    pub icon: Link,
    /// Placement.
    #[serde(default)]
    pub action_type: ActionType,
    /// Client handling mode.
    #[serde(default)]
    pub handling: Handling,
    /// Whether anonymous users may invoke it.
    #[serde(default)]
    pub allow_anonymous: bool,
}

impl Action {
    /// Whether the action may only appear at the global feed scope.
    pub fn is_floating(&self) -> bool {
        self.action_type == ActionType::Floating
    }
}
