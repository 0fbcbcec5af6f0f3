//! Persistence contract for feed documents.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use engagement_core::Flavour;
use engagement_core::result::AppResult;
use engagement_entity::feed::{Action, Event, FeedFilter, Item, Message, Nudge};

/// Storage for everything scoped to a `(uid, flavour)` feed.
///
/// Saves are upserts: the stored document is replaced only when the incoming
/// sequence number is strictly greater, otherwise the stored document is
/// returned unchanged. Replaying a publish is therefore a no-op.
///
/// Updates replace an existing document unconditionally, so the last writer
/// wins. Updating a document that no longer exists is a `NotFound` error.
///
/// Deletes are idempotent: deleting an absent document succeeds.
#[async_trait]
pub trait FeedRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Items of a feed that pass `filter` at `now`.
    async fn get_feed_items(
        &self,
        uid: &str,
        flavour: Flavour,
        filter: &FeedFilter,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Item>>;

    /// Nudges of a feed that pass `filter` at `now`.
    async fn get_nudges(
        &self,
        uid: &str,
        flavour: Flavour,
        filter: &FeedFilter,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Nudge>>;

    /// Global actions of a feed.
    async fn get_actions(&self, uid: &str, flavour: Flavour) -> AppResult<Vec<Action>>;

    /// Fetch a single item.
    async fn get_feed_item(&self, uid: &str, flavour: Flavour, id: &str)
    -> AppResult<Option<Item>>;

    /// Insert or replace an item.
    async fn save_feed_item(&self, uid: &str, flavour: Flavour, item: Item) -> AppResult<Item>;

    /// Replace an item after a state transition.
    async fn update_feed_item(&self, uid: &str, flavour: Flavour, item: Item) -> AppResult<Item>;

    /// Delete an item.
    async fn delete_feed_item(&self, uid: &str, flavour: Flavour, id: &str) -> AppResult<()>;

    /// Fetch a single nudge.
    async fn get_nudge(&self, uid: &str, flavour: Flavour, id: &str) -> AppResult<Option<Nudge>>;

    /// Insert or replace a nudge.
    async fn save_nudge(&self, uid: &str, flavour: Flavour, nudge: Nudge) -> AppResult<Nudge>;

    /// Replace a nudge after a state transition.
    async fn update_nudge(&self, uid: &str, flavour: Flavour, nudge: Nudge) -> AppResult<Nudge>;

    /// Delete a nudge.
    async fn delete_nudge(&self, uid: &str, flavour: Flavour, id: &str) -> AppResult<()>;

    /// Fetch a single global action.
    async fn get_action(&self, uid: &str, flavour: Flavour, id: &str)
    -> AppResult<Option<Action>>;

    /// Insert or replace a global action.
    async fn save_action(&self, uid: &str, flavour: Flavour, action: Action) -> AppResult<Action>;

    /// Delete a global action.
    async fn delete_action(&self, uid: &str, flavour: Flavour, id: &str) -> AppResult<()>;

    /// Append a message to an item's thread.
    async fn post_message(
        &self,
        uid: &str,
        flavour: Flavour,
        item_id: &str,
        message: Message,
    ) -> AppResult<Message>;

    /// Fetch a message from an item's thread.
    async fn get_message(
        &self,
        uid: &str,
        flavour: Flavour,
        item_id: &str,
        message_id: &str,
    ) -> AppResult<Option<Message>>;

    /// Remove a message from an item's thread.
    async fn delete_message(
        &self,
        uid: &str,
        flavour: Flavour,
        item_id: &str,
        message_id: &str,
    ) -> AppResult<()>;

    /// Append an event to the incoming-event log.
    async fn save_incoming_event(&self, event: Event) -> AppResult<Event>;

    /// Labels registered for a feed.
    async fn labels(&self, uid: &str, flavour: Flavour) -> AppResult<Vec<String>>;

    /// Register a label; saving an existing label is a no-op.
    async fn save_label(&self, uid: &str, flavour: Flavour, label: &str) -> AppResult<()>;

    /// The last stored unread persistent item count.
    async fn unread_persistent_items(&self, uid: &str, flavour: Flavour) -> AppResult<i64>;

    /// Recompute and store the unread persistent item count.
    async fn update_unread_persistent_items_count(
        &self,
        uid: &str,
        flavour: Flavour,
    ) -> AppResult<i64>;
}
