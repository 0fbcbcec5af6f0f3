//! In-memory feed repository backed by `dashmap`.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use engagement_core::Flavour;
use engagement_core::error::AppError;
use engagement_core::result::AppResult;
use engagement_entity::feed::{Action, Event, FeedFilter, Item, Message, Nudge};

use crate::repository::FeedRepository;

/// Identifies a document inside a feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DocKey {
    uid: String,
    flavour: Flavour,
    parent: String,
    id: String,
}

impl DocKey {
    fn new(uid: &str, flavour: Flavour, id: &str) -> Self {
        Self::child(uid, flavour, "", id)
    }

    fn child(uid: &str, flavour: Flavour, parent: &str, id: &str) -> Self {
        Self {
            uid: uid.to_string(),
            flavour,
            parent: parent.to_string(),
            id: id.to_string(),
        }
    }

    fn in_feed(&self, uid: &str, flavour: Flavour) -> bool {
        self.uid == uid && self.flavour == flavour
    }
}

type FeedKey = (String, Flavour);

/// Feed repository held entirely in process memory.
///
/// Each map entry is locked for the duration of an upsert, which makes the
/// sequence-number comparison atomic per document.
#[derive(Debug, Default)]
pub struct InMemoryFeedRepository {
    items: DashMap<DocKey, Item>,
    nudges: DashMap<DocKey, Nudge>,
    actions: DashMap<DocKey, Action>,
    messages: DashMap<DocKey, Message>,
    events: DashMap<String, Event>,
    labels: DashMap<FeedKey, BTreeSet<String>>,
    unread_counts: DashMap<FeedKey, i64>,
}

impl InMemoryFeedRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events in the incoming-event log.
    pub fn incoming_event_count(&self) -> usize {
        self.events.len()
    }
}

/// Insert `incoming` unless the stored document has an equal or newer sequence number.
fn upsert<T: Clone>(
    map: &DashMap<DocKey, T>,
    key: DocKey,
    incoming: T,
    sequence: fn(&T) -> i64,
) -> T {
    match map.entry(key) {
        Entry::Occupied(mut entry) => {
            if sequence(&incoming) > sequence(entry.get()) {
                entry.insert(incoming);
            } else {
                debug!(id = %entry.key().id, "Stale write ignored");
            }
            entry.get().clone()
        }
        Entry::Vacant(entry) => entry.insert(incoming).clone(),
    }
}

/// Replace an existing document, whatever its sequence number.
fn replace<T: Clone>(
    map: &DashMap<DocKey, T>,
    key: DocKey,
    incoming: T,
    what: &str,
) -> AppResult<T> {
    match map.get_mut(&key) {
        Some(mut entry) => {
            *entry = incoming;
            Ok(entry.clone())
        }
        None => Err(AppError::not_found(format!("{what} '{}' does not exist", key.id))),
    }
}

fn collect<T: Clone>(
    map: &DashMap<DocKey, T>,
    uid: &str,
    flavour: Flavour,
    keep: impl Fn(&T) -> bool,
) -> Vec<T> {
    map.iter()
        .filter(|entry| entry.key().in_feed(uid, flavour) && entry.key().parent.is_empty())
        .filter(|entry| keep(entry.value()))
        .map(|entry| entry.value().clone())
        .collect()
}

#[async_trait]
impl FeedRepository for InMemoryFeedRepository {
    async fn get_feed_items(
        &self,
        uid: &str,
        flavour: Flavour,
        filter: &FeedFilter,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Item>> {
        let mut items = collect(&self.items, uid, flavour, |i| filter.matches_item(i, now));
        items.sort_by(|a, b| {
            b.sequence_number
                .cmp(&a.sequence_number)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(items)
    }

    async fn get_nudges(
        &self,
        uid: &str,
        flavour: Flavour,
        filter: &FeedFilter,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Nudge>> {
        let mut nudges = collect(&self.nudges, uid, flavour, |n| filter.matches_nudge(n, now));
        nudges.sort_by(|a, b| {
            b.sequence_number
                .cmp(&a.sequence_number)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(nudges)
    }

    async fn get_actions(&self, uid: &str, flavour: Flavour) -> AppResult<Vec<Action>> {
        let mut actions = collect(&self.actions, uid, flavour, |_| true);
        actions.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(actions)
    }

    async fn get_feed_item(
        &self,
        uid: &str,
        flavour: Flavour,
        id: &str,
    ) -> AppResult<Option<Item>> {
        Ok(self
            .items
            .get(&DocKey::new(uid, flavour, id))
            .map(|e| e.value().clone()))
    }

    async fn save_feed_item(&self, uid: &str, flavour: Flavour, item: Item) -> AppResult<Item> {
        let key = DocKey::new(uid, flavour, &item.id);
        Ok(upsert(&self.items, key, item, |i| i.sequence_number))
    }

    async fn update_feed_item(&self, uid: &str, flavour: Flavour, item: Item) -> AppResult<Item> {
        let key = DocKey::new(uid, flavour, &item.id);
        replace(&self.items, key, item, "feed item")
    }

    async fn delete_feed_item(&self, uid: &str, flavour: Flavour, id: &str) -> AppResult<()> {
        self.items.remove(&DocKey::new(uid, flavour, id));
        self.messages
            .retain(|key, _| !(key.in_feed(uid, flavour) && key.parent == id));
        Ok(())
    }

    async fn get_nudge(&self, uid: &str, flavour: Flavour, id: &str) -> AppResult<Option<Nudge>> {
        Ok(self
            .nudges
            .get(&DocKey::new(uid, flavour, id))
            .map(|e| e.value().clone()))
    }

    async fn save_nudge(&self, uid: &str, flavour: Flavour, nudge: Nudge) -> AppResult<Nudge> {
        let key = DocKey::new(uid, flavour, &nudge.id);
        Ok(upsert(&self.nudges, key, nudge, |n| n.sequence_number))
    }

    async fn update_nudge(&self, uid: &str, flavour: Flavour, nudge: Nudge) -> AppResult<Nudge> {
        let key = DocKey::new(uid, flavour, &nudge.id);
        replace(&self.nudges, key, nudge, "nudge")
    }

    async fn delete_nudge(&self, uid: &str, flavour: Flavour, id: &str) -> AppResult<()> {
        self.nudges.remove(&DocKey::new(uid, flavour, id));
        Ok(())
    }

    async fn get_action(
        &self,
        uid: &str,
        flavour: Flavour,
        id: &str,
    ) -> AppResult<Option<Action>> {
        Ok(self
            .actions
            .get(&DocKey::new(uid, flavour, id))
            .map(|e| e.value().clone()))
    }

    async fn save_action(&self, uid: &str, flavour: Flavour, action: Action) -> AppResult<Action> {
        let key = DocKey::new(uid, flavour, &action.id);
        Ok(upsert(&self.actions, key, action, |a| a.sequence_number))
    }

    async fn delete_action(&self, uid: &str, flavour: Flavour, id: &str) -> AppResult<()> {
        self.actions.remove(&DocKey::new(uid, flavour, id));
        Ok(())
    }

    async fn post_message(
        &self,
        uid: &str,
        flavour: Flavour,
        item_id: &str,
        message: Message,
    ) -> AppResult<Message> {
        let key = DocKey::child(uid, flavour, item_id, &message.id);
        Ok(upsert(&self.messages, key, message, |m| m.sequence_number))
    }

    async fn get_message(
        &self,
        uid: &str,
        flavour: Flavour,
        item_id: &str,
        message_id: &str,
    ) -> AppResult<Option<Message>> {
        Ok(self
            .messages
            .get(&DocKey::child(uid, flavour, item_id, message_id))
            .map(|e| e.value().clone()))
    }

    async fn delete_message(
        &self,
        uid: &str,
        flavour: Flavour,
        item_id: &str,
        message_id: &str,
    ) -> AppResult<()> {
        self.messages
            .remove(&DocKey::child(uid, flavour, item_id, message_id));
        Ok(())
    }

    async fn save_incoming_event(&self, event: Event) -> AppResult<Event> {
        self.events.insert(event.id.clone(), event.clone());
        Ok(event)
    }

    async fn labels(&self, uid: &str, flavour: Flavour) -> AppResult<Vec<String>> {
        Ok(self
            .labels
            .get(&(uid.to_string(), flavour))
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn save_label(&self, uid: &str, flavour: Flavour, label: &str) -> AppResult<()> {
        self.labels
            .entry((uid.to_string(), flavour))
            .or_default()
            .insert(label.to_string());
        Ok(())
    }

    async fn unread_persistent_items(&self, uid: &str, flavour: Flavour) -> AppResult<i64> {
        Ok(self
            .unread_counts
            .get(&(uid.to_string(), flavour))
            .map(|count| *count)
            .unwrap_or(0))
    }

    async fn update_unread_persistent_items_count(
        &self,
        uid: &str,
        flavour: Flavour,
    ) -> AppResult<i64> {
        let count = self
            .items
            .iter()
            .filter(|e| e.key().in_feed(uid, flavour) && e.value().is_unread_persistent())
            .count() as i64;
        self.unread_counts.insert((uid.to_string(), flavour), count);
        debug!(uid, %flavour, count, "Unread persistent items recomputed");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use engagement_core::error::ErrorKind;
    use engagement_entity::feed::{BooleanFilter, Link, Status, Visibility};

    use super::*;

    const UID: &str = "user-1";

    fn item(id: &str, sequence_number: i64) -> Item {
        Item {
            id: id.to_string(),
            sequence_number,
            expiry: Utc::now() + Duration::days(1),
            persistent: false,
            status: Status::Pending,
            visibility: Visibility::Show,
            icon: Link::image("https://example.com/icon.png"),
            author: "Care team".to_string(),
            tagline: format!("tagline {sequence_number}"),
            label: "WELCOME".to_string(),
            summary: "summary".to_string(),
            text: "text".to_string(),
            text_type: Default::default(),
            links: Vec::new(),
            actions: Vec::new(),
            conversations: Vec::new(),
            users: Vec::new(),
            groups: Vec::new(),
            notification_channels: Vec::new(),
        }
    }

    fn message(id: &str) -> Message {
        Message {
            id: id.to_string(),
            sequence_number: 1,
            text: "hello".to_string(),
            reply_to: None,
            posted_by_uid: UID.to_string(),
            posted_by_name: "Ann".to_string(),
            timestamp: Some(Utc::now()),
        }
    }

    #[tokio::test]
    async fn test_newer_sequence_replaces_document() {
        let repo = InMemoryFeedRepository::new();
        repo.save_feed_item(UID, Flavour::Consumer, item("i-1", 1))
            .await
            .unwrap();
        let saved = repo
            .save_feed_item(UID, Flavour::Consumer, item("i-1", 2))
            .await
            .unwrap();
        assert_eq!(saved.tagline, "tagline 2");
    }

    #[tokio::test]
    async fn test_stale_or_equal_sequence_returns_stored_document() {
        let repo = InMemoryFeedRepository::new();
        repo.save_feed_item(UID, Flavour::Consumer, item("i-1", 5))
            .await
            .unwrap();

        let mut replay = item("i-1", 5);
        replay.tagline = "changed".to_string();
        let saved = repo
            .save_feed_item(UID, Flavour::Consumer, replay)
            .await
            .unwrap();
        assert_eq!(saved.tagline, "tagline 5");
    }

    #[tokio::test]
    async fn test_update_with_equal_sequence_last_writer_wins() {
        let repo = InMemoryFeedRepository::new();
        repo.save_feed_item(UID, Flavour::Consumer, item("i-1", 1))
            .await
            .unwrap();
        let snapshot = repo
            .get_feed_item(UID, Flavour::Consumer, "i-1")
            .await
            .unwrap()
            .unwrap();

        let mut resolved = snapshot.clone();
        resolved.sequence_number += 1;
        resolved.status = Status::Done;
        let mut hidden = snapshot;
        hidden.sequence_number += 1;
        hidden.visibility = Visibility::Hide;

        repo.update_feed_item(UID, Flavour::Consumer, resolved)
            .await
            .unwrap();
        let returned = repo
            .update_feed_item(UID, Flavour::Consumer, hidden)
            .await
            .unwrap();
        assert_eq!(returned.visibility, Visibility::Hide);

        let stored = repo
            .get_feed_item(UID, Flavour::Consumer, "i-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.visibility, Visibility::Hide);
        assert_eq!(stored.status, Status::Pending);
    }

    #[tokio::test]
    async fn test_update_of_deleted_document_is_not_found() {
        let repo = InMemoryFeedRepository::new();
        let err = repo
            .update_feed_item(UID, Flavour::Consumer, item("gone", 2))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert!(
            repo.get_feed_item(UID, Flavour::Consumer, "gone")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_flavours_are_isolated() {
        let repo = InMemoryFeedRepository::new();
        repo.save_feed_item(UID, Flavour::Consumer, item("i-1", 1))
            .await
            .unwrap();
        assert!(
            repo.get_feed_item(UID, Flavour::Pro, "i-1")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_delete_is_idempotent_and_drops_thread() {
        let repo = InMemoryFeedRepository::new();
        repo.delete_feed_item(UID, Flavour::Pro, "missing").await.unwrap();

        repo.save_feed_item(UID, Flavour::Pro, item("i-1", 1))
            .await
            .unwrap();
        repo.post_message(UID, Flavour::Pro, "i-1", message("m-1"))
            .await
            .unwrap();
        repo.delete_feed_item(UID, Flavour::Pro, "i-1").await.unwrap();

        assert!(repo.get_feed_item(UID, Flavour::Pro, "i-1").await.unwrap().is_none());
        assert!(
            repo.get_message(UID, Flavour::Pro, "i-1", "m-1")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_feed_items_are_filtered() {
        let repo = InMemoryFeedRepository::new();
        let mut pinned = item("pinned", 2);
        pinned.persistent = true;
        repo.save_feed_item(UID, Flavour::Consumer, pinned).await.unwrap();
        repo.save_feed_item(UID, Flavour::Consumer, item("plain", 1))
            .await
            .unwrap();

        let all = repo
            .get_feed_items(UID, Flavour::Consumer, &FeedFilter::default(), Utc::now())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "pinned");

        let filter = FeedFilter {
            persistent: BooleanFilter::True,
            ..Default::default()
        };
        let persistent = repo
            .get_feed_items(UID, Flavour::Consumer, &filter, Utc::now())
            .await
            .unwrap();
        assert_eq!(persistent.len(), 1);
        assert_eq!(persistent[0].id, "pinned");
    }

    #[tokio::test]
    async fn test_save_label_is_idempotent() {
        let repo = InMemoryFeedRepository::new();
        repo.save_label(UID, Flavour::Consumer, "WELCOME").await.unwrap();
        repo.save_label(UID, Flavour::Consumer, "WELCOME").await.unwrap();
        repo.save_label(UID, Flavour::Consumer, "BILLING").await.unwrap();

        let labels = repo.labels(UID, Flavour::Consumer).await.unwrap();
        assert_eq!(labels, vec!["BILLING".to_string(), "WELCOME".to_string()]);
    }

    #[tokio::test]
    async fn test_unread_count_recomputed_on_demand() {
        let repo = InMemoryFeedRepository::new();
        let mut unread = item("unread", 1);
        unread.persistent = true;
        let mut done = item("done", 1);
        done.persistent = true;
        done.status = Status::Done;
        let mut hidden = item("hidden", 1);
        hidden.persistent = true;
        hidden.visibility = Visibility::Hide;

        for item in [unread, done, hidden, item("transient", 1)] {
            repo.save_feed_item(UID, Flavour::Pro, item).await.unwrap();
        }

        assert_eq!(repo.unread_persistent_items(UID, Flavour::Pro).await.unwrap(), 0);
        assert_eq!(
            repo.update_unread_persistent_items_count(UID, Flavour::Pro)
                .await
                .unwrap(),
            1
        );
        assert_eq!(repo.unread_persistent_items(UID, Flavour::Pro).await.unwrap(), 1);
    }
}
