//! Feed use case engine.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use engagement_core::Flavour;
use engagement_core::error::AppError;
use engagement_core::result::AppResult;
use engagement_database::FeedRepository;
use engagement_entity::envelope::{EnvelopePayload, metadata_keys};
use engagement_entity::feed::{Action, Event, Feed, FeedFilter, Item, Message, Nudge};
use engagement_entity::validation::{ensure_no_floating_actions, validate_element};
use engagement_pubsub::{NotificationService, TopicId};

use super::toggle::{ItemToggle, NudgeToggle};

/// Orchestrates feed reads and mutations.
///
/// Every mutation persists first and then announces itself on the bus.
/// Deletes of absent documents succeed without announcing anything.
#[derive(Debug, Clone)]
pub struct FeedService {
    repository: Arc<dyn FeedRepository>,
    notifications: Arc<dyn NotificationService>,
    strict_notify: bool,
}

fn metadata(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl FeedService {
    /// Creates a new feed service.
    ///
    /// With `strict_notify` a failed publish is returned to the caller after
    /// the mutation has been persisted; without it the failure is logged.
    pub fn new(
        repository: Arc<dyn FeedRepository>,
        notifications: Arc<dyn NotificationService>,
        strict_notify: bool,
    ) -> Self {
        Self {
            repository,
            notifications,
            strict_notify,
        }
    }

    async fn notify(
        &self,
        topic: TopicId,
        uid: &str,
        flavour: Flavour,
        payload: EnvelopePayload,
        metadata: HashMap<String, String>,
    ) -> AppResult<()> {
        match self
            .notifications
            .notify(topic, uid, flavour, payload, metadata)
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if self.strict_notify => Err(e),
            Err(e) => {
                warn!(uid, %flavour, %topic, error = %e, "Notification dropped");
                Ok(())
            }
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Hydrates the feed of `(uid, flavour)` through `filter`.
    pub async fn get_feed(
        &self,
        uid: &str,
        flavour: Flavour,
        is_anonymous: bool,
        filter: &FeedFilter,
    ) -> AppResult<Feed> {
        let now = Utc::now();
        let items = self
            .repository
            .get_feed_items(uid, flavour, filter, now)
            .await
            .map_err(|e| e.context("failed to get feed items"))?;
        let nudges = self
            .repository
            .get_nudges(uid, flavour, filter, now)
            .await
            .map_err(|e| e.context("failed to get nudges"))?;
        let actions = self
            .repository
            .get_actions(uid, flavour)
            .await
            .map_err(|e| e.context("failed to get actions"))?;

        let feed = Feed {
            items,
            nudges,
            actions,
            ..Feed::thin(uid, flavour, is_anonymous, now)
        };
        debug!(
            uid,
            %flavour,
            items = feed.items.len(),
            nudges = feed.nudges.len(),
            "Feed hydrated"
        );

        self.notify(
            TopicId::FeedRetrieval,
            uid,
            flavour,
            EnvelopePayload::Feed(feed.clone()),
            HashMap::new(),
        )
        .await?;
        Ok(feed)
    }

    /// Returns a feed carrying only its identity.
    pub async fn get_thin_feed(
        &self,
        uid: &str,
        flavour: Flavour,
        is_anonymous: bool,
    ) -> AppResult<Feed> {
        let feed = Feed::thin(uid, flavour, is_anonymous, Utc::now());
        self.notify(
            TopicId::ThinFeedRetrieval,
            uid,
            flavour,
            EnvelopePayload::Feed(feed.clone()),
            HashMap::new(),
        )
        .await?;
        Ok(feed)
    }

    /// Fetches an item; `None` when it does not exist.
    pub async fn get_feed_item(
        &self,
        uid: &str,
        flavour: Flavour,
        id: &str,
    ) -> AppResult<Option<Item>> {
        let item = self
            .repository
            .get_feed_item(uid, flavour, id)
            .await
            .map_err(|e| e.context("failed to get feed item"))?;
        if let Some(item) = &item {
            self.notify(
                TopicId::ItemRetrieval,
                uid,
                flavour,
                EnvelopePayload::Item(item.clone()),
                metadata(&[(metadata_keys::ITEM_ID, id)]),
            )
            .await?;
        }
        Ok(item)
    }

    /// Fetches a nudge; `None` when it does not exist.
    pub async fn get_nudge(
        &self,
        uid: &str,
        flavour: Flavour,
        id: &str,
    ) -> AppResult<Option<Nudge>> {
        let nudge = self
            .repository
            .get_nudge(uid, flavour, id)
            .await
            .map_err(|e| e.context("failed to get nudge"))?;
        if let Some(nudge) = &nudge {
            self.notify(
                TopicId::NudgeRetrieval,
                uid,
                flavour,
                EnvelopePayload::Nudge(nudge.clone()),
                metadata(&[(metadata_keys::NUDGE_ID, id)]),
            )
            .await?;
        }
        Ok(nudge)
    }

    /// Fetches a global action; `None` when it does not exist.
    pub async fn get_action(
        &self,
        uid: &str,
        flavour: Flavour,
        id: &str,
    ) -> AppResult<Option<Action>> {
        let action = self
            .repository
            .get_action(uid, flavour, id)
            .await
            .map_err(|e| e.context("failed to get action"))?;
        if let Some(action) = &action {
            self.notify(
                TopicId::ActionRetrieval,
                uid,
                flavour,
                EnvelopePayload::Action(action.clone()),
                metadata(&[(metadata_keys::ACTION_ID, id)]),
            )
            .await?;
        }
        Ok(action)
    }

    // ── Items ────────────────────────────────────────────────────────

    /// Validates and upserts an item, then announces it.
    pub async fn publish_feed_item(
        &self,
        uid: &str,
        flavour: Flavour,
        mut item: Item,
    ) -> AppResult<Item> {
        if item.sequence_number == 0 {
            item.sequence_number = Utc::now().timestamp();
        }
        validate_element(&item, "feed item")?;
        ensure_no_floating_actions(&item.actions, "feed item")?;

        let item = self
            .repository
            .save_feed_item(uid, flavour, item)
            .await
            .map_err(|e| e.context("failed to save feed item"))?;
        info!(uid, %flavour, item_id = %item.id, sequence_number = item.sequence_number, "Feed item published");

        self.notify(
            TopicId::ItemPublish,
            uid,
            flavour,
            EnvelopePayload::Item(item.clone()),
            metadata(&[(metadata_keys::ITEM_ID, item.id.as_str())]),
        )
        .await?;
        Ok(item)
    }

    /// Deletes an item and its thread. Deleting an absent item succeeds.
    pub async fn delete_feed_item(&self, uid: &str, flavour: Flavour, id: &str) -> AppResult<()> {
        let Some(item) = self
            .repository
            .get_feed_item(uid, flavour, id)
            .await
            .map_err(|e| e.context("failed to get feed item"))?
        else {
            debug!(uid, %flavour, item_id = id, "Feed item already absent");
            return Ok(());
        };

        self.repository
            .delete_feed_item(uid, flavour, id)
            .await
            .map_err(|e| e.context("failed to delete feed item"))?;
        info!(uid, %flavour, item_id = id, "Feed item deleted");

        self.notify(
            TopicId::ItemDelete,
            uid,
            flavour,
            EnvelopePayload::Item(item),
            metadata(&[(metadata_keys::ITEM_ID, id)]),
        )
        .await
    }

    /// Runs an item state transition.
    pub async fn toggle_feed_item(
        &self,
        uid: &str,
        flavour: Flavour,
        id: &str,
        toggle: ItemToggle,
    ) -> AppResult<Item> {
        let transition = toggle.transition();
        let mut item = self
            .repository
            .get_feed_item(uid, flavour, id)
            .await
            .map_err(|e| e.context(format!("failed to {toggle} feed item")))?
            .ok_or_else(|| AppError::not_found(format!("feed item '{id}' not found")))?;

        transition.run(&mut item);
        let item = self
            .repository
            .update_feed_item(uid, flavour, item)
            .await
            .map_err(|e| e.context(format!("failed to {toggle} feed item")))?;
        info!(uid, %flavour, item_id = id, operation = %toggle, "Feed item toggled");

        self.notify(
            transition.topic,
            uid,
            flavour,
            EnvelopePayload::Item(item.clone()),
            metadata(&[(metadata_keys::ITEM_ID, id)]),
        )
        .await?;
        Ok(item)
    }

    /// Marks an item done.
    pub async fn resolve_feed_item(&self, uid: &str, flavour: Flavour, id: &str) -> AppResult<Item> {
        self.toggle_feed_item(uid, flavour, id, ItemToggle::Resolve).await
    }

    /// Marks an item pending again.
    pub async fn unresolve_feed_item(
        &self,
        uid: &str,
        flavour: Flavour,
        id: &str,
    ) -> AppResult<Item> {
        self.toggle_feed_item(uid, flavour, id, ItemToggle::Unresolve).await
    }

    /// Makes an item persistent.
    pub async fn pin_feed_item(&self, uid: &str, flavour: Flavour, id: &str) -> AppResult<Item> {
        self.toggle_feed_item(uid, flavour, id, ItemToggle::Pin).await
    }

    /// Makes an item transient.
    pub async fn unpin_feed_item(&self, uid: &str, flavour: Flavour, id: &str) -> AppResult<Item> {
        self.toggle_feed_item(uid, flavour, id, ItemToggle::Unpin).await
    }

    /// Hides an item.
    pub async fn hide_feed_item(&self, uid: &str, flavour: Flavour, id: &str) -> AppResult<Item> {
        self.toggle_feed_item(uid, flavour, id, ItemToggle::Hide).await
    }

    /// Shows a hidden item.
    pub async fn show_feed_item(&self, uid: &str, flavour: Flavour, id: &str) -> AppResult<Item> {
        self.toggle_feed_item(uid, flavour, id, ItemToggle::Show).await
    }

    // ── Nudges ───────────────────────────────────────────────────────

    /// Validates and upserts a nudge, then announces it.
    pub async fn publish_nudge(
        &self,
        uid: &str,
        flavour: Flavour,
        mut nudge: Nudge,
    ) -> AppResult<Nudge> {
        if nudge.sequence_number == 0 {
            nudge.sequence_number = Utc::now().timestamp();
        }
        validate_element(&nudge, "nudge")?;
        ensure_no_floating_actions(&nudge.actions, "nudge")?;

        let nudge = self
            .repository
            .save_nudge(uid, flavour, nudge)
            .await
            .map_err(|e| e.context("failed to save nudge"))?;
        info!(uid, %flavour, nudge_id = %nudge.id, "Nudge published");

        self.notify(
            TopicId::NudgePublish,
            uid,
            flavour,
            EnvelopePayload::Nudge(nudge.clone()),
            metadata(&[(metadata_keys::NUDGE_ID, nudge.id.as_str())]),
        )
        .await?;
        Ok(nudge)
    }

    /// Deletes a nudge. Deleting an absent nudge succeeds.
    pub async fn delete_nudge(&self, uid: &str, flavour: Flavour, id: &str) -> AppResult<()> {
        let Some(nudge) = self
            .repository
            .get_nudge(uid, flavour, id)
            .await
            .map_err(|e| e.context("failed to get nudge"))?
        else {
            return Ok(());
        };

        self.repository
            .delete_nudge(uid, flavour, id)
            .await
            .map_err(|e| e.context("failed to delete nudge"))?;
        info!(uid, %flavour, nudge_id = id, "Nudge deleted");

        self.notify(
            TopicId::NudgeDelete,
            uid,
            flavour,
            EnvelopePayload::Nudge(nudge),
            metadata(&[(metadata_keys::NUDGE_ID, id)]),
        )
        .await
    }

    /// Runs a nudge state transition.
    pub async fn toggle_nudge(
        &self,
        uid: &str,
        flavour: Flavour,
        id: &str,
        toggle: NudgeToggle,
    ) -> AppResult<Nudge> {
        let transition = toggle.transition();
        let mut nudge = self
            .repository
            .get_nudge(uid, flavour, id)
            .await
            .map_err(|e| e.context(format!("failed to {toggle} nudge")))?
            .ok_or_else(|| AppError::not_found(format!("nudge '{id}' not found")))?;

        transition.run(&mut nudge);
        let nudge = self
            .repository
            .update_nudge(uid, flavour, nudge)
            .await
            .map_err(|e| e.context(format!("failed to {toggle} nudge")))?;
        info!(uid, %flavour, nudge_id = id, operation = %toggle, "Nudge toggled");

        self.notify(
            transition.topic,
            uid,
            flavour,
            EnvelopePayload::Nudge(nudge.clone()),
            metadata(&[(metadata_keys::NUDGE_ID, id)]),
        )
        .await?;
        Ok(nudge)
    }

    /// Marks a nudge done.
    pub async fn resolve_nudge(&self, uid: &str, flavour: Flavour, id: &str) -> AppResult<Nudge> {
        self.toggle_nudge(uid, flavour, id, NudgeToggle::Resolve).await
    }

    /// Marks a nudge pending again.
    pub async fn unresolve_nudge(&self, uid: &str, flavour: Flavour, id: &str) -> AppResult<Nudge> {
        self.toggle_nudge(uid, flavour, id, NudgeToggle::Unresolve).await
    }

    /// Hides a nudge.
    pub async fn hide_nudge(&self, uid: &str, flavour: Flavour, id: &str) -> AppResult<Nudge> {
        self.toggle_nudge(uid, flavour, id, NudgeToggle::Hide).await
    }

    /// Shows a hidden nudge.
    pub async fn show_nudge(&self, uid: &str, flavour: Flavour, id: &str) -> AppResult<Nudge> {
        self.toggle_nudge(uid, flavour, id, NudgeToggle::Show).await
    }

    // ── Actions ──────────────────────────────────────────────────────

    /// Validates and upserts a global action. Floating actions are allowed here.
    pub async fn publish_action(
        &self,
        uid: &str,
        flavour: Flavour,
        mut action: Action,
    ) -> AppResult<Action> {
        if action.sequence_number == 0 {
            action.sequence_number = Utc::now().timestamp();
        }
        validate_element(&action, "action")?;

        let action = self
            .repository
            .save_action(uid, flavour, action)
            .await
            .map_err(|e| e.context("failed to save action"))?;
        info!(uid, %flavour, action_id = %action.id, "Action published");

        self.notify(
            TopicId::ActionPublish,
            uid,
            flavour,
            EnvelopePayload::Action(action.clone()),
            metadata(&[(metadata_keys::ACTION_ID, action.id.as_str())]),
        )
        .await?;
        Ok(action)
    }

    /// Deletes a global action. Deleting an absent action succeeds.
    pub async fn delete_action(&self, uid: &str, flavour: Flavour, id: &str) -> AppResult<()> {
        let Some(action) = self
            .repository
            .get_action(uid, flavour, id)
            .await
            .map_err(|e| e.context("failed to get action"))?
        else {
            return Ok(());
        };

        self.repository
            .delete_action(uid, flavour, id)
            .await
            .map_err(|e| e.context("failed to delete action"))?;

        self.notify(
            TopicId::ActionDelete,
            uid,
            flavour,
            EnvelopePayload::Action(action),
            metadata(&[(metadata_keys::ACTION_ID, id)]),
        )
        .await
    }

    // ── Messages ─────────────────────────────────────────────────────

    /// Appends a message to an item's thread.
    ///
    /// Missing id, sequence number and timestamp are assigned here.
    pub async fn post_message(
        &self,
        uid: &str,
        flavour: Flavour,
        item_id: &str,
        mut message: Message,
    ) -> AppResult<Message> {
        let parent = self
            .repository
            .get_feed_item(uid, flavour, item_id)
            .await
            .map_err(|e| e.context("failed to get feed item"))?;
        if parent.is_none() {
            return Err(AppError::not_found(format!(
                "can't post message: feed item '{item_id}' not found"
            )));
        }

        let now = Utc::now();
        if message.id.is_empty() {
            message.id = Uuid::new_v4().to_string();
        }
        if message.sequence_number == 0 {
            message.sequence_number = now.timestamp();
        }
        message.timestamp.get_or_insert(now);
        validate_element(&message, "message")?;

        let message = self
            .repository
            .post_message(uid, flavour, item_id, message)
            .await
            .map_err(|e| e.context("failed to post message"))?;
        info!(uid, %flavour, item_id, message_id = %message.id, "Message posted");

        self.notify(
            TopicId::MessagePost,
            uid,
            flavour,
            EnvelopePayload::Message(message.clone()),
            metadata(&[
                (metadata_keys::ITEM_ID, item_id),
                (metadata_keys::MESSAGE_ID, message.id.as_str()),
            ]),
        )
        .await?;
        Ok(message)
    }

    /// Removes a message from an item's thread. Deleting an absent message succeeds.
    pub async fn delete_message(
        &self,
        uid: &str,
        flavour: Flavour,
        item_id: &str,
        message_id: &str,
    ) -> AppResult<()> {
        let Some(message) = self
            .repository
            .get_message(uid, flavour, item_id, message_id)
            .await
            .map_err(|e| e.context("failed to get message"))?
        else {
            return Ok(());
        };

        self.repository
            .delete_message(uid, flavour, item_id, message_id)
            .await
            .map_err(|e| e.context("failed to delete message"))?;

        self.notify(
            TopicId::MessageDelete,
            uid,
            flavour,
            EnvelopePayload::Message(message),
            metadata(&[
                (metadata_keys::ITEM_ID, item_id),
                (metadata_keys::MESSAGE_ID, message_id),
            ]),
        )
        .await
    }

    // ── Events ───────────────────────────────────────────────────────

    /// Records an incoming event and announces it.
    ///
    /// The event context is backfilled from `(uid, flavour)`; a context
    /// naming a different flavour is rejected.
    pub async fn process_event(
        &self,
        uid: &str,
        flavour: Flavour,
        mut event: Event,
    ) -> AppResult<Event> {
        match event.context.flavour {
            Some(given) if given != flavour => {
                return Err(AppError::invalid_input(format!(
                    "event flavour {given} does not match feed flavour {flavour}"
                )));
            }
            Some(_) => {}
            None => event.context.flavour = Some(flavour),
        }
        if event.context.user_id.is_empty() {
            event.context.user_id = uid.to_string();
        }
        if event.id.is_empty() {
            event.id = Uuid::new_v4().to_string();
        }
        event.context.timestamp.get_or_insert_with(Utc::now);
        validate_element(&event, "event")?;

        let event = self
            .repository
            .save_incoming_event(event)
            .await
            .map_err(|e| e.context("failed to save incoming event"))?;
        info!(uid, %flavour, event_id = %event.id, name = %event.name, "Event processed");

        self.notify(
            TopicId::IncomingEvent,
            uid,
            flavour,
            EnvelopePayload::Event(event.clone()),
            metadata(&[(metadata_keys::EVENT_ID, event.id.as_str())]),
        )
        .await?;
        Ok(event)
    }

    // ── Labels & counters ────────────────────────────────────────────

    /// Labels registered for a feed.
    pub async fn labels(&self, uid: &str, flavour: Flavour) -> AppResult<Vec<String>> {
        self.repository
            .labels(uid, flavour)
            .await
            .map_err(|e| e.context("failed to get labels"))
    }

    /// Registers a label; saving an existing label is a no-op.
    pub async fn save_label(&self, uid: &str, flavour: Flavour, label: &str) -> AppResult<()> {
        let label = label.trim();
        if label.is_empty() {
            return Err(AppError::invalid_input("can't save empty label"));
        }
        self.repository
            .save_label(uid, flavour, label)
            .await
            .map_err(|e| e.context("failed to save label"))
    }

    /// The last stored unread persistent item count.
    pub async fn unread_persistent_items(&self, uid: &str, flavour: Flavour) -> AppResult<i64> {
        self.repository
            .unread_persistent_items(uid, flavour)
            .await
            .map_err(|e| e.context("failed to get unread persistent items"))
    }

    /// Recomputes the unread persistent item count.
    pub async fn update_unread_persistent_items_count(
        &self,
        uid: &str,
        flavour: Flavour,
    ) -> AppResult<i64> {
        self.repository
            .update_unread_persistent_items_count(uid, flavour)
            .await
            .map_err(|e| e.context("failed to update unread persistent items count"))
    }
}
