//! Fan-out engine.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, info};
use validator::Validate;

use engagement_core::Flavour;
use engagement_core::config::NotificationsConfig;
use engagement_core::error::AppError;
use engagement_core::result::AppResult;
use engagement_core::text::truncate_string_with_ellipses;
use engagement_database::FeedRepository;
use engagement_entity::envelope::NotificationEnvelope;
use engagement_entity::feed::{Channel, Item, TextType};
use engagement_entity::notification::{
    EmailPayload, FirebaseSimpleNotification, SendNotificationPayload,
};
use engagement_pubsub::NotificationService;

use super::sender::{ItemSender, NudgeSender, Sender};
use crate::channels::Channels;

/// Sender name of inbox counter pushes.
pub const INBOX_COUNT_SENDER: &str = "INBOX_COUNT_UPDATED";

/// Data key carrying the unread persistent item count.
pub const UNREAD_COUNT_KEY: &str = "unreadPersistentItems";

/// Reacts to bus messages with pushes, emails and counter updates.
#[derive(Debug, Clone)]
pub struct FanoutService {
    repository: Arc<dyn FeedRepository>,
    notifications: Arc<dyn NotificationService>,
    channels: Channels,
    config: NotificationsConfig,
}

impl FanoutService {
    /// Creates a new fan-out service.
    pub fn new(
        repository: Arc<dyn FeedRepository>,
        notifications: Arc<dyn NotificationService>,
        channels: Channels,
        config: NotificationsConfig,
    ) -> Self {
        Self {
            repository,
            notifications,
            channels,
            config,
        }
    }

    /// Route a decoded message body to the handler for `sender`.
    pub async fn dispatch(&self, sender: Sender, data: &[u8]) -> AppResult<()> {
        match sender {
            Sender::Item(s) => {
                let envelope = NotificationEnvelope::from_bytes(data)?;
                self.notify_item_update(s, s.include_notification(), &envelope)
                    .await
            }
            Sender::Nudge(s) => {
                let envelope = NotificationEnvelope::from_bytes(data)?;
                self.notify_nudge_update(s, &envelope).await
            }
            Sender::IncomingEvent => {
                let envelope = NotificationEnvelope::from_bytes(data)?;
                self.handle_incoming_event(&envelope)
            }
            Sender::SendNotification => self.handle_send_notification(data).await,
            Sender::SendEmail => self.send_notification_email(data).await,
            Sender::Action(_) | Sender::Message(_) | Sender::Retrieval(_) => {
                let envelope = NotificationEnvelope::from_bytes(data)?;
                debug!(
                    %sender,
                    uid = %envelope.uid,
                    flavour = %envelope.flavour,
                    kind = envelope.payload.kind(),
                    "Acknowledged without fan-out"
                );
                Ok(())
            }
        }
    }

    /// React to an item change.
    ///
    /// Persistent items carry a tray notification when `include_notification`
    /// is set. Publishing registers the item label. The inbox counter of the
    /// owner is always recomputed.
    pub async fn notify_item_update(
        &self,
        sender: ItemSender,
        include_notification: bool,
        envelope: &NotificationEnvelope,
    ) -> AppResult<()> {
        let item = envelope.item()?;

        if item.persistent && include_notification {
            let notification = FirebaseSimpleNotification {
                title: item.tagline.clone(),
                body: truncate_string_with_ellipses(&item.summary, self.config.max_body_length),
                image_url: Some(self.config.default_icon_url.clone()),
                data: None,
            };
            self.send_notification_via_fcm(
                &item.users,
                sender.as_str(),
                envelope,
                Some(notification),
            )
            .await
            .map_err(|e| e.context(format!("failed to push {}", sender.as_str())))?;
        }

        if sender == ItemSender::Published {
            self.repository
                .save_label(&envelope.uid, envelope.flavour, &item.label)
                .await
                .map_err(|e| e.context("failed to save item label"))?;

            if item.notification_channels.contains(&Channel::Email) {
                self.queue_item_email(item).await?;
            }
        }

        self.update_inbox(&envelope.uid, envelope.flavour).await?;
        Ok(())
    }

    /// React to a nudge change. Only publishing and resolving push anything.
    pub async fn notify_nudge_update(
        &self,
        sender: NudgeSender,
        envelope: &NotificationEnvelope,
    ) -> AppResult<()> {
        let nudge = envelope.nudge()?;
        let body = match sender {
            NudgeSender::Published => &nudge.notification_body.publish_message,
            NudgeSender::Resolved => &nudge.notification_body.resolve_message,
            NudgeSender::Deleted
            | NudgeSender::Unresolved
            | NudgeSender::Hidden
            | NudgeSender::Shown => return Ok(()),
        };

        let notification = FirebaseSimpleNotification {
            title: nudge.title.clone(),
            body: truncate_string_with_ellipses(body, self.config.max_body_length),
            image_url: Some(self.config.default_icon_url.clone()),
            data: None,
        };
        self.send_notification_via_fcm(&nudge.users, sender.as_str(), envelope, Some(notification))
            .await
            .map_err(|e| e.context(format!("failed to push {}", sender.as_str())))?;
        Ok(())
    }

    /// Push `envelope` to every device of every uid in `uids`.
    ///
    /// A uid without registered tokens is skipped. Returns the number of
    /// pushes sent, one per uid with tokens.
    pub async fn send_notification_via_fcm(
        &self,
        uids: &[String],
        sender: &str,
        envelope: &NotificationEnvelope,
        notification: Option<FirebaseSimpleNotification>,
    ) -> AppResult<usize> {
        let encoded = serde_json::to_string(envelope)
            .map_err(|e| AppError::from(e).context("failed to encode push data"))?;
        let data = HashMap::from([(sender.to_string(), encoded)]);

        let tokens = try_join_all(
            uids.iter()
                .map(|uid| self.channels.profiles.device_tokens(uid)),
        )
        .await
        .map_err(|e| e.context("failed to resolve device tokens"))?;

        let mut sent = 0;
        for (uid, registration_tokens) in uids.iter().zip(tokens) {
            if registration_tokens.is_empty() {
                debug!(uid, sender, "No device tokens, push skipped");
                continue;
            }
            let payload = SendNotificationPayload {
                registration_tokens,
                data: data.clone(),
                notification: notification.clone(),
            };
            self.channels.push.send(&payload).await?;
            sent += 1;
        }

        info!(sender, recipients = uids.len(), sent, "Push fan-out complete");
        Ok(sent)
    }

    /// Recompute the unread counter of `(uid, flavour)`.
    pub async fn update_inbox(&self, uid: &str, flavour: Flavour) -> AppResult<i64> {
        let count = self
            .repository
            .update_unread_persistent_items_count(uid, flavour)
            .await
            .map_err(|e| e.context("failed to update inbox count"))?;

        if self.config.inbox_count_push_enabled {
            self.notify_inbox_count_update(uid, flavour, count).await?;
        }
        Ok(count)
    }

    /// Queue a data-only push carrying the unread counter to the owner's devices.
    pub async fn notify_inbox_count_update(
        &self,
        uid: &str,
        flavour: Flavour,
        count: i64,
    ) -> AppResult<()> {
        let registration_tokens = self
            .channels
            .profiles
            .device_tokens(uid)
            .await
            .map_err(|e| e.context("failed to resolve device tokens"))?;
        if registration_tokens.is_empty() {
            return Ok(());
        }

        let payload = SendNotificationPayload {
            registration_tokens,
            data: HashMap::from([
                (UNREAD_COUNT_KEY.to_string(), count.to_string()),
                ("flavour".to_string(), flavour.to_string()),
            ]),
            notification: None,
        };
        self.notifications.push(INBOX_COUNT_SENDER, payload).await
    }

    /// Forward a queued push to the push channel unchanged.
    pub async fn handle_send_notification(&self, data: &[u8]) -> AppResult<()> {
        let payload: SendNotificationPayload = serde_json::from_slice(data)
            .map_err(|e| AppError::from(e).context("failed to decode push payload"))?;
        self.channels.push.send(&payload).await
    }

    /// Log an incoming event.
    pub fn handle_incoming_event(&self, envelope: &NotificationEnvelope) -> AppResult<()> {
        let event = envelope.event()?;
        info!(
            uid = %envelope.uid,
            flavour = %envelope.flavour,
            event_id = %event.id,
            name = %event.name,
            "Incoming event received"
        );
        Ok(())
    }

    /// Forward a queued email to the mail channel.
    pub async fn send_notification_email(&self, data: &[u8]) -> AppResult<()> {
        let payload: EmailPayload = serde_json::from_slice(data)
            .map_err(|e| AppError::from(e).context("failed to decode email payload"))?;
        payload.validate()?;
        self.channels.mail.send(&payload).await
    }

    async fn queue_item_email(&self, item: &Item) -> AppResult<()> {
        let addresses = try_join_all(
            item.users
                .iter()
                .map(|uid| self.channels.profiles.email_addresses(uid)),
        )
        .await
        .map_err(|e| e.context("failed to resolve email addresses"))?;
        let to: Vec<String> = addresses.into_iter().flatten().collect();
        if to.is_empty() {
            debug!(item_id = %item.id, "No email addresses, email skipped");
            return Ok(());
        }

        let html = (item.text_type == TextType::Html).then(|| item.text.clone());
        self.notifications
            .email(EmailPayload {
                to,
                subject: item.tagline.clone(),
                text: item.text.clone(),
                html,
            })
            .await
    }
}
