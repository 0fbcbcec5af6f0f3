//! PostgreSQL feed repository storing documents as JSONB.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::PgPool;
use sqlx::types::Json;

use engagement_core::Flavour;
use engagement_core::error::{AppError, ErrorKind};
use engagement_core::result::AppResult;
use engagement_entity::feed::{Action, Event, FeedFilter, Item, Message, Nudge};

use crate::repository::FeedRepository;

const KIND_ITEM: &str = "item";
const KIND_NUDGE: &str = "nudge";
const KIND_ACTION: &str = "action";
const KIND_MESSAGE: &str = "message";
const KIND_EVENT: &str = "event";

/// Feed repository over the `feed_documents`, `feed_labels` and
/// `feed_counters` tables.
#[derive(Debug, Clone)]
pub struct PgFeedRepository {
    pool: PgPool,
}

/// Addresses one row of `feed_documents`.
struct Doc<'a> {
    uid: &'a str,
    flavour: Flavour,
    kind: &'static str,
    parent_id: &'a str,
    id: &'a str,
}

fn db_error(operation: &str, e: sqlx::Error) -> AppError {
    AppError::with_source(ErrorKind::Repository, format!("{operation}: {e}"), e)
}

impl PgFeedRepository {
    /// Create a new repository over `pool`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch<T>(&self, doc: &Doc<'_>) -> AppResult<Option<T>>
    where
        T: DeserializeOwned + Send + Unpin + 'static,
    {
        let row: Option<Json<T>> = sqlx::query_scalar(
            "SELECT document FROM feed_documents \
             WHERE uid = $1 AND flavour = $2 AND kind = $3 AND parent_id = $4 AND id = $5",
        )
        .bind(doc.uid)
        .bind(doc.flavour.as_str())
        .bind(doc.kind)
        .bind(doc.parent_id)
        .bind(doc.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error(&format!("failed to get {}", doc.kind), e))?;
        Ok(row.map(|Json(value)| value))
    }

    async fn fetch_all<T>(&self, uid: &str, flavour: Flavour, kind: &str) -> AppResult<Vec<T>>
    where
        T: DeserializeOwned + Send + Unpin + 'static,
    {
        let rows: Vec<Json<T>> = sqlx::query_scalar(
            "SELECT document FROM feed_documents \
             WHERE uid = $1 AND flavour = $2 AND kind = $3 AND parent_id = '' \
             ORDER BY sequence_number DESC, id ASC",
        )
        .bind(uid)
        .bind(flavour.as_str())
        .bind(kind)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error(&format!("failed to list {kind}s"), e))?;
        Ok(rows.into_iter().map(|Json(value)| value).collect())
    }

    /// Insert or replace a document when `sequence_number` is newer, then
    /// return whatever is stored.
    async fn upsert<T>(&self, doc: &Doc<'_>, sequence_number: i64, value: &T) -> AppResult<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync + Unpin + 'static,
    {
        sqlx::query(
            "INSERT INTO feed_documents \
               (uid, flavour, kind, parent_id, id, sequence_number, document) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (uid, flavour, kind, parent_id, id) DO UPDATE \
             SET sequence_number = EXCLUDED.sequence_number, \
                 document = EXCLUDED.document, \
                 updated_at = NOW() \
             WHERE feed_documents.sequence_number < EXCLUDED.sequence_number",
        )
        .bind(doc.uid)
        .bind(doc.flavour.as_str())
        .bind(doc.kind)
        .bind(doc.parent_id)
        .bind(doc.id)
        .bind(sequence_number)
        .bind(Json(value))
        .execute(&self.pool)
        .await
        .map_err(|e| db_error(&format!("failed to save {}", doc.kind), e))?;

        self.fetch(doc).await?.ok_or_else(|| {
            AppError::repository(format!("{} '{}' vanished after save", doc.kind, doc.id))
        })
    }

    /// Replace an existing document unconditionally and return it.
    async fn replace<T>(&self, doc: &Doc<'_>, sequence_number: i64, value: &T) -> AppResult<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync + Unpin + 'static,
    {
        let row: Option<Json<T>> = sqlx::query_scalar(
            "UPDATE feed_documents \
             SET sequence_number = $6, document = $7, updated_at = NOW() \
             WHERE uid = $1 AND flavour = $2 AND kind = $3 AND parent_id = $4 AND id = $5 \
             RETURNING document",
        )
        .bind(doc.uid)
        .bind(doc.flavour.as_str())
        .bind(doc.kind)
        .bind(doc.parent_id)
        .bind(doc.id)
        .bind(sequence_number)
        .bind(Json(value))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error(&format!("failed to update {}", doc.kind), e))?;

        row.map(|Json(value)| value).ok_or_else(|| {
            AppError::not_found(format!("{} '{}' does not exist", doc.kind, doc.id))
        })
    }

    async fn delete(&self, doc: &Doc<'_>) -> AppResult<()> {
        sqlx::query(
            "DELETE FROM feed_documents \
             WHERE uid = $1 AND flavour = $2 AND kind = $3 AND parent_id = $4 AND id = $5",
        )
        .bind(doc.uid)
        .bind(doc.flavour.as_str())
        .bind(doc.kind)
        .bind(doc.parent_id)
        .bind(doc.id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error(&format!("failed to delete {}", doc.kind), e))?;
        Ok(())
    }
}

fn top_level<'a>(uid: &'a str, flavour: Flavour, kind: &'static str, id: &'a str) -> Doc<'a> {
    Doc {
        uid,
        flavour,
        kind,
        parent_id: "",
        id,
    }
}

#[async_trait]
impl FeedRepository for PgFeedRepository {
    async fn get_feed_items(
        &self,
        uid: &str,
        flavour: Flavour,
        filter: &FeedFilter,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Item>> {
        let items: Vec<Item> = self.fetch_all(uid, flavour, KIND_ITEM).await?;
        Ok(items
            .into_iter()
            .filter(|i| filter.matches_item(i, now))
            .collect())
    }

    async fn get_nudges(
        &self,
        uid: &str,
        flavour: Flavour,
        filter: &FeedFilter,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Nudge>> {
        let nudges: Vec<Nudge> = self.fetch_all(uid, flavour, KIND_NUDGE).await?;
        Ok(nudges
            .into_iter()
            .filter(|n| filter.matches_nudge(n, now))
            .collect())
    }

    async fn get_actions(&self, uid: &str, flavour: Flavour) -> AppResult<Vec<Action>> {
        self.fetch_all(uid, flavour, KIND_ACTION).await
    }

    async fn get_feed_item(
        &self,
        uid: &str,
        flavour: Flavour,
        id: &str,
    ) -> AppResult<Option<Item>> {
        self.fetch(&top_level(uid, flavour, KIND_ITEM, id)).await
    }

    async fn save_feed_item(&self, uid: &str, flavour: Flavour, item: Item) -> AppResult<Item> {
        let doc = top_level(uid, flavour, KIND_ITEM, &item.id);
        self.upsert(&doc, item.sequence_number, &item).await
    }

    async fn update_feed_item(&self, uid: &str, flavour: Flavour, item: Item) -> AppResult<Item> {
        let doc = top_level(uid, flavour, KIND_ITEM, &item.id);
        self.replace(&doc, item.sequence_number, &item).await
    }

    async fn delete_feed_item(&self, uid: &str, flavour: Flavour, id: &str) -> AppResult<()> {
        sqlx::query(
            "DELETE FROM feed_documents \
             WHERE uid = $1 AND flavour = $2 AND kind = $3 AND parent_id = $4",
        )
        .bind(uid)
        .bind(flavour.as_str())
        .bind(KIND_MESSAGE)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("failed to delete item thread", e))?;

        self.delete(&top_level(uid, flavour, KIND_ITEM, id)).await
    }

    async fn get_nudge(&self, uid: &str, flavour: Flavour, id: &str) -> AppResult<Option<Nudge>> {
        self.fetch(&top_level(uid, flavour, KIND_NUDGE, id)).await
    }

    async fn save_nudge(&self, uid: &str, flavour: Flavour, nudge: Nudge) -> AppResult<Nudge> {
        let doc = top_level(uid, flavour, KIND_NUDGE, &nudge.id);
        self.upsert(&doc, nudge.sequence_number, &nudge).await
    }

    async fn update_nudge(&self, uid: &str, flavour: Flavour, nudge: Nudge) -> AppResult<Nudge> {
        let doc = top_level(uid, flavour, KIND_NUDGE, &nudge.id);
        self.replace(&doc, nudge.sequence_number, &nudge).await
    }

    async fn delete_nudge(&self, uid: &str, flavour: Flavour, id: &str) -> AppResult<()> {
        self.delete(&top_level(uid, flavour, KIND_NUDGE, id)).await
    }

    async fn get_action(
        &self,
        uid: &str,
        flavour: Flavour,
        id: &str,
    ) -> AppResult<Option<Action>> {
        self.fetch(&top_level(uid, flavour, KIND_ACTION, id)).await
    }

    async fn save_action(&self, uid: &str, flavour: Flavour, action: Action) -> AppResult<Action> {
        let doc = top_level(uid, flavour, KIND_ACTION, &action.id);
        self.upsert(&doc, action.sequence_number, &action).await
    }

    async fn delete_action(&self, uid: &str, flavour: Flavour, id: &str) -> AppResult<()> {
        self.delete(&top_level(uid, flavour, KIND_ACTION, id)).await
    }

    async fn post_message(
        &self,
        uid: &str,
        flavour: Flavour,
        item_id: &str,
        message: Message,
    ) -> AppResult<Message> {
        let doc = Doc {
            uid,
            flavour,
            kind: KIND_MESSAGE,
            parent_id: item_id,
            id: &message.id,
        };
        self.upsert(&doc, message.sequence_number, &message).await
    }

    async fn get_message(
        &self,
        uid: &str,
        flavour: Flavour,
        item_id: &str,
        message_id: &str,
    ) -> AppResult<Option<Message>> {
        self.fetch(&Doc {
            uid,
            flavour,
            kind: KIND_MESSAGE,
            parent_id: item_id,
            id: message_id,
        })
        .await
    }

    async fn delete_message(
        &self,
        uid: &str,
        flavour: Flavour,
        item_id: &str,
        message_id: &str,
    ) -> AppResult<()> {
        self.delete(&Doc {
            uid,
            flavour,
            kind: KIND_MESSAGE,
            parent_id: item_id,
            id: message_id,
        })
        .await
    }

    async fn save_incoming_event(&self, event: Event) -> AppResult<Event> {
        let flavour = event.context.flavour.ok_or_else(|| {
            AppError::invalid_input(format!("event '{}' has no flavour", event.id))
        })?;
        let sequence_number = event
            .context
            .timestamp
            .map(|t| t.timestamp())
            .unwrap_or_else(|| Utc::now().timestamp());
        let doc = top_level(&event.context.user_id, flavour, KIND_EVENT, &event.id);
        self.upsert(&doc, sequence_number, &event).await
    }

    async fn labels(&self, uid: &str, flavour: Flavour) -> AppResult<Vec<String>> {
        sqlx::query_scalar(
            "SELECT label FROM feed_labels WHERE uid = $1 AND flavour = $2 ORDER BY label",
        )
        .bind(uid)
        .bind(flavour.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("failed to list labels", e))
    }

    async fn save_label(&self, uid: &str, flavour: Flavour, label: &str) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO feed_labels (uid, flavour, label) VALUES ($1, $2, $3) \
             ON CONFLICT (uid, flavour, label) DO NOTHING",
        )
        .bind(uid)
        .bind(flavour.as_str())
        .bind(label)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("failed to save label", e))?;
        Ok(())
    }

    async fn unread_persistent_items(&self, uid: &str, flavour: Flavour) -> AppResult<i64> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT unread_persistent_items FROM feed_counters WHERE uid = $1 AND flavour = $2",
        )
        .bind(uid)
        .bind(flavour.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("failed to get unread persistent items", e))?;
        Ok(count.unwrap_or(0))
    }

    async fn update_unread_persistent_items_count(
        &self,
        uid: &str,
        flavour: Flavour,
    ) -> AppResult<i64> {
        sqlx::query_scalar(
            "INSERT INTO feed_counters (uid, flavour, unread_persistent_items, updated_at) \
             SELECT $1, $2, COUNT(*), NOW() FROM feed_documents \
             WHERE uid = $1 AND flavour = $2 AND kind = $3 AND parent_id = '' \
               AND (document->>'persistent')::boolean IS TRUE \
               AND document->>'status' <> 'DONE' \
               AND document->>'visibility' = 'SHOW' \
             ON CONFLICT (uid, flavour) DO UPDATE \
             SET unread_persistent_items = EXCLUDED.unread_persistent_items, updated_at = NOW() \
             RETURNING unread_persistent_items",
        )
        .bind(uid)
        .bind(flavour.as_str())
        .bind(KIND_ITEM)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("failed to update unread persistent items count", e))
    }
}
