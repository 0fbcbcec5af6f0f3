//! Conversation handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use engagement_entity::feed::Message;
use engagement_service::feed::require_message;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{FeedPath, MessagePath, ResourcePath};
use crate::state::AppState;

/// POST /feed/{uid}/{flavour}/items/{id}/messages
pub async fn post_message(
    State(state): State<AppState>,
    Path(path): Path<ResourcePath>,
    Json(message): Json<Option<Message>>,
) -> Result<(StatusCode, Json<ApiResponse<Message>>), ApiError> {
    let (scope, item_id) = path.scope()?;
    let message = state
        .feed_service
        .post_message(&scope.uid, scope.flavour, &item_id, require_message(message)?)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(message))))
}

/// DELETE /feed/{uid}/{flavour}/items/{id}/messages/{message_id}
pub async fn delete_message(
    State(state): State<AppState>,
    Path(path): Path<MessagePath>,
) -> Result<StatusCode, ApiError> {
    let scope = FeedPath {
        uid: path.uid,
        flavour: path.flavour,
    }
    .scope()?;
    state
        .feed_service
        .delete_message(&scope.uid, scope.flavour, &path.id, &path.message_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
