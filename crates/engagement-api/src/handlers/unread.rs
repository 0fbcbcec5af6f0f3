//! Unread persistent item counter handlers.

use axum::Json;
use axum::extract::{Path, State};

use crate::dto::response::{ApiResponse, UnreadCountResponse};
use crate::error::ApiError;
use crate::extractors::FeedPath;
use crate::state::AppState;

/// GET /feed/{uid}/{flavour}/unread_persistent_items
pub async fn get_unread_count(
    State(state): State<AppState>,
    Path(path): Path<FeedPath>,
) -> Result<Json<ApiResponse<UnreadCountResponse>>, ApiError> {
    let scope = path.scope()?;
    let unread_persistent_items = state
        .feed_service
        .unread_persistent_items(&scope.uid, scope.flavour)
        .await?;
    Ok(Json(ApiResponse::ok(UnreadCountResponse {
        unread_persistent_items,
    })))
}

/// POST /feed/{uid}/{flavour}/unread_persistent_items
pub async fn update_unread_count(
    State(state): State<AppState>,
    Path(path): Path<FeedPath>,
) -> Result<Json<ApiResponse<UnreadCountResponse>>, ApiError> {
    let scope = path.scope()?;
    let unread_persistent_items = state
        .feed_service
        .update_unread_persistent_items_count(&scope.uid, scope.flavour)
        .await?;
    Ok(Json(ApiResponse::ok(UnreadCountResponse {
        unread_persistent_items,
    })))
}
