//! Feed item handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use engagement_core::error::AppError;
use engagement_entity::feed::Item;
use engagement_service::ItemToggle;
use engagement_service::feed::require_item;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{FeedPath, ResourcePath, TogglePath};
use crate::state::AppState;

/// GET /feed/{uid}/{flavour}/items/{id}
pub async fn get_item(
    State(state): State<AppState>,
    Path(path): Path<ResourcePath>,
) -> Result<Json<ApiResponse<Item>>, ApiError> {
    let (scope, id) = path.scope()?;
    let item = state
        .feed_service
        .get_feed_item(&scope.uid, scope.flavour, &id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("feed item '{id}' not found")))?;
    Ok(Json(ApiResponse::ok(item)))
}

/// POST /feed/{uid}/{flavour}/items
pub async fn publish_item(
    State(state): State<AppState>,
    Path(path): Path<FeedPath>,
    Json(item): Json<Option<Item>>,
) -> Result<(StatusCode, Json<ApiResponse<Item>>), ApiError> {
    let scope = path.scope()?;
    let item = require_item(item)?;
    let item = state
        .feed_service
        .publish_feed_item(&scope.uid, scope.flavour, item)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(item))))
}

/// DELETE /feed/{uid}/{flavour}/items/{id}
pub async fn delete_item(
    State(state): State<AppState>,
    Path(path): Path<ResourcePath>,
) -> Result<StatusCode, ApiError> {
    let (scope, id) = path.scope()?;
    state
        .feed_service
        .delete_feed_item(&scope.uid, scope.flavour, &id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /feed/{uid}/{flavour}/items/{id}/{op}
pub async fn toggle_item(
    State(state): State<AppState>,
    Path(path): Path<TogglePath>,
) -> Result<Json<ApiResponse<Item>>, ApiError> {
    let toggle: ItemToggle = path.op.parse()?;
    let (scope, id) = ResourcePath {
        uid: path.uid,
        flavour: path.flavour,
        id: path.id,
    }
    .scope()?;
    let item = state
        .feed_service
        .toggle_feed_item(&scope.uid, scope.flavour, &id, toggle)
        .await?;
    Ok(Json(ApiResponse::ok(item)))
}
