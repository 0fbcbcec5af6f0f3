//! Global action handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use engagement_core::error::AppError;
use engagement_entity::feed::Action;
use engagement_service::feed::require_action;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{FeedPath, ResourcePath};
use crate::state::AppState;

/// GET /feed/{uid}/{flavour}/actions/{id}
pub async fn get_action(
    State(state): State<AppState>,
    Path(path): Path<ResourcePath>,
) -> Result<Json<ApiResponse<Action>>, ApiError> {
    let (scope, id) = path.scope()?;
    let action = state
        .feed_service
        .get_action(&scope.uid, scope.flavour, &id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("action '{id}' not found")))?;
    Ok(Json(ApiResponse::ok(action)))
}

/// POST /feed/{uid}/{flavour}/actions
pub async fn publish_action(
    State(state): State<AppState>,
    Path(path): Path<FeedPath>,
    Json(action): Json<Option<Action>>,
) -> Result<(StatusCode, Json<ApiResponse<Action>>), ApiError> {
    let scope = path.scope()?;
    let action = state
        .feed_service
        .publish_action(&scope.uid, scope.flavour, require_action(action)?)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(action))))
}

/// DELETE /feed/{uid}/{flavour}/actions/{id}
pub async fn delete_action(
    State(state): State<AppState>,
    Path(path): Path<ResourcePath>,
) -> Result<StatusCode, ApiError> {
    let (scope, id) = path.scope()?;
    state
        .feed_service
        .delete_action(&scope.uid, scope.flavour, &id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
