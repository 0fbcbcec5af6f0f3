//! Nudge handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use engagement_core::error::AppError;
use engagement_entity::feed::Nudge;
use engagement_service::NudgeToggle;
use engagement_service::feed::require_nudge;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{FeedPath, ResourcePath, TogglePath};
use crate::state::AppState;

/// GET /feed/{uid}/{flavour}/nudges/{id}
pub async fn get_nudge(
    State(state): State<AppState>,
    Path(path): Path<ResourcePath>,
) -> Result<Json<ApiResponse<Nudge>>, ApiError> {
    let (scope, id) = path.scope()?;
    let nudge = state
        .feed_service
        .get_nudge(&scope.uid, scope.flavour, &id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("nudge '{id}' not found")))?;
    Ok(Json(ApiResponse::ok(nudge)))
}

/// POST /feed/{uid}/{flavour}/nudges
pub async fn publish_nudge(
    State(state): State<AppState>,
    Path(path): Path<FeedPath>,
    Json(nudge): Json<Option<Nudge>>,
) -> Result<(StatusCode, Json<ApiResponse<Nudge>>), ApiError> {
    let scope = path.scope()?;
    let nudge = require_nudge(nudge)?;
    let nudge = state
        .feed_service
        .publish_nudge(&scope.uid, scope.flavour, nudge)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(nudge))))
}

/// DELETE /feed/{uid}/{flavour}/nudges/{id}
pub async fn delete_nudge(
    State(state): State<AppState>,
    Path(path): Path<ResourcePath>,
) -> Result<StatusCode, ApiError> {
    let (scope, id) = path.scope()?;
    state
        .feed_service
        .delete_nudge(&scope.uid, scope.flavour, &id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /feed/{uid}/{flavour}/nudges/{id}/{op}
pub async fn toggle_nudge(
    State(state): State<AppState>,
    Path(path): Path<TogglePath>,
) -> Result<Json<ApiResponse<Nudge>>, ApiError> {
    let toggle: NudgeToggle = path.op.parse()?;
    let (scope, id) = ResourcePath {
        uid: path.uid,
        flavour: path.flavour,
        id: path.id,
    }
    .scope()?;
    let nudge = state
        .feed_service
        .toggle_nudge(&scope.uid, scope.flavour, &id, toggle)
        .await?;
    Ok(Json(ApiResponse::ok(nudge)))
}
