//! Label handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::dto::request::SaveLabelRequest;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::FeedPath;
use crate::state::AppState;

/// GET /feed/{uid}/{flavour}/labels
pub async fn list_labels(
    State(state): State<AppState>,
    Path(path): Path<FeedPath>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let scope = path.scope()?;
    let labels = state.feed_service.labels(&scope.uid, scope.flavour).await?;
    Ok(Json(ApiResponse::ok(labels)))
}

/// POST /feed/{uid}/{flavour}/labels
pub async fn save_label(
    State(state): State<AppState>,
    Path(path): Path<FeedPath>,
    Json(req): Json<SaveLabelRequest>,
) -> Result<StatusCode, ApiError> {
    let scope = path.scope()?;
    state
        .feed_service
        .save_label(&scope.uid, scope.flavour, &req.label)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
