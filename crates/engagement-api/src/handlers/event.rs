//! Incoming event handler.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use engagement_entity::feed::Event;
use engagement_service::feed::require_event;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::FeedPath;
use crate::state::AppState;

/// POST /feed/{uid}/{flavour}/events
pub async fn process_event(
    State(state): State<AppState>,
    Path(path): Path<FeedPath>,
    Json(event): Json<Option<Event>>,
) -> Result<(StatusCode, Json<ApiResponse<Event>>), ApiError> {
    let scope = path.scope()?;
    let event = state
        .feed_service
        .process_event(&scope.uid, scope.flavour, require_event(event)?)
        .await?;
    Ok((StatusCode::ACCEPTED, Json(ApiResponse::ok(event))))
}
