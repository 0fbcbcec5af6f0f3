//! Pub/sub push endpoint.
//!
//! A non-2xx answer tells the bus to redeliver with backoff, so every
//! failure, including an unknown sender, is surfaced as an error status.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use engagement_pubsub::PubSubPayload;

use crate::error::ApiError;
use crate::state::AppState;

/// POST /pubsub
pub async fn receive_push(
    State(state): State<AppState>,
    Json(payload): Json<PubSubPayload>,
) -> Result<StatusCode, ApiError> {
    tracing::debug!(
        message_id = %payload.message_id(),
        subscription = %payload.subscription,
        "Push delivery received"
    );
    state.topic_router.route(&payload).await?;
    Ok(StatusCode::OK)
}
