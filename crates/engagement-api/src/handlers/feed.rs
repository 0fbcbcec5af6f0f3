//! Feed read handlers.

use axum::Json;
use axum::extract::{Path, Query, State};

use engagement_entity::feed::Feed;

use crate::dto::request::FeedQuery;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::FeedPath;
use crate::state::AppState;

/// GET /feed/{uid}/{flavour}
pub async fn get_feed(
    State(state): State<AppState>,
    Path(path): Path<FeedPath>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<ApiResponse<Feed>>, ApiError> {
    let scope = path.scope()?;
    let feed = state
        .feed_service
        .get_feed(&scope.uid, scope.flavour, query.is_anonymous, &query.filter())
        .await?;
    Ok(Json(ApiResponse::ok(feed)))
}

/// GET /feed/{uid}/{flavour}/thin
pub async fn get_thin_feed(
    State(state): State<AppState>,
    Path(path): Path<FeedPath>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<ApiResponse<Feed>>, ApiError> {
    let scope = path.scope()?;
    let feed = state
        .feed_service
        .get_thin_feed(&scope.uid, scope.flavour, query.is_anonymous)
        .await?;
    Ok(Json(ApiResponse::ok(feed)))
}
