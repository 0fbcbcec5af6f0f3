//! Route definitions for the engagement HTTP API.
//!
//! Feed routes are scoped by owner: `/feed/{uid}/{flavour}/...`. The
//! router receives `AppState` and passes it to all handlers via Axum's
//! `State` extractor.

use axum::Router;
use axum::routing::{get, patch, post};

use crate::handlers;
use crate::state::AppState;

/// Build the route table. Middleware is applied by [`crate::app::build_app`].
pub fn build_router() -> Router<AppState> {
    Router::new()
        .merge(feed_routes())
        .merge(item_routes())
        .merge(nudge_routes())
        .merge(action_routes())
        .merge(inbox_routes())
        .route("/pubsub", post(handlers::pubsub::receive_push))
        .route("/health", get(handlers::health::health))
}

fn feed_routes() -> Router<AppState> {
    Router::new()
        .route("/feed/{uid}/{flavour}", get(handlers::feed::get_feed))
        .route("/feed/{uid}/{flavour}/thin", get(handlers::feed::get_thin_feed))
        .route(
            "/feed/{uid}/{flavour}/events",
            post(handlers::event::process_event),
        )
}

fn item_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/feed/{uid}/{flavour}/items",
            post(handlers::item::publish_item),
        )
        .route(
            "/feed/{uid}/{flavour}/items/{id}",
            get(handlers::item::get_item).delete(handlers::item::delete_item),
        )
        .route(
            "/feed/{uid}/{flavour}/items/{id}/{op}",
            patch(handlers::item::toggle_item),
        )
        .route(
            "/feed/{uid}/{flavour}/items/{id}/messages",
            post(handlers::message::post_message),
        )
        .route(
            "/feed/{uid}/{flavour}/items/{id}/messages/{message_id}",
            axum::routing::delete(handlers::message::delete_message),
        )
}

fn nudge_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/feed/{uid}/{flavour}/nudges",
            post(handlers::nudge::publish_nudge),
        )
        .route(
            "/feed/{uid}/{flavour}/nudges/{id}",
            get(handlers::nudge::get_nudge).delete(handlers::nudge::delete_nudge),
        )
        .route(
            "/feed/{uid}/{flavour}/nudges/{id}/{op}",
            patch(handlers::nudge::toggle_nudge),
        )
}

fn action_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/feed/{uid}/{flavour}/actions",
            post(handlers::action::publish_action),
        )
        .route(
            "/feed/{uid}/{flavour}/actions/{id}",
            get(handlers::action::get_action).delete(handlers::action::delete_action),
        )
}

fn inbox_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/feed/{uid}/{flavour}/labels",
            get(handlers::label::list_labels).post(handlers::label::save_label),
        )
        .route(
            "/feed/{uid}/{flavour}/unread_persistent_items",
            get(handlers::unread::get_unread_count).post(handlers::unread::update_unread_count),
        )
}
