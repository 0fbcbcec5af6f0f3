//! # engagement-api
//!
//! HTTP API layer for the engagement service built on Axum.
//!
//! Exposes the feed use cases over REST, the pub/sub push endpoint that feeds
//! the fan-out engine, middleware (CORS, request logging), extractors, DTOs
//! and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
