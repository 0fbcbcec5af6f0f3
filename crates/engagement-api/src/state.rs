//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use engagement_core::config::AppConfig;
use engagement_service::{FeedService, ServiceRegistry, TopicRouter};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Feed use cases
    pub feed_service: Arc<FeedService>,
    /// Push-delivery router into the fan-out engine
    pub topic_router: Arc<TopicRouter>,
    /// Number of deployed topics
    pub topic_count: usize,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Build the state from the wired services.
    pub fn new(config: AppConfig, services: &ServiceRegistry) -> Self {
        Self {
            config: Arc::new(config),
            feed_service: Arc::clone(&services.feed),
            topic_router: Arc::clone(&services.router),
            topic_count: services.namer.topic_ids().len(),
            started_at: Instant::now(),
        }
    }
}
