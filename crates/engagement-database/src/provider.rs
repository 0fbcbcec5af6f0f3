//! Repository selection from configuration.

use std::sync::Arc;

use tracing::info;

use engagement_core::config::DatabaseConfig;
use engagement_core::error::AppError;
use engagement_core::result::AppResult;

use crate::connection::DatabasePool;
use crate::migration::run_migrations;
use crate::repositories::{InMemoryFeedRepository, PgFeedRepository};
use crate::repository::FeedRepository;

/// Build the repository named by `config.provider`.
pub async fn build_repository(config: &DatabaseConfig) -> AppResult<Arc<dyn FeedRepository>> {
    match config.provider.as_str() {
        "memory" => {
            info!("Initializing in-memory feed repository");
            Ok(Arc::new(InMemoryFeedRepository::new()))
        }
        "postgres" => {
            info!("Initializing PostgreSQL feed repository");
            let db = DatabasePool::connect(config).await?;
            run_migrations(db.pool()).await?;
            Ok(Arc::new(PgFeedRepository::new(db.pool().clone())))
        }
        other => Err(AppError::configuration(format!(
            "unknown database provider: '{other}'. Supported: memory, postgres"
        ))),
    }
}
