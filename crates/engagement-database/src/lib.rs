//! # engagement-database
//!
//! Persistence for the engagement service: the [`FeedRepository`] contract,
//! an in-memory implementation used in development and tests, and a
//! PostgreSQL implementation storing feed documents as JSONB.

pub mod connection;
pub mod migration;
pub mod provider;
pub mod repositories;
pub mod repository;

pub use connection::DatabasePool;
pub use provider::build_repository;
pub use repositories::{InMemoryFeedRepository, PgFeedRepository};
pub use repository::FeedRepository;
