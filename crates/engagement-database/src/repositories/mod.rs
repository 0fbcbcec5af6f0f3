//! Concrete [`FeedRepository`](crate::FeedRepository) implementations.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryFeedRepository;
pub use postgres::PgFeedRepository;
