//! Request extractors.

pub mod path;

pub use path::{FeedPath, FeedScope, MessagePath, ResourcePath, TogglePath};
