//! # engagement-service
//!
//! Business logic for the engagement service:
//!
//! - [`FeedService`]: the feed use cases (publish, toggle, delete, read)
//! - [`FanoutService`]: turns bus messages into pushes, emails and inbox
//!   counter updates
//! - [`TopicRouter`]: resolves the sender of a delivered message
//! - outbound channels for FCM, mail and the profile service
//!
//! Services follow constructor injection; [`ServiceRegistry`] wires them.

pub mod channels;
pub mod fanout;
pub mod feed;
pub mod registry;

#[cfg(test)]
mod fixtures;

pub use channels::{Channels, MailChannel, ProfileDirectory, PushChannel};
pub use fanout::{FanoutService, Sender, TopicRouter};
pub use feed::{FeedService, ItemToggle, NudgeToggle};
pub use registry::ServiceRegistry;
