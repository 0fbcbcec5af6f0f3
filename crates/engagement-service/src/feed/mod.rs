//! Feed use cases.

pub mod guards;
pub mod service;
pub mod toggle;

pub use guards::{require_action, require_event, require_item, require_message, require_nudge};
pub use service::FeedService;
pub use toggle::{ItemToggle, NudgeToggle, Transition};
