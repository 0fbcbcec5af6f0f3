//! Notification fan-out: from bus messages to pushes, emails and counters.

pub mod router;
pub mod sender;
pub mod service;

pub use router::TopicRouter;
pub use sender::{
    ActionSender, ItemSender, MessageSender, NudgeSender, RetrievalSender, Sender,
};
pub use service::FanoutService;
