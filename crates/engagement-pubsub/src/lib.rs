//! # engagement-pubsub
//!
//! Notification bus for the engagement service:
//!
//! - the logical topic catalogue and its namespacing rules
//! - the [`NotificationService`] contract used by the feed engine
//! - the push wire payload exchanged with the bus
//! - an in-memory bus that provisions topics and subscriptions
//! - a delivery runner with ack deadline, exponential backoff and dead letters

pub mod delivery;
pub mod memory;
pub mod service;
pub mod topics;
pub mod wire;

pub use delivery::{DeadLetter, DeadLetterStore, DeliveryRunner, MessageHandler};
pub use memory::InMemoryBus;
pub use service::NotificationService;
pub use topics::{TopicId, TopicNamer};
pub use wire::{PubSubMessage, PubSubPayload};
