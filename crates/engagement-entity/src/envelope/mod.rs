//! Wire envelope carried on the notification bus.

pub mod model;

pub use model::{EnvelopePayload, NotificationEnvelope, metadata_keys};
