//! Payloads handed to outbound notification channels.

pub mod email;
pub mod fcm;

pub use email::EmailPayload;
pub use fcm::{FirebaseSimpleNotification, SendNotificationPayload};
