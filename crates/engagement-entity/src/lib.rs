//! # engagement-entity
//!
//! Domain entity models for the engagement service. Every struct in this
//! crate is either a persisted feed document (items, nudges, actions,
//! messages, events), a computed view (the feed), or a wire payload
//! exchanged over the notification bus. All entities derive `Debug`,
//! `Clone`, `Serialize`, `Deserialize`; publishable ones also derive
//! `validator::Validate`.

pub mod envelope;
pub mod feed;
pub mod notification;
pub mod validation;
