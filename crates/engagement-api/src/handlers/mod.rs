//! HTTP handlers, one module per feed resource.

pub mod action;
pub mod event;
pub mod feed;
pub mod health;
pub mod item;
pub mod label;
pub mod message;
pub mod nudge;
pub mod pubsub;
pub mod unread;
