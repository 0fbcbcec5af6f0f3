//! Rejection of absent inputs before any I/O happens.

use engagement_core::error::AppError;
use engagement_core::result::AppResult;
use engagement_entity::feed::{Action, Event, Item, Message, Nudge};

/// Require a feed item to publish.
pub fn require_item(item: Option<Item>) -> AppResult<Item> {
    item.ok_or_else(|| AppError::invalid_input("can't publish nil feed item"))
}

/// Require a nudge to publish.
pub fn require_nudge(nudge: Option<Nudge>) -> AppResult<Nudge> {
    nudge.ok_or_else(|| AppError::invalid_input("can't publish nil nudge"))
}

/// Require an action to publish.
pub fn require_action(action: Option<Action>) -> AppResult<Action> {
    action.ok_or_else(|| AppError::invalid_input("can't publish nil action"))
}

/// Require a message to post.
pub fn require_message(message: Option<Message>) -> AppResult<Message> {
    message.ok_or_else(|| AppError::invalid_input("can't post nil message"))
}

/// Require an event to process.
pub fn require_event(event: Option<Event>) -> AppResult<Event> {
    event.ok_or_else(|| AppError::invalid_input("can't process nil event"))
}
