//! Feed domain entities.

pub mod action;
pub mod enums;
pub mod event;
pub mod filter;
pub mod item;
pub mod link;
pub mod message;
pub mod model;
pub mod nudge;

pub use action::Action;
pub use enums::{ActionType, BooleanFilter, Channel, Handling, LinkType, Status, TextType, Visibility};
pub use event::{Event, EventContext, EventPayload};
pub use filter::{FeedFilter, FilterParams};
pub use item::Item;
pub use link::Link;
pub use message::Message;
pub use model::Feed;
pub use nudge::{NotificationBody, Nudge};

/// A feed entry whose state transitions flip its embedded actions.
///
/// Every transition increments the entry's sequence number by one and
/// renames each action called `from` to `to`, bumping that action's own
/// sequence number.
pub trait Toggleable {
    /// Entry identifier.
    fn id(&self) -> &str;

    /// Current sequence number.
    fn sequence_number(&self) -> i64;

    /// Mutable access to the sequence number.
    fn sequence_number_mut(&mut self) -> &mut i64;

    /// Mutable access to the embedded actions.
    fn actions_mut(&mut self) -> &mut Vec<Action>;

    /// Increment the sequence number and flip every action named `from`.
    ///
    /// Returns the number of actions renamed.
    fn advance(&mut self, from: &str, to: &str) -> usize {
        *self.sequence_number_mut() += 1;

        let mut flipped = 0;
        for action in self.actions_mut().iter_mut().filter(|a| a.name == from) {
            action.name = to.to_string();
            action.sequence_number += 1;
            flipped += 1;
        }
        flipped
    }
}
