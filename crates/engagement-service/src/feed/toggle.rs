//! State transitions of items and nudges.
//!
//! Every transition is a row in a table: the field change it makes, the
//! action name it flips and its inverse, and the topic it is announced on.

use std::fmt;
use std::str::FromStr;

use engagement_core::error::AppError;
use engagement_entity::feed::item::action_names as item_actions;
use engagement_entity::feed::nudge::action_names as nudge_actions;
use engagement_entity::feed::{Item, Nudge, Status, Toggleable, Visibility};
use engagement_pubsub::TopicId;

/// One row of the transition table.
#[derive(Debug, Clone)]
pub struct Transition<T> {
    /// Field change.
    pub apply: fn(&mut T),
    /// Action name offered before the transition.
    pub from: &'static str,
    /// Action name offered after the transition.
    pub to: &'static str,
    /// Topic announcing the transition.
    pub topic: TopicId,
}

impl<T: Toggleable> Transition<T> {
    /// Apply the field change, bump the sequence number and flip actions.
    pub fn run(&self, entry: &mut T) {
        (self.apply)(entry);
        entry.advance(self.from, self.to);
    }
}

/// Item state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemToggle {
    Resolve,
    Unresolve,
    Pin,
    Unpin,
    Hide,
    Show,
}

impl ItemToggle {
    /// Every item transition.
    pub const ALL: [ItemToggle; 6] = [
        Self::Resolve,
        Self::Unresolve,
        Self::Pin,
        Self::Unpin,
        Self::Hide,
        Self::Show,
    ];

    /// Table row for this transition.
    pub fn transition(self) -> Transition<Item> {
        match self {
            Self::Resolve => Transition {
                apply: |i| i.status = Status::Done,
                from: item_actions::RESOLVE,
                to: item_actions::UNRESOLVE,
                topic: TopicId::ItemResolve,
            },
            Self::Unresolve => Transition {
                apply: |i| i.status = Status::Pending,
                from: item_actions::UNRESOLVE,
                to: item_actions::RESOLVE,
                topic: TopicId::ItemUnresolve,
            },
            Self::Pin => Transition {
                apply: |i| i.persistent = true,
                from: item_actions::PIN,
                to: item_actions::UNPIN,
                topic: TopicId::ItemPin,
            },
            Self::Unpin => Transition {
                apply: |i| i.persistent = false,
                from: item_actions::UNPIN,
                to: item_actions::PIN,
                topic: TopicId::ItemUnpin,
            },
            Self::Hide => Transition {
                apply: |i| i.visibility = Visibility::Hide,
                from: item_actions::HIDE,
                to: item_actions::SHOW,
                topic: TopicId::ItemHide,
            },
            Self::Show => Transition {
                apply: |i| i.visibility = Visibility::Show,
                from: item_actions::SHOW,
                to: item_actions::HIDE,
                topic: TopicId::ItemShow,
            },
        }
    }

    /// Path segment naming this transition.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Resolve => "resolve",
            Self::Unresolve => "unresolve",
            Self::Pin => "pin",
            Self::Unpin => "unpin",
            Self::Hide => "hide",
            Self::Show => "show",
        }
    }
}

impl fmt::Display for ItemToggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemToggle {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| AppError::invalid_input(format!("unknown item operation '{s}'")))
    }
}

/// Nudge state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NudgeToggle {
    Resolve,
    Unresolve,
    Hide,
    Show,
}

impl NudgeToggle {
    /// Every nudge transition.
    pub const ALL: [NudgeToggle; 4] = [Self::Resolve, Self::Unresolve, Self::Hide, Self::Show];

    /// Table row for this transition.
    pub fn transition(self) -> Transition<Nudge> {
        match self {
            Self::Resolve => Transition {
                apply: |n| n.status = Status::Done,
                from: nudge_actions::RESOLVE,
                to: nudge_actions::UNRESOLVE,
                topic: TopicId::NudgeResolve,
            },
            Self::Unresolve => Transition {
                apply: |n| n.status = Status::Pending,
                from: nudge_actions::UNRESOLVE,
                to: nudge_actions::RESOLVE,
                topic: TopicId::NudgeUnresolve,
            },
            Self::Hide => Transition {
                apply: |n| n.visibility = Visibility::Hide,
                from: nudge_actions::HIDE,
                to: nudge_actions::SHOW,
                topic: TopicId::NudgeHide,
            },
            Self::Show => Transition {
                apply: |n| n.visibility = Visibility::Show,
                from: nudge_actions::SHOW,
                to: nudge_actions::HIDE,
                topic: TopicId::NudgeShow,
            },
        }
    }

    /// Path segment naming this transition.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Resolve => "resolve",
            Self::Unresolve => "unresolve",
            Self::Hide => "hide",
            Self::Show => "show",
        }
    }
}

impl fmt::Display for NudgeToggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NudgeToggle {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| AppError::invalid_input(format!("unknown nudge operation '{s}'")))
    }
}
