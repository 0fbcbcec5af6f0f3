//! Structural validation of publishable elements.
//!
//! Field-level rules live on the entities as `validator` derives; this module
//! adds the cross-field rules and turns failures into [`AppError`]s.

use validator::Validate;

use engagement_core::error::AppError;
use engagement_core::result::AppResult;

use crate::feed::Action;

/// Error text returned when a floating action is embedded below the feed.
pub const FLOATING_ACTION_SCOPE_MESSAGE: &str =
    "floating actions are only allowed at the global level";

/// Validate a publishable element, naming it in the error message.
pub fn validate_element<T: Validate>(element: &T, what: &str) -> AppResult<()> {
    element
        .validate()
        .map_err(|e| AppError::from(e).context(format!("invalid {what}")))
}

/// Reject floating actions embedded inside an item or nudge.
pub fn ensure_no_floating_actions(actions: &[Action], owner: &str) -> AppResult<()> {
    match actions.iter().find(|a| a.is_floating()) {
        Some(action) => Err(AppError::invalid_action_scope(format!(
            "{owner} action '{}': {FLOATING_ACTION_SCOPE_MESSAGE}",
            action.id
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use engagement_core::error::ErrorKind;

    use super::*;
    use crate::feed::{ActionType, Item, Link, Message};

    fn action(action_type: ActionType) -> Action {
        Action {
            id: "action-1".to_string(),
            sequence_number: 1,
            name: "RESOLVE_ITEM".to_string(),
            icon: Link::image("https://example.com/icon.png"),
            action_type,
            handling: Default::default(),
            allow_anonymous: false,
        }
    }

    fn item() -> Item {
        Item {
            id: "item-1".to_string(),
            sequence_number: 1,
            expiry: Utc::now() + Duration::days(1),
            persistent: false,
            status: Default::default(),
            visibility: Default::default(),
            icon: Link::image("https://example.com/icon.png"),
            author: "Care team".to_string(),
            tagline: "Your results are ready".to_string(),
            label: "WELCOME".to_string(),
            summary: "Lab results".to_string(),
            text: "Open to view your results".to_string(),
            text_type: Default::default(),
            links: Vec::new(),
            actions: vec![action(ActionType::Primary)],
            conversations: Vec::new(),
            users: Vec::new(),
            groups: Vec::new(),
            notification_channels: Vec::new(),
        }
    }

    #[test]
    fn test_valid_item_passes() {
        assert!(validate_element(&item(), "feed item").is_ok());
    }

    #[test]
    fn test_missing_tagline_is_validation_error() {
        let mut item = item();
        item.tagline.clear();
        let err = validate_element(&item, "feed item").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.message.starts_with("invalid feed item"));
    }

    #[test]
    fn test_nested_action_and_link_are_validated() {
        let mut item = item();
        item.actions[0].name.clear();
        assert!(validate_element(&item, "feed item").is_err());

        let mut item = self::item();
        item.icon.url = "not a url".to_string();
        assert!(validate_element(&item, "feed item").is_err());
    }

    #[test]
    fn test_zero_sequence_number_rejected() {
        let mut item = item();
        item.sequence_number = 0;
        assert!(validate_element(&item, "feed item").is_err());
    }

    #[test]
    fn test_message_requires_author() {
        let message = Message {
            id: "m-1".to_string(),
            sequence_number: 1,
            text: "hello".to_string(),
            reply_to: None,
            posted_by_uid: String::new(),
            posted_by_name: "Ann".to_string(),
            timestamp: None,
        };
        assert!(validate_element(&message, "message").is_err());
    }

    #[test]
    fn test_floating_action_rejected() {
        let actions = vec![action(ActionType::Primary), action(ActionType::Floating)];
        let err = ensure_no_floating_actions(&actions, "feed item").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidActionScope);
        assert!(err.message.contains(FLOATING_ACTION_SCOPE_MESSAGE));
    }

    #[test]
    fn test_non_floating_actions_accepted() {
        let actions = vec![action(ActionType::Primary), action(ActionType::Secondary)];
        assert!(ensure_no_floating_actions(&actions, "nudge").is_ok());
    }
}
