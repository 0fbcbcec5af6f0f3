//! Entity builders shared by unit tests.

use chrono::{Duration, Utc};

use engagement_entity::feed::item::action_names as item_actions;
use engagement_entity::feed::nudge::action_names as nudge_actions;
use engagement_entity::feed::{
    Action, ActionType, Event, EventContext, Item, Link, Message, NotificationBody, Nudge, Status,
    Visibility,
};

pub const ICON: &str = "https://example.com/icon.png";

pub fn action(id: &str, name: &str, action_type: ActionType) -> Action {
    Action {
        id: id.to_string(),
        sequence_number: 1,
        name: name.to_string(),
        icon: Link::image(ICON),
        action_type,
        handling: Default::default(),
        allow_anonymous: false,
    }
}

pub fn item(id: &str) -> Item {
    Item {
        id: id.to_string(),
        sequence_number: 1,
        expiry: Utc::now() + Duration::days(7),
        persistent: false,
        status: Status::Pending,
        visibility: Visibility::Show,
        icon: Link::image(ICON),
        author: "Care team".to_string(),
        tagline: "Your lab results are ready".to_string(),
        label: "RESULTS".to_string(),
        summary: "Lab results from your visit".to_string(),
        text: "Open the item to review your results".to_string(),
        text_type: Default::default(),
        links: Vec::new(),
        actions: vec![
            action("resolve", item_actions::RESOLVE, ActionType::Primary),
            action("pin", item_actions::PIN, ActionType::Secondary),
            action("hide", item_actions::HIDE, ActionType::Overflow),
        ],
        conversations: Vec::new(),
        users: vec!["user-1".to_string()],
        groups: Vec::new(),
        notification_channels: Vec::new(),
    }
}

pub fn nudge(id: &str) -> Nudge {
    Nudge {
        id: id.to_string(),
        sequence_number: 1,
        expiry: Utc::now() + Duration::days(7),
        status: Status::Pending,
        visibility: Visibility::Show,
        title: "Complete your profile".to_string(),
        text: "Add your date of birth".to_string(),
        links: Vec::new(),
        actions: vec![
            action("resolve", nudge_actions::RESOLVE, ActionType::Primary),
            action("hide", nudge_actions::HIDE, ActionType::Secondary),
        ],
        users: vec!["user-1".to_string()],
        groups: Vec::new(),
        notification_channels: Vec::new(),
        notification_body: NotificationBody {
            publish_message: "You have a new task".to_string(),
            resolve_message: "Task completed".to_string(),
        },
    }
}

pub fn message() -> Message {
    Message {
        id: String::new(),
        sequence_number: 0,
        text: "When is my next appointment?".to_string(),
        reply_to: None,
        posted_by_uid: "user-1".to_string(),
        posted_by_name: "Ann".to_string(),
        timestamp: None,
    }
}

pub fn event(name: &str) -> Event {
    Event {
        id: String::new(),
        name: name.to_string(),
        context: EventContext::default(),
        payload: Default::default(),
    }
}
