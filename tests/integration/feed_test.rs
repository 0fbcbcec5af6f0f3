//! Integration tests for the feed REST surface.

mod helpers;

use axum::http::StatusCode;
use serde_json::{Value, json};

use engagement_core::Flavour;
use engagement_database::FeedRepository;
use engagement_entity::feed::{ActionType, Event, EventContext};
use engagement_pubsub::TopicId;

use helpers::{TestApp, UID};

const FEED: &str = "/feed/user-1/consumer";

fn action_names(body: &Value) -> Vec<String> {
    body["actions"]
        .as_array()
        .map(|actions| {
            actions
                .iter()
                .filter_map(|a| a["name"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn test_publish_pin_hide_delete_lifecycle() {
    let app = TestApp::new();

    let response = app
        .request("POST", &format!("{FEED}/items"), Some(helpers::json(&helpers::item("i-1"))))
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.data()["id"], "i-1");

    let response = app
        .request("PATCH", &format!("{FEED}/items/i-1/pin"), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["persistent"], true);
    assert_eq!(response.data()["sequenceNumber"], 2);
    assert!(action_names(response.data()).contains(&"UNPIN_ITEM".to_string()));

    let response = app
        .request("PATCH", &format!("{FEED}/items/i-1/hide"), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["visibility"], "HIDE");
    assert_eq!(response.data()["sequenceNumber"], 3);

    let response = app
        .request("GET", &format!("{FEED}?visibility=SHOW"), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["items"], json!([]));

    let response = app.request("DELETE", &format!("{FEED}/items/i-1"), None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app.request("GET", &format!("{FEED}/items/i-1"), None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    assert_eq!(app.bus.published(TopicId::ItemPublish).len(), 1);
    assert_eq!(app.bus.published(TopicId::ItemPin).len(), 1);
    assert_eq!(app.bus.published(TopicId::ItemHide).len(), 1);
    assert_eq!(app.bus.published(TopicId::ItemDelete).len(), 1);
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let app = TestApp::new();

    for _ in 0..2 {
        let response = app
            .request("DELETE", &format!("{FEED}/items/missing"), None)
            .await;
        assert_eq!(response.status, StatusCode::NO_CONTENT);
    }
    let response = app
        .request("DELETE", &format!("{FEED}/nudges/missing"), None)
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    assert!(app.bus.published(TopicId::ItemDelete).is_empty());
    assert!(app.bus.published(TopicId::NudgeDelete).is_empty());
}

#[tokio::test]
async fn test_nil_bodies_are_rejected() {
    let app = TestApp::new();

    for (path, message) in [
        ("items", "can't publish nil feed item"),
        ("nudges", "can't publish nil nudge"),
        ("actions", "can't publish nil action"),
        ("events", "can't process nil event"),
    ] {
        let response = app
            .request("POST", &format!("{FEED}/{path}"), Some(Value::Null))
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{path}");
        assert_eq!(response.body["error"], "INVALID_INPUT");
        assert!(
            response.body["message"]
                .as_str()
                .is_some_and(|m| m.contains(message)),
            "{path}: {}",
            response.body
        );
    }
    assert_eq!(app.bus.published_count(), 0);
}

#[tokio::test]
async fn test_floating_action_rejected_below_global_scope() {
    let app = TestApp::new();
    let mut item = helpers::item("i-1");
    item.actions
        .push(helpers::action("fab", "OPEN_CHAT", ActionType::Floating));

    let response = app
        .request("POST", &format!("{FEED}/items"), Some(helpers::json(&item)))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "INVALID_ACTION_SCOPE");
    assert!(app.bus.published(TopicId::ItemPublish).is_empty());

    let response = app
        .request(
            "POST",
            &format!("{FEED}/actions"),
            Some(helpers::json(&helpers::action(
                "fab",
                "OPEN_CHAT",
                ActionType::Floating,
            ))),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let response = app.request("GET", FEED, None).await;
    assert_eq!(response.data()["actions"][0]["id"], "fab");
}

#[tokio::test]
async fn test_invalid_item_is_a_validation_error() {
    let app = TestApp::new();
    let mut item = helpers::item("i-1");
    item.tagline = String::new();

    let response = app
        .request("POST", &format!("{FEED}/items"), Some(helpers::json(&item)))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION");
}

#[tokio::test]
async fn test_toggle_of_missing_item_is_not_found() {
    let app = TestApp::new();

    let response = app
        .request("PATCH", &format!("{FEED}/items/missing/resolve"), None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .request("PATCH", &format!("{FEED}/nudges/missing/hide"), None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_toggle_and_flavour_rejected() {
    let app = TestApp::new();
    app.request("POST", &format!("{FEED}/items"), Some(helpers::json(&helpers::item("i-1"))))
        .await;

    let response = app
        .request("PATCH", &format!("{FEED}/items/i-1/archive"), None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.request("GET", "/feed/user-1/admin", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_flavours_are_isolated() {
    let app = TestApp::new();
    app.request("POST", &format!("{FEED}/items"), Some(helpers::json(&helpers::item("i-1"))))
        .await;

    let response = app.request("GET", "/feed/user-1/pro/items/i-1", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app.request("GET", "/feed/user-1/pro", None).await;
    assert_eq!(response.data()["items"], json!([]));
    assert_ne!(
        response.data()["id"],
        app.request("GET", FEED, None).await.data()["id"]
    );
}

#[tokio::test]
async fn test_nudge_resolve_flips_actions() {
    let app = TestApp::new();
    let response = app
        .request("POST", &format!("{FEED}/nudges"), Some(helpers::json(&helpers::nudge("n-1"))))
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let response = app
        .request("PATCH", &format!("{FEED}/nudges/n-1/resolve"), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "DONE");
    assert!(action_names(response.data()).contains(&"UNRESOLVE_NUDGE".to_string()));
}

#[tokio::test]
async fn test_messages_require_parent_item() {
    let app = TestApp::new();
    let message = json!({
        "text": "When is my next appointment?",
        "postedByUid": UID,
        "postedByName": "Ann"
    });

    let response = app
        .request("POST", &format!("{FEED}/items/missing/messages"), Some(message.clone()))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    app.request("POST", &format!("{FEED}/items"), Some(helpers::json(&helpers::item("i-1"))))
        .await;
    let response = app
        .request("POST", &format!("{FEED}/items/i-1/messages"), Some(message))
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let message_id = response.data()["id"].as_str().unwrap().to_string();
    assert!(!message_id.is_empty());

    let response = app
        .request(
            "DELETE",
            &format!("{FEED}/items/i-1/messages/{message_id}"),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert_eq!(app.bus.published(TopicId::MessageDelete).len(), 1);
}

#[tokio::test]
async fn test_event_flavour_mismatch_rejected() {
    let app = TestApp::new();
    let event = Event {
        id: String::new(),
        name: "APPOINTMENT_BOOKED".to_string(),
        context: EventContext {
            flavour: Some(Flavour::Pro),
            ..Default::default()
        },
        payload: Default::default(),
    };

    let response = app
        .request("POST", &format!("{FEED}/events"), Some(helpers::json(&event)))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.repository.incoming_event_count(), 0);

    let event = Event {
        context: EventContext::default(),
        ..event
    };
    let response = app
        .request("POST", &format!("{FEED}/events"), Some(helpers::json(&event)))
        .await;
    assert_eq!(response.status, StatusCode::ACCEPTED);
    assert_eq!(response.data()["context"]["userId"], UID);
    assert_eq!(app.repository.incoming_event_count(), 1);
}

#[tokio::test]
async fn test_labels_and_unread_counter() {
    let app = TestApp::new();

    let response = app
        .request("POST", &format!("{FEED}/labels"), Some(json!({"label": "  "})))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request("POST", &format!("{FEED}/labels"), Some(json!({"label": "RESULTS"})))
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app.request("GET", &format!("{FEED}/labels"), None).await;
    assert_eq!(response.data(), &json!(["RESULTS"]));

    let mut item = helpers::item("i-1");
    item.persistent = true;
    app.request("POST", &format!("{FEED}/items"), Some(helpers::json(&item)))
        .await;

    let response = app
        .request("POST", &format!("{FEED}/unread_persistent_items"), None)
        .await;
    assert_eq!(response.data()["unreadPersistentItems"], 1);

    let response = app
        .request("GET", &format!("{FEED}/unread_persistent_items"), None)
        .await;
    assert_eq!(response.data()["unreadPersistentItems"], 1);
    assert_eq!(
        app.repository
            .unread_persistent_items(UID, Flavour::Consumer)
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let response = app.request("GET", "/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "ok");
    assert_eq!(response.data()["topics"], TopicId::ALL.len());
}
