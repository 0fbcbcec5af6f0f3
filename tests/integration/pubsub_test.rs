//! Integration tests for the pub/sub push endpoint and notification fan-out.

mod helpers;

use std::collections::HashMap;

use axum::http::StatusCode;

use engagement_core::config::AppConfig;
use engagement_entity::feed::Channel;
use engagement_pubsub::{PubSubMessage, PubSubPayload, TopicId};

use helpers::{TestApp, UID};

const FEED: &str = "/feed/user-1/consumer";

fn all_ok(responses: &[helpers::TestResponse]) -> bool {
    !responses.is_empty() && responses.iter().all(|r| r.status == StatusCode::OK)
}

#[tokio::test]
async fn test_persistent_item_publish_pushes_to_registered_devices() {
    let app = TestApp::new();
    app.register_devices(UID);
    let mut item = helpers::item("i-1");
    item.persistent = true;
    item.users = vec![UID.to_string(), "user-without-devices".to_string()];

    app.request("POST", &format!("{FEED}/items"), Some(helpers::json(&item)))
        .await;
    assert!(all_ok(&app.deliver(TopicId::ItemPublish).await));

    let pushes = app.push.sent();
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0].registration_tokens, vec!["user-1-device".to_string()]);
    assert!(pushes[0].data.contains_key("ITEM_PUBLISHED"));
    let notification = pushes[0].notification.as_ref().unwrap();
    assert_eq!(notification.title, "Your lab results are ready");

    let response = app.request("GET", &format!("{FEED}/labels"), None).await;
    assert_eq!(response.data(), &serde_json::json!(["RESULTS"]));
    let response = app
        .request("GET", &format!("{FEED}/unread_persistent_items"), None)
        .await;
    assert_eq!(response.data()["unreadPersistentItems"], 1);
}

#[tokio::test]
async fn test_transient_item_and_toggles_do_not_push() {
    let app = TestApp::new();
    app.register_devices(UID);

    app.request("POST", &format!("{FEED}/items"), Some(helpers::json(&helpers::item("i-1"))))
        .await;
    app.request("PATCH", &format!("{FEED}/items/i-1/pin"), None)
        .await;

    assert!(all_ok(&app.deliver(TopicId::ItemPublish).await));
    assert!(all_ok(&app.deliver(TopicId::ItemPin).await));
    assert!(app.push.sent().is_empty());
}

#[tokio::test]
async fn test_nudge_publish_and_resolve_push_their_bodies() {
    let app = TestApp::new();
    app.register_devices(UID);

    app.request("POST", &format!("{FEED}/nudges"), Some(helpers::json(&helpers::nudge("n-1"))))
        .await;
    app.request("PATCH", &format!("{FEED}/nudges/n-1/resolve"), None)
        .await;
    app.request("PATCH", &format!("{FEED}/nudges/n-1/hide"), None)
        .await;

    assert!(all_ok(&app.deliver(TopicId::NudgePublish).await));
    assert!(all_ok(&app.deliver(TopicId::NudgeResolve).await));
    assert!(all_ok(&app.deliver(TopicId::NudgeHide).await));

    let bodies: Vec<String> = app
        .push
        .sent()
        .into_iter()
        .filter_map(|p| p.notification.map(|n| n.body))
        .collect();
    assert_eq!(bodies, vec!["You have a new task", "Task completed"]);
}

#[tokio::test]
async fn test_email_channel_item_is_mailed() {
    let app = TestApp::new();
    app.register_devices(UID);
    let mut item = helpers::item("i-1");
    item.notification_channels = vec![Channel::Email];

    app.request("POST", &format!("{FEED}/items"), Some(helpers::json(&item)))
        .await;
    assert!(all_ok(&app.deliver(TopicId::ItemPublish).await));
    assert!(all_ok(&app.deliver(TopicId::SendEmail).await));

    let emails = app.mail.sent();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].to, vec!["user-1@example.com".to_string()]);
    assert_eq!(emails[0].subject, "Your lab results are ready");
}

#[tokio::test]
async fn test_inbox_count_push_goes_through_send_notification() {
    let mut config = AppConfig::default();
    config.notifications.inbox_count_push_enabled = true;
    let app = TestApp::with_config(config);
    app.register_devices(UID);

    app.request("POST", &format!("{FEED}/items"), Some(helpers::json(&helpers::item("i-1"))))
        .await;
    assert!(all_ok(&app.deliver(TopicId::ItemPublish).await));
    assert!(app.push.sent().is_empty());

    assert!(all_ok(&app.deliver(TopicId::SendNotification).await));
    let pushes = app.push.sent();
    assert_eq!(pushes.len(), 1);
    assert!(pushes[0].notification.is_none());
    assert_eq!(pushes[0].data["unreadPersistentItems"], "0");
}

#[tokio::test]
async fn test_retrieval_deliveries_are_acknowledged() {
    let app = TestApp::new();
    app.request("POST", &format!("{FEED}/items"), Some(helpers::json(&helpers::item("i-1"))))
        .await;
    app.request("GET", &format!("{FEED}/items/i-1"), None).await;
    app.request("GET", FEED, None).await;

    assert!(all_ok(&app.deliver(TopicId::ItemRetrieval).await));
    assert!(all_ok(&app.deliver(TopicId::FeedRetrieval).await));
    assert!(app.push.sent().is_empty());
}

#[tokio::test]
async fn test_unknown_sender_is_not_acknowledged() {
    let app = TestApp::new();
    let payload = PubSubPayload {
        subscription: "some-other-service-subscription".to_string(),
        message: PubSubMessage::new("some-other-topic", b"{}", HashMap::new()),
    };

    let response = app
        .request("POST", "/pubsub", Some(helpers::json(&payload)))
        .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["error"], "UNEXPECTED_SENDER");
}

#[tokio::test]
async fn test_malformed_envelope_is_not_acknowledged() {
    let app = TestApp::new();
    let topic = app.bus.namer().namespaced(TopicId::ItemPublish);
    let payload = PubSubPayload {
        subscription: app.bus.namer().subscription_id(TopicId::ItemPublish),
        message: PubSubMessage::new(&topic, b"not an envelope", HashMap::new()),
    };

    let response = app
        .request("POST", "/pubsub", Some(helpers::json(&payload)))
        .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["error"], "SERIALIZATION");
}
