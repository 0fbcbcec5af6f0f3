//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use serde_json::Value;
use tower::ServiceExt;

use engagement_api::AppState;
use engagement_core::config::AppConfig;
use engagement_database::InMemoryFeedRepository;
use engagement_entity::feed::item::action_names as item_actions;
use engagement_entity::feed::nudge::action_names as nudge_actions;
use engagement_entity::feed::{
    Action, ActionType, Item, Link, NotificationBody, Nudge, Status, Visibility,
};
use engagement_pubsub::{InMemoryBus, PubSubPayload, TopicId, TopicNamer};
use engagement_service::channels::{
    LoggingMailChannel, LoggingPushChannel, StaticProfileDirectory, UserProfile,
};
use engagement_service::{Channels, ServiceRegistry};

pub const UID: &str = "user-1";
pub const ICON: &str = "https://example.com/icon.png";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Backing repository for direct inspection
    pub repository: Arc<InMemoryFeedRepository>,
    /// Bus recording every published message
    pub bus: Arc<InMemoryBus>,
    /// Recorded pushes
    pub push: Arc<LoggingPushChannel>,
    /// Recorded emails
    pub mail: Arc<LoggingMailChannel>,
    /// Contact details served to the fan-out engine
    pub profiles: Arc<StaticProfileDirectory>,
}

impl TestApp {
    /// Create a new test application over in-memory infrastructure
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create a test application with a custom configuration
    pub fn with_config(config: AppConfig) -> Self {
        let repository = Arc::new(InMemoryFeedRepository::new());
        let bus = Arc::new(InMemoryBus::new(TopicNamer::from_config(&config.pubsub)));
        let push = Arc::new(LoggingPushChannel::new());
        let mail = Arc::new(LoggingMailChannel::new());
        let profiles = Arc::new(StaticProfileDirectory::new());
        let channels = Channels {
            push: push.clone(),
            mail: mail.clone(),
            profiles: profiles.clone(),
        };

        let services = ServiceRegistry::new(&config, repository.clone(), bus.clone(), channels);
        let router = engagement_api::build_app(AppState::new(config, &services));

        Self {
            router,
            repository,
            bus,
            push,
            mail,
            profiles,
        }
    }

    /// Register device tokens and an email address for `uid`
    pub fn register_devices(&self, uid: &str) {
        self.profiles.insert(
            uid,
            UserProfile {
                device_tokens: vec![format!("{uid}-device")],
                emails: vec![format!("{uid}@example.com")],
            },
        );
    }

    /// Send a request through the router
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Push every message recorded on `topic` back through `POST /pubsub`
    pub async fn deliver(&self, topic: TopicId) -> Vec<TestResponse> {
        let subscription = self.bus.namer().subscription_id(topic);
        let mut responses = Vec::new();
        for message in self.bus.published(topic) {
            let payload = PubSubPayload {
                subscription: subscription.clone(),
                message,
            };
            let body = serde_json::to_value(&payload).expect("Failed to encode push payload");
            responses.push(self.request("POST", "/pubsub", Some(body)).await);
        }
        responses
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `data` member of a success envelope
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }
}

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
        users: vec![UID.to_string()],
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
        users: vec![UID.to_string()],
        groups: Vec::new(),
        notification_channels: Vec::new(),
        notification_body: NotificationBody {
            publish_message: "You have a new task".to_string(),
            resolve_message: "Task completed".to_string(),
        },
    }
}

pub fn json<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).expect("Failed to encode fixture")
}
