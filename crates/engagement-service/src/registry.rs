//! Explicit dependency wiring for the engagement services.

use std::sync::Arc;

use tracing::info;

use engagement_core::config::AppConfig;
use engagement_database::FeedRepository;
use engagement_pubsub::{NotificationService, TopicNamer};

use crate::channels::Channels;
use crate::fanout::{FanoutService, TopicRouter};
use crate::feed::FeedService;

/// Every long-lived service, built once at startup and shared by handle.
#[derive(Debug, Clone)]
pub struct ServiceRegistry {
    /// Feed persistence.
    pub repository: Arc<dyn FeedRepository>,
    /// Bus publisher.
    pub notifications: Arc<dyn NotificationService>,
    /// Feed use cases.
    pub feed: Arc<FeedService>,
    /// Fan-out engine.
    pub fanout: Arc<FanoutService>,
    /// Delivery router in front of the fan-out engine.
    pub router: Arc<TopicRouter>,
    /// Topic and subscription naming.
    pub namer: TopicNamer,
}

impl ServiceRegistry {
    /// Wire the services over the given infrastructure.
    pub fn new(
        config: &AppConfig,
        repository: Arc<dyn FeedRepository>,
        notifications: Arc<dyn NotificationService>,
        channels: Channels,
    ) -> Self {
        let namer = TopicNamer::from_config(&config.pubsub);

        let feed = Arc::new(FeedService::new(
            Arc::clone(&repository),
            Arc::clone(&notifications),
            config.pubsub.strict_notify,
        ));
        let fanout = Arc::new(FanoutService::new(
            Arc::clone(&repository),
            Arc::clone(&notifications),
            channels,
            config.notifications.clone(),
        ));
        let router = Arc::new(TopicRouter::new(namer.clone(), Arc::clone(&fanout)));

        info!(
            topics = namer.topic_ids().len(),
            strict_notify = config.pubsub.strict_notify,
            "Services initialized"
        );

        Self {
            repository,
            notifications,
            feed,
            fanout,
            router,
            namer,
        }
    }
}
