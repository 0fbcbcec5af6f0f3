//! Pub/sub namespace and delivery configuration.

use serde::{Deserialize, Serialize};

/// Pub/sub configuration shared by publishers and the delivery runner.
///
/// Topic names are namespaced as `{service_name}-{topic}-{environment}-{version}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PubSubConfig {
    /// Service segment of every topic name.
    #[serde(default = "default_service_name")]
    pub service_name: String,
    /// Deployment environment segment (e.g. `"staging"`).
    #[serde(default = "default_environment")]
    pub environment: String,
    /// API version segment.
    #[serde(default = "default_version")]
    pub version: String,
    /// When `true`, a failed notify after a successful persist is returned to
    /// the caller. When `false`, it is logged and the operation succeeds.
    #[serde(default = "default_true")]
    pub strict_notify: bool,
    /// Number of messages the delivery runner handles concurrently.
    #[serde(default = "default_delivery_concurrency")]
    pub delivery_concurrency: usize,
    /// Buffer of the in-process delivery queue.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Subscription provisioning settings.
    #[serde(default)]
    pub subscription: SubscriptionConfig,
}

impl Default for PubSubConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            environment: default_environment(),
            version: default_version(),
            strict_notify: true,
            delivery_concurrency: default_delivery_concurrency(),
            queue_capacity: default_queue_capacity(),
            subscription: SubscriptionConfig::default(),
        }
    }
}

/// Ack deadline and retry policy applied to every subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionConfig {
    /// Seconds a handler may take before the delivery counts as failed.
    #[serde(default = "default_ack_deadline")]
    pub ack_deadline_seconds: u64,
    /// First retry delay in seconds.
    #[serde(default = "default_min_backoff")]
    pub min_backoff_seconds: u64,
    /// Upper bound on the retry delay in seconds.
    #[serde(default = "default_max_backoff")]
    pub max_backoff_seconds: u64,
    /// Attempts before a message is moved to the dead-letter topic.
    #[serde(default = "default_max_delivery_attempts")]
    pub max_delivery_attempts: u32,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            ack_deadline_seconds: default_ack_deadline(),
            min_backoff_seconds: default_min_backoff(),
            max_backoff_seconds: default_max_backoff(),
            max_delivery_attempts: default_max_delivery_attempts(),
        }
    }
}

fn default_service_name() -> String {
    "engagement".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_version() -> String {
    "v1".to_string()
}

fn default_true() -> bool {
    true
}

fn default_delivery_concurrency() -> usize {
    8
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_ack_deadline() -> u64 {
    60
}

fn default_min_backoff() -> u64 {
    1
}

fn default_max_backoff() -> u64 {
    600
}

fn default_max_delivery_attempts() -> u32 {
    5
}
