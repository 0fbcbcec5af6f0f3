//! Delivery runner: hands queued bus messages to a handler with retries.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::{OwnedSemaphorePermit, Semaphore, mpsc, watch};
use tokio::time;

use engagement_core::config::SubscriptionConfig;
use engagement_core::result::AppResult;

use crate::topics::dead_letter_topic;
use crate::wire::PubSubPayload;

/// Consumer of delivered messages. `Ok` acknowledges the message.
#[async_trait]
pub trait MessageHandler: Send + Sync + std::fmt::Debug + 'static {
    /// Process one delivery.
    async fn handle(&self, payload: &PubSubPayload) -> AppResult<()>;
}

/// A message that exhausted its delivery attempts.
#[derive(Debug, Clone)]
pub struct DeadLetter {
    /// The undeliverable message.
    pub payload: PubSubPayload,
    /// Attempts made.
    pub attempts: u32,
    /// Last failure.
    pub last_error: String,
}

/// Dead-letter topics keyed by name.
#[derive(Debug, Default)]
pub struct DeadLetterStore {
    topics: DashMap<String, Vec<DeadLetter>>,
}

impl DeadLetterStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, topic: String, letter: DeadLetter) {
        self.topics.entry(topic).or_default().push(letter);
    }

    /// Messages parked on `topic`.
    pub fn messages(&self, topic: &str) -> Vec<DeadLetter> {
        self.topics
            .get(topic)
            .map(|letters| letters.clone())
            .unwrap_or_default()
    }

    /// Total number of parked messages.
    pub fn len(&self) -> usize {
        self.topics.iter().map(|e| e.value().len()).sum()
    }

    /// Whether no message has been parked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Backoff before redelivery attempt `attempt + 1`, doubling from `min`
/// and capped at `max`.
pub fn backoff_for_attempt(attempt: u32, min: Duration, max: Duration) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    min.saturating_mul(factor).min(max)
}

/// Drains the bus delivery queue into a [`MessageHandler`].
#[derive(Debug)]
pub struct DeliveryRunner {
    handler: Arc<dyn MessageHandler>,
    config: SubscriptionConfig,
    concurrency: usize,
    dead_letters: Arc<DeadLetterStore>,
}

impl DeliveryRunner {
    /// Create a runner delivering to `handler`.
    pub fn new(
        handler: Arc<dyn MessageHandler>,
        config: SubscriptionConfig,
        concurrency: usize,
    ) -> Self {
        Self {
            handler,
            config,
            concurrency: concurrency.max(1),
            dead_letters: Arc::new(DeadLetterStore::new()),
        }
    }

    /// Dead letters collected by this runner.
    pub fn dead_letters(&self) -> Arc<DeadLetterStore> {
        Arc::clone(&self.dead_letters)
    }

    /// Deliver messages until the queue closes or `cancel` flips to `true`.
    ///
    /// A permit is taken before a message leaves the queue, so the queue
    /// only drains as fast as handlers free up.
    pub async fn run(
        &self,
        mut queue: mpsc::Receiver<PubSubPayload>,
        mut cancel: watch::Receiver<bool>,
    ) {
        tracing::info!(
            concurrency = self.concurrency,
            ack_deadline_seconds = self.config.ack_deadline_seconds,
            max_delivery_attempts = self.config.max_delivery_attempts,
            "Delivery runner started"
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));

        loop {
            let permit = tokio::select! {
                _ = cancel.wait_for(|stop| *stop) => {
                    tracing::info!("Delivery runner received shutdown signal");
                    break;
                }
                permit = Arc::clone(&semaphore).acquire_owned() => {
                    let Ok(permit) = permit else { break };
                    permit
                }
            };

            let payload = tokio::select! {
                _ = cancel.wait_for(|stop| *stop) => {
                    tracing::info!("Delivery runner received shutdown signal");
                    break;
                }
                next = queue.recv() => {
                    let Some(payload) = next else {
                        tracing::info!("Delivery queue closed");
                        break;
                    };
                    payload
                }
            };

            let handler = Arc::clone(&self.handler);
            let dead_letters = Arc::clone(&self.dead_letters);
            let config = self.config.clone();
            let semaphore = Arc::clone(&semaphore);
            tokio::spawn(async move {
                deliver(
                    handler.as_ref(),
                    &config,
                    &dead_letters,
                    &semaphore,
                    permit,
                    payload,
                )
                .await;
            });
        }

        tracing::info!("Delivery runner waiting for in-flight messages");
        let permits = u32::try_from(self.concurrency).unwrap_or(u32::MAX);
        let grace = Duration::from_secs(self.config.ack_deadline_seconds);
        let _ = time::timeout(grace, semaphore.acquire_many(permits)).await;
        tracing::info!("Delivery runner stopped");
    }
}

/// Deliver one message, retrying with backoff and dead-lettering on exhaustion.
///
/// `permit` covers the first attempt. It is released while waiting out a
/// backoff and reacquired for the next attempt.
async fn deliver(
    handler: &dyn MessageHandler,
    config: &SubscriptionConfig,
    dead_letters: &DeadLetterStore,
    semaphore: &Arc<Semaphore>,
    permit: OwnedSemaphorePermit,
    payload: PubSubPayload,
) {
    let ack_deadline = Duration::from_secs(config.ack_deadline_seconds);
    let min_backoff = Duration::from_secs(config.min_backoff_seconds);
    let max_backoff = Duration::from_secs(config.max_backoff_seconds);
    let max_attempts = config.max_delivery_attempts.max(1);

    let mut permit = Some(permit);
    let mut attempt = 1;
    loop {
        let held = match permit.take() {
            Some(held) => held,
            None => match Arc::clone(semaphore).acquire_owned().await {
                Ok(held) => held,
                Err(_) => return,
            },
        };

        let outcome = match time::timeout(ack_deadline, handler.handle(&payload)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!("ack deadline of {ack_deadline:?} exceeded")),
        };
        drop(held);

        match outcome {
            Ok(()) => {
                tracing::debug!(
                    message_id = %payload.message_id(),
                    attempt,
                    "Message acknowledged"
                );
                return;
            }
            Err(error) if attempt < max_attempts => {
                let backoff = backoff_for_attempt(attempt, min_backoff, max_backoff);
                tracing::warn!(
                    message_id = %payload.message_id(),
                    attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %error,
                    "Delivery failed, retrying"
                );
                time::sleep(backoff).await;
                attempt += 1;
            }
            Err(error) => {
                let topic = payload
                    .message
                    .topic_id()
                    .map(dead_letter_topic)
                    .unwrap_or_else(|| dead_letter_topic(&payload.subscription));
                tracing::error!(
                    message_id = %payload.message_id(),
                    attempts = attempt,
                    dead_letter_topic = %topic,
                    error = %error,
                    "Delivery attempts exhausted, dead-lettering"
                );
                dead_letters.push(
                    topic,
                    DeadLetter {
                        payload,
                        attempts: attempt,
                        last_error: error,
                    },
                );
                return;
            }
        }
    }
}
