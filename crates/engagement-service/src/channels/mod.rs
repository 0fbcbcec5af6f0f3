//! Outbound notification channels.
//!
//! Each channel is a trait with an HTTP implementation and a logging
//! implementation that records what it would have sent. The logging
//! variants are selected with `channels.provider = "log"`.

pub mod mail;
pub mod profile;
pub mod push;

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use engagement_core::config::ChannelsConfig;
use engagement_core::error::AppError;
use engagement_core::result::AppResult;

pub use mail::{HttpMailChannel, LoggingMailChannel, MailChannel};
pub use profile::{HttpProfileDirectory, ProfileDirectory, StaticProfileDirectory, UserProfile};
pub use push::{FcmPushChannel, LoggingPushChannel, PushChannel};

/// The set of outbound collaborators used by the fan-out engine.
#[derive(Debug, Clone)]
pub struct Channels {
    /// Device push.
    pub push: Arc<dyn PushChannel>,
    /// Email.
    pub mail: Arc<dyn MailChannel>,
    /// Device tokens and email addresses.
    pub profiles: Arc<dyn ProfileDirectory>,
}

impl Channels {
    /// Build the channels named by `config.provider`.
    pub fn from_config(config: &ChannelsConfig) -> AppResult<Self> {
        match config.provider.as_str() {
            "log" => {
                info!("Using logging notification channels");
                Ok(Self {
                    push: Arc::new(LoggingPushChannel::new()),
                    mail: Arc::new(LoggingMailChannel::new()),
                    profiles: Arc::new(StaticProfileDirectory::new()),
                })
            }
            "http" => {
                info!(
                    fcm = %config.fcm.endpoint,
                    profile = %config.profile.base_url,
                    "Using HTTP notification channels"
                );
                let client = http_client(config.request_timeout_seconds)?;
                Ok(Self {
                    push: Arc::new(FcmPushChannel::new(client.clone(), config.fcm.clone())),
                    mail: Arc::new(HttpMailChannel::new(client.clone(), config.mail.clone())),
                    profiles: Arc::new(HttpProfileDirectory::new(
                        client,
                        config.profile.base_url.clone(),
                    )),
                })
            }
            other => Err(AppError::configuration(format!(
                "unknown channels provider: '{other}'. Supported: log, http"
            ))),
        }
    }
}

fn http_client(timeout_seconds: u64) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .build()
        .map_err(|e| AppError::configuration(format!("failed to build HTTP client: {e}")))
}

/// Map a transport failure onto an external-service error.
pub(crate) fn request_error(operation: &str, e: reqwest::Error) -> AppError {
    AppError::with_source(
        engagement_core::error::ErrorKind::ExternalService,
        format!("{operation}: {e}"),
        e,
    )
}

/// Fail with an external-service error when `response` is not a success.
pub(crate) async fn ensure_success(
    operation: &str,
    response: reqwest::Response,
) -> AppResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AppError::external_service(format!(
        "{operation}: upstream returned {status}: {body}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider_rejected() {
        let config = ChannelsConfig {
            provider: "carrier-pigeon".to_string(),
            ..Default::default()
        };
        let err = Channels::from_config(&config).unwrap_err();
        assert_eq!(err.kind, engagement_core::error::ErrorKind::Configuration);
    }

    #[test]
    fn test_default_provider_is_logging() {
        assert!(Channels::from_config(&ChannelsConfig::default()).is_ok());
    }
}
