//! Outbound channel configuration (FCM, mail, profile service).

use serde::{Deserialize, Serialize};

/// Outbound channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelsConfig {
    /// Channel provider: `"log"` (local development) or `"http"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Timeout applied to every outbound HTTP call, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// FCM settings.
    #[serde(default)]
    pub fcm: FcmConfig,
    /// Mail provider settings.
    #[serde(default)]
    pub mail: MailConfig,
    /// Profile service settings (device token lookup).
    #[serde(default)]
    pub profile: ProfileConfig,
}

impl Default for ChannelsConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            request_timeout_seconds: default_request_timeout(),
            fcm: FcmConfig::default(),
            mail: MailConfig::default(),
            profile: ProfileConfig::default(),
        }
    }
}

/// FCM HTTP endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FcmConfig {
    /// Send endpoint.
    #[serde(default = "default_fcm_endpoint")]
    pub endpoint: String,
    /// Server key sent as `Authorization: key=...`.
    #[serde(default)]
    pub server_key: String,
}

impl Default for FcmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_fcm_endpoint(),
            server_key: String::new(),
        }
    }
}

/// Mail provider settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MailConfig {
    /// Messages endpoint of the mail provider.
    #[serde(default)]
    pub endpoint: String,
    /// API key used for basic auth.
    #[serde(default)]
    pub api_key: String,
    /// `From` address.
    #[serde(default)]
    pub from: String,
}

/// Profile service settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Base URL of the profile service.
    #[serde(default)]
    pub base_url: String,
}

fn default_provider() -> String {
    "log".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_fcm_endpoint() -> String {
    "https://fcm.googleapis.com/fcm/send".to_string()
}
