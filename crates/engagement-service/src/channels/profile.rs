//! Profile collaborator: device tokens and email addresses per user.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use engagement_core::error::AppError;
use engagement_core::result::AppResult;

use super::{ensure_success, request_error};

/// Contact details the fan-out engine needs about a user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// FCM registration tokens.
    #[serde(default)]
    pub device_tokens: Vec<String>,
    /// Email addresses.
    #[serde(default)]
    pub emails: Vec<String>,
}

/// Looks up contact details by uid.
#[async_trait]
pub trait ProfileDirectory: Send + Sync + std::fmt::Debug + 'static {
    /// Contact details for `uid`; an unknown user has an empty profile.
    async fn profile(&self, uid: &str) -> AppResult<UserProfile>;

    /// Device tokens registered by `uid`.
    async fn device_tokens(&self, uid: &str) -> AppResult<Vec<String>> {
        Ok(self.profile(uid).await?.device_tokens)
    }

    /// Email addresses of `uid`.
    async fn email_addresses(&self, uid: &str) -> AppResult<Vec<String>> {
        Ok(self.profile(uid).await?.emails)
    }
}

/// Profile directory calling the profile service over HTTP.
#[derive(Debug, Clone)]
pub struct HttpProfileDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpProfileDirectory {
    /// Create a directory querying `{base_url}/profiles/{uid}`.
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// URL of the profile resource for `uid`, with the uid percent-encoded
    /// as a single path segment.
    fn profile_url(&self, uid: &str) -> AppResult<reqwest::Url> {
        let invalid = |reason: String| {
            AppError::configuration(format!(
                "invalid profile service url '{}': {reason}",
                self.base_url
            ))
        };
        let mut url = reqwest::Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot be a base".to_string()))?
            .pop_if_empty()
            .push("profiles")
            .push(uid);
        Ok(url)
    }
}

#[async_trait]
impl ProfileDirectory for HttpProfileDirectory {
    async fn profile(&self, uid: &str) -> AppResult<UserProfile> {
        let url = self.profile_url(uid)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| request_error("failed to fetch user profile", e))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(UserProfile::default());
        }
        let response = ensure_success("failed to fetch user profile", response).await?;
        response
            .json()
            .await
            .map_err(|e| request_error("failed to decode user profile", e))
    }
}

/// Profile directory held in memory.
#[derive(Debug, Default)]
pub struct StaticProfileDirectory {
    profiles: DashMap<String, UserProfile>,
}

impl StaticProfileDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `profile` for `uid`.
    pub fn insert(&self, uid: impl Into<String>, profile: UserProfile) {
        self.profiles.insert(uid.into(), profile);
    }
}

#[async_trait]
impl ProfileDirectory for StaticProfileDirectory {
    async fn profile(&self, uid: &str) -> AppResult<UserProfile> {
        Ok(self
            .profiles
            .get(uid)
            .map(|p| p.value().clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use engagement_core::error::ErrorKind;

    use super::*;

    fn directory(base_url: &str) -> HttpProfileDirectory {
        HttpProfileDirectory::new(reqwest::Client::new(), base_url.to_string())
    }

    #[test]
    fn test_profile_url_appends_uid_segment() {
        let url = directory("http://profiles.local/api/")
            .profile_url("user-1")
            .unwrap();
        assert_eq!(url.as_str(), "http://profiles.local/api/profiles/user-1");
    }

    #[test]
    fn test_profile_url_encodes_reserved_characters() {
        let url = directory("http://profiles.local")
            .profile_url("../admin?x=1#frag")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://profiles.local/profiles/..%2Fadmin%3Fx=1%23frag"
        );
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_invalid_base_url_is_a_configuration_error() {
        let err = directory("not a url").profile_url("user-1").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
