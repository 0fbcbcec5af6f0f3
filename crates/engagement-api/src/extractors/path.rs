//! Typed path parameter helpers.

use serde::Deserialize;

use engagement_core::Flavour;
use engagement_core::result::AppResult;

/// Parses a flavour from a path segment.
pub fn parse_flavour(s: &str) -> AppResult<Flavour> {
    s.parse()
}

/// The owning feed of a request.
#[derive(Debug, Clone)]
pub struct FeedScope {
    /// Owner uid.
    pub uid: String,
    /// Owner flavour.
    pub flavour: Flavour,
}

/// `/feed/{uid}/{flavour}`
#[derive(Debug, Deserialize)]
pub struct FeedPath {
    pub uid: String,
    pub flavour: String,
}

impl FeedPath {
    /// Validate the path into a [`FeedScope`].
    pub fn scope(self) -> AppResult<FeedScope> {
        Ok(FeedScope {
            flavour: parse_flavour(&self.flavour)?,
            uid: self.uid,
        })
    }
}

/// `/feed/{uid}/{flavour}/{collection}/{id}`
#[derive(Debug, Deserialize)]
pub struct ResourcePath {
    pub uid: String,
    pub flavour: String,
    pub id: String,
}

impl ResourcePath {
    /// Validate the path into a [`FeedScope`] and resource id.
    pub fn scope(self) -> AppResult<(FeedScope, String)> {
        let scope = FeedPath {
            uid: self.uid,
            flavour: self.flavour,
        }
        .scope()?;
        Ok((scope, self.id))
    }
}

/// `/feed/{uid}/{flavour}/{collection}/{id}/{op}`
#[derive(Debug, Deserialize)]
pub struct TogglePath {
    pub uid: String,
    pub flavour: String,
    pub id: String,
    pub op: String,
}

/// `/feed/{uid}/{flavour}/items/{id}/messages/{message_id}`
#[derive(Debug, Deserialize)]
pub struct MessagePath {
    pub uid: String,
    pub flavour: String,
    pub id: String,
    pub message_id: String,
}
