//! Link entity used for icons and attachments.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::enums::LinkType;

/// A URL with display metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    /// Link identifier.
    #[serde(default)]
    pub id: String,
    /// Target URL.
    #[validate(url(message = "link url must be a valid URL"))]
    pub url: String,
    /// Media kind.
    #[serde(default)]
    pub link_type: LinkType,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Display description.
    #[serde(default)]
    pub description: String,
    /// Thumbnail URL.
    #[serde(default)]
    pub thumbnail: String,
}

impl Link {
    /// Build an image link pointing at `url`.
    pub fn image(url: impl Into<String>) -> Self {
        let url = url.into();
        let link_type = if url.ends_with(".svg") {
            LinkType::SvgImage
        } else if url.ends_with(".jpg") || url.ends_with(".jpeg") {
            LinkType::JpgImage
        } else {
            LinkType::PngImage
        };
        Self {
            id: String::new(),
            thumbnail: url.clone(),
            url,
            link_type,
            title: String::new(),
            description: String::new(),
        }
    }
}
