//! Enumerations shared by feed entities.

use serde::{Deserialize, Serialize};

/// Completion state of an item or nudge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// Not yet acted upon.
    #[default]
    Pending,
    /// Acted upon but not finished.
    InProgress,
    /// Resolved.
    Done,
}

/// Whether an item or nudge is shown in the feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    /// Rendered in the feed.
    #[default]
    Show,
    /// Hidden by the user.
    Hide,
}

/// Markup used by an item's text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TextType {
    /// Plain text.
    #[default]
    Plain,
    /// Markdown.
    Markdown,
    /// HTML.
    Html,
}

/// Placement of an action affordance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    /// Main call to action.
    #[default]
    Primary,
    /// Secondary call to action.
    Secondary,
    /// Tucked into an overflow menu.
    Overflow,
    /// Floating button; only valid at the global feed scope.
    Floating,
}

/// How the client handles an action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Handling {
    /// Handled in place.
    #[default]
    Inline,
    /// Opens a full page.
    FullPage,
}

/// Delivery channel a feed entry may be announced on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Channel {
    /// Firebase Cloud Messaging push.
    Fcm,
    /// Email.
    Email,
    /// SMS.
    Sms,
    /// WhatsApp.
    Whatsapp,
}

/// Media kind of a link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkType {
    /// PNG image.
    PngImage,
    /// JPEG image.
    JpgImage,
    /// SVG image.
    SvgImage,
    /// PDF document.
    PdfDocument,
    /// YouTube video.
    YoutubeVideo,
    /// Anything else.
    #[default]
    Default,
}

/// Tri-state filter over a boolean attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BooleanFilter {
    /// Match either value.
    #[default]
    Both,
    /// Match `true` only.
    True,
    /// Match `false` only.
    False,
}

impl BooleanFilter {
    /// Whether `value` passes the filter.
    pub fn matches(&self, value: bool) -> bool {
        match self {
            Self::Both => true,
            Self::True => value,
            Self::False => !value,
        }
    }
}
