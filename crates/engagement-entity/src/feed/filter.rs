//! Feed read filters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{BooleanFilter, Status, Visibility};
use super::item::Item;
use super::nudge::Nudge;

/// Extra filter parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterParams {
    /// Only items carrying one of these labels; empty means any label.
    #[serde(default)]
    pub labels: Vec<String>,
}

/// Filters applied when hydrating a feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedFilter {
    /// Filter on the persistent flag.
    #[serde(default)]
    pub persistent: BooleanFilter,
    /// Only entries in this state.
    #[serde(default)]
    pub status: Option<Status>,
    /// Only entries with this visibility.
    #[serde(default)]
    pub visibility: Option<Visibility>,
    /// Filter on expiry relative to the read time.
    #[serde(default)]
    pub expired: Option<BooleanFilter>,
    /// Label filters.
    #[serde(default)]
    pub filter_params: Option<FilterParams>,
}

impl FeedFilter {
    /// Whether `item` belongs in the feed read at `now`.
    pub fn matches_item(&self, item: &Item, now: DateTime<Utc>) -> bool {
        if !self.persistent.matches(item.persistent) {
            return false;
        }
        if !self.matches_state(item.status, item.visibility) {
            return false;
        }
        if let Some(expired) = self.expired {
            if !expired.matches(item.is_expired(now)) {
                return false;
            }
        }
        match &self.filter_params {
            Some(params) if !params.labels.is_empty() => params.labels.contains(&item.label),
            _ => true,
        }
    }

    /// Whether `nudge` belongs in the feed read at `now`.
    ///
    /// Nudges have no persistent flag or label, so only state and expiry apply.
    pub fn matches_nudge(&self, nudge: &Nudge, now: DateTime<Utc>) -> bool {
        if !self.matches_state(nudge.status, nudge.visibility) {
            return false;
        }
        match self.expired {
            Some(expired) => expired.matches(nudge.is_expired(now)),
            None => true,
        }
    }

    fn matches_state(&self, status: Status, visibility: Visibility) -> bool {
        self.status.is_none_or(|s| s == status) && self.visibility.is_none_or(|v| v == visibility)
    }
}
