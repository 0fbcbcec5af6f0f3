//! Request DTOs.

use serde::{Deserialize, Serialize};

use engagement_entity::feed::{BooleanFilter, FeedFilter, FilterParams, Status, Visibility};

/// Query string of a feed read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedQuery {
    /// Whether the reader is anonymous.
    #[serde(default)]
    pub is_anonymous: bool,
    /// Persistent flag filter.
    #[serde(default)]
    pub persistent: BooleanFilter,
    /// Status filter.
    pub status: Option<Status>,
    /// Visibility filter.
    pub visibility: Option<Visibility>,
    /// Expiry filter.
    pub expired: Option<BooleanFilter>,
    /// Comma-separated label filter.
    pub labels: Option<String>,
}

impl FeedQuery {
    /// The feed filter described by this query.
    pub fn filter(&self) -> FeedFilter {
        let labels: Vec<String> = self
            .labels
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();

        FeedFilter {
            persistent: self.persistent,
            status: self.status,
            visibility: self.visibility,
            expired: self.expired,
            filter_params: (!labels.is_empty()).then_some(FilterParams { labels }),
        }
    }
}

/// Save label request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveLabelRequest {
    /// Label to register.
    pub label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_split_and_trimmed() {
        let query = FeedQuery {
            labels: Some("RESULTS, APPOINTMENTS,,".to_string()),
            ..Default::default()
        };
        let filter = query.filter();
        assert_eq!(
            filter.filter_params.unwrap().labels,
            vec!["RESULTS".to_string(), "APPOINTMENTS".to_string()]
        );
    }

    #[test]
    fn test_empty_query_matches_everything() {
        assert_eq!(FeedQuery::default().filter(), FeedFilter::default());
    }
}
