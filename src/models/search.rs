//! Search endpoint response types.

use super::Asset;
use serde::{Deserialize, Serialize};

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    /// Number of assets matching the query across all pages.
    #[serde(default)]
    pub total_results: u64,
    /// Hits on this page, in service order.
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

/// A single search hit.
///
/// The service wraps the lightweight asset representation in `content`;
/// heavy annotation fields such as previews are not filled in here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// The asset summary.
    pub content: Asset,
}

impl SearchPage {
    /// Creates a page from assets.
    #[must_use]
    pub fn new(total_results: u64, assets: impl IntoIterator<Item = Asset>) -> Self {
        Self {
            total_results,
            results: assets
                .into_iter()
                .map(|content| SearchHit { content })
                .collect(),
        }
    }

    /// Returns the number of hits on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns whether this page has no hits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Consumes the page, yielding its assets in order.
    pub fn into_assets(self) -> impl Iterator<Item = Asset> {
        self.results.into_iter().map(|hit| hit.content)
    }
}
