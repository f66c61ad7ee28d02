//! Catalog service client abstraction.
//!
//! Export and import only talk to the catalog through [`CatalogClient`];
//! [`HttpCatalogClient`] is the REST implementation.

mod http;
mod session;

pub use http::{HttpCatalogClient, build_http_client};
pub use session::CatalogSession;

use crate::Result;
use crate::models::{Asset, SearchPage};

/// Operations the transfer pipeline needs from a catalog service.
pub trait CatalogClient: Send + Sync {
    /// Fetches one page of search results.
    ///
    /// Pages are 1-based.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not a
    /// search page.
    fn search(&self, term: &str, page: u32, page_size: u32) -> Result<SearchPage>;

    /// Fetches the full representation of an asset.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not an
    /// asset.
    fn get(&self, asset_id: &str) -> Result<Asset>;

    /// Creates an asset in the given view and returns the service response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    fn update(&self, payload: &Asset, view_type: &str) -> Result<UpdateResponse>;
}

/// Response of a create/update request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateResponse {
    /// Raw response body.
    pub body: String,
    /// Identifier of the created asset, from the `Location` header.
    pub location: Option<String>,
}

impl UpdateResponse {
    /// Creates a response.
    #[must_use]
    pub fn new(body: impl Into<String>, location: Option<String>) -> Self {
        Self {
            body: body.into(),
            location,
        }
    }

    /// Returns the new identifier when it is non-empty.
    #[must_use]
    pub fn new_id(&self) -> Option<&str> {
        self.location.as_deref().filter(|id| !id.is_empty())
    }

    /// Whether the asset was recreated.
    ///
    /// Requires both a non-empty body and a non-empty new identifier.
    #[must_use]
    pub fn is_created(&self) -> bool {
        !self.body.is_empty() && self.new_id().is_some()
    }
}
