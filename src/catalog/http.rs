//! REST client for the catalog service.

use super::{CatalogClient, CatalogSession, UpdateResponse};
use crate::config::{HttpConfig, TransferConfig};
use crate::models::{Asset, SearchPage};
use crate::{Error, Result};
use reqwest::StatusCode;
use reqwest::Url;
use reqwest::blocking::{RequestBuilder, Response};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, LOCATION};
use reqwest::redirect::Policy;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Header carrying a per-request id used for server-side diagnostics.
const CLIENT_REQUEST_ID_HEADER: &str = "x-ms-client-request-id";

/// Blocking REST client for the catalog API.
pub struct HttpCatalogClient {
    /// Authenticated session.
    session: CatalogSession,
    /// API base URL, without trailing slash.
    api_base_url: String,
    /// Catalog name.
    catalog_name: String,
    /// `api-version` query value.
    api_version: String,
    /// HTTP client.
    client: reqwest::blocking::Client,
}

impl HttpCatalogClient {
    /// Creates a client for the configured catalog.
    #[must_use]
    pub fn new(session: CatalogSession, config: &TransferConfig) -> Self {
        Self {
            session,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            catalog_name: config.catalog_name.clone(),
            api_version: config.api_version.clone(),
            client: build_http_client(config.http),
        }
    }

    /// Sets HTTP client timeouts.
    #[must_use]
    pub fn with_http_config(mut self, config: HttpConfig) -> Self {
        self.client = build_http_client(config);
        self
    }

    /// URL of the search endpoint.
    #[must_use]
    pub fn search_url(&self) -> String {
        format!(
            "{}/catalogs/{}/search/search",
            self.api_base_url, self.catalog_name
        )
    }

    /// URL that creates assets of the given view type.
    #[must_use]
    pub fn view_url(&self, view_type: &str) -> String {
        format!(
            "{}/catalogs/{}/views/{view_type}",
            self.api_base_url, self.catalog_name
        )
    }

    /// Resolves an asset id to a request URL.
    ///
    /// Ids issued by the service are absolute URLs; anything else is taken
    /// relative to the API base.
    ///
    /// # Errors
    ///
    /// Returns an error if no valid URL can be formed.
    pub fn asset_url(&self, asset_id: &str) -> Result<Url> {
        Url::parse(asset_id)
            .or_else(|_| {
                Url::parse(&format!(
                    "{}/{}",
                    self.api_base_url,
                    asset_id.trim_start_matches('/')
                ))
            })
            .map_err(|e| Error::InvalidInput(format!("invalid asset id '{asset_id}': {e}")))
    }

    /// Sends a request with the session and diagnostic headers attached.
    ///
    /// Returns the response together with the request id.
    fn send(&self, operation: &str, request: RequestBuilder) -> Result<(Response, String)> {
        let request_id = uuid::Uuid::new_v4().to_string();

        tracing::debug!(operation, request_id = %request_id, "Sending catalog request");

        let response = request
            .header(CLIENT_REQUEST_ID_HEADER, &request_id)
            .header(AUTHORIZATION, self.session.authorization_header())
            .send()
            .map_err(|e| {
                let error_kind = if e.is_timeout() {
                    "timeout"
                } else if e.is_connect() {
                    "connect"
                } else if e.is_request() {
                    "request"
                } else {
                    "unknown"
                };
                tracing::error!(
                    operation,
                    request_id = %request_id,
                    error = %e,
                    error_kind,
                    "Catalog request failed"
                );
                Error::Transport {
                    operation: operation.to_string(),
                    request_id: request_id.clone(),
                    cause: format!("{error_kind} error: {e}"),
                }
            })?;

        Ok((response, request_id))
    }

    /// Sends a GET and decodes a JSON body, requiring `200 OK`.
    fn get_json<T: DeserializeOwned>(&self, operation: &str, request: RequestBuilder) -> Result<T> {
        let (response, request_id) = self.send(operation, request)?;
        let status = response.status();

        if status != StatusCode::OK {
            return Err(status_error(operation, &request_id, response));
        }

        let body = response.text().map_err(|e| Error::Transport {
            operation: operation.to_string(),
            request_id: request_id.clone(),
            cause: format!("failed to read response body: {e}"),
        })?;

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(operation, request_id = %request_id, error = %e, "Unparseable catalog response");
            Error::OperationFailed {
                operation: format!("parse_{operation}_response"),
                cause: e.to_string(),
            }
        })
    }
}

impl CatalogClient for HttpCatalogClient {
    fn search(&self, term: &str, page: u32, page_size: u32) -> Result<SearchPage> {
        let request = self.client.get(self.search_url()).query(&[
            ("searchTerms", term.to_string()),
            ("count", page_size.to_string()),
            ("startPage", page.to_string()),
            ("api-version", self.api_version.clone()),
        ]);

        self.get_json("search", request)
    }

    fn get(&self, asset_id: &str) -> Result<Asset> {
        let mut url = self.asset_url(asset_id)?;
        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version);

        self.get_json("get", self.client.get(url))
    }

    fn update(&self, payload: &Asset, view_type: &str) -> Result<UpdateResponse> {
        let body = serde_json::to_string(payload).map_err(|e| Error::OperationFailed {
            operation: "serialize_asset".to_string(),
            cause: e.to_string(),
        })?;

        let request = self
            .client
            .post(self.view_url(view_type))
            .query(&[("api-version", self.api_version.as_str())])
            .header(CONTENT_TYPE, "application/json")
            .body(body);

        let (response, request_id) = self.send("update", request)?;

        if !response.status().is_success() {
            return Err(status_error("update", &request_id, response));
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.text().map_err(|e| Error::Transport {
            operation: "update".to_string(),
            request_id: request_id.clone(),
            cause: format!("failed to read response body: {e}"),
        })?;

        tracing::debug!(request_id = %request_id, location = ?location, "Asset created");

        Ok(UpdateResponse { body, location })
    }
}

/// Converts a non-success response into an error, logging the body.
fn status_error(operation: &str, request_id: &str, response: Response) -> Error {
    let status = response.status();
    let body = response.text().unwrap_or_default();
    tracing::error!(
        operation,
        request_id,
        status = %status,
        body = %body,
        "Catalog API returned error status"
    );
    Error::UnexpectedStatus {
        operation: operation.to_string(),
        request_id: request_id.to_string(),
        status: status.as_u16(),
        body,
    }
}

/// Builds a blocking HTTP client with configured timeouts.
///
/// Redirects are not followed: a redirected create would be replayed as a
/// body-less `GET`, so a `3xx` surfaces as [`Error::UnexpectedStatus`].
#[must_use]
pub fn build_http_client(config: HttpConfig) -> reqwest::blocking::Client {
    let mut builder = reqwest::blocking::Client::builder().redirect(Policy::none());
    if config.timeout_ms > 0 {
        builder = builder.timeout(Duration::from_millis(config.timeout_ms));
    }
    if config.connect_timeout_ms > 0 {
        builder = builder.connect_timeout(Duration::from_millis(config.connect_timeout_ms));
    }

    builder.build().unwrap_or_else(|err| {
        tracing::warn!("Failed to build catalog HTTP client: {err}");
        reqwest::blocking::Client::new()
    })
}
