//! # Catalog Transfer
//!
//! Export and import of cloud data catalog assets through the catalog's REST
//! API, using a single JSON document on disk.
//!
//! The crate migrates catalog contents between environments (backup and
//! restore, environment promotion):
//!
//! - **Export** pages through a search, re-attaches heavy annotation fields,
//!   strips service-managed fields and rewrites role grants, then streams
//!   every asset into a `{"catalog":[...]}` document.
//! - **Import** streams such a document back and recreates every asset under
//!   a fresh identifier.
//!
//! ## Example
//!
//! ```rust,ignore
//! use catalog_transfer::catalog::{CatalogSession, HttpCatalogClient};
//! use catalog_transfer::io::{ExportOptions, ExportService};
//! use std::sync::Arc;
//!
//! let session = CatalogSession::new(token);
//! let client = Arc::new(HttpCatalogClient::new(session, &config));
//! let service = ExportService::new(client);
//! let result = service.export_to_file(path, &ExportOptions::default(), None)?;
//! println!("Items exported: {}", result.exported);
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod catalog;
pub mod config;
pub mod io;
pub mod models;
pub mod observability;

// Re-exports for convenience
pub use catalog::{CatalogClient, CatalogSession, HttpCatalogClient, UpdateResponse};
pub use config::TransferConfig;
pub use models::{Asset, RoleGrant, RoleMember, SearchHit, SearchPage};

/// Error type for catalog transfer operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Bad arguments, invalid configuration, assets without a usable id |
/// | `OperationFailed` | Local I/O, file creation, serialization |
/// | `Transport` | The catalog service could not be reached |
/// | `UnexpectedStatus` | The catalog service answered with a non-success status |
/// | `MalformedDocument` | An import document is not `{"catalog":[...]}` |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A local operation failed.
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// A request to the catalog service failed before a response arrived.
    #[error("request '{operation}' failed (request id {request_id}): {cause}")]
    Transport {
        /// The catalog operation (`search`, `get`, `update`).
        operation: String,
        /// Client request id sent with the request.
        request_id: String,
        /// The underlying cause.
        cause: String,
    },

    /// The catalog service answered with a non-success status.
    #[error("request '{operation}' returned {status} (request id {request_id}): {body}")]
    UnexpectedStatus {
        /// The catalog operation (`search`, `get`, `update`).
        operation: String,
        /// Client request id sent with the request.
        request_id: String,
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// The import document does not have the expected structure.
    ///
    /// Raised when:
    /// - The outer object, the `catalog` key or the array start is missing
    /// - An array element is not a JSON object
    /// - The document ends early or carries trailing content
    #[error("malformed catalog document: {0}")]
    MalformedDocument(String),
}

/// Result type alias for catalog transfer operations.
pub type Result<T> = std::result::Result<T, Error>;
