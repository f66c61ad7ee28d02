//! Catalog document I/O.
//!
//! # Architecture
//!
//! - [`transform`] makes assets portable between catalogs
//! - [`formats`] reads and writes the `{"catalog": [...]}` document
//!   incrementally through the [`ImportSource`] and [`ExportSink`] traits
//! - [`services`] drive a [`CatalogClient`](crate::catalog::CatalogClient)
//!   to export or import a whole catalog
//!
//! # Examples
//!
//! ```rust,ignore
//! use catalog_transfer::io::{ExportOptions, ExportService};
//! use std::path::Path;
//!
//! let service = ExportService::new(client);
//! let options = ExportOptions::default().with_search_term("sales");
//! let result = service.export_to_file(Path::new("catalog.json"), &options, None)?;
//! println!("Items exported: {}", result.exported);
//! ```

pub mod formats;
pub mod services;
pub mod traits;
pub mod transform;

pub use formats::{CatalogDocumentReader, CatalogDocumentWriter};
pub use services::export::{ExportOptions, ExportProgressCallback, ExportResult, ExportService};
pub use services::import::{
    ImportOptions, ImportProgress, ImportProgressCallback, ImportResult, ImportService,
};
pub use traits::{ExportSink, ImportSource};
pub use transform::make_portable;
