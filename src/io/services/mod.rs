//! Export and import services.
//!
//! Both services talk to the catalog only through
//! [`CatalogClient`](crate::catalog::CatalogClient).

pub mod export;
pub mod import;

pub use export::{ExportOptions, ExportProgressCallback, ExportResult, ExportService};
pub use import::{
    ImportOptions, ImportProgress, ImportProgressCallback, ImportResult, ImportService,
};
