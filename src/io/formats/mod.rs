//! Document formats for import/export.
//!
//! The catalog document is the only format; it implements both
//! [`ImportSource`](super::traits::ImportSource) and
//! [`ExportSink`](super::traits::ExportSink).

pub mod json;

pub use json::{CATALOG_KEY, CatalogDocumentReader, CatalogDocumentWriter};
