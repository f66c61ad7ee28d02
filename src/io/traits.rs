//! Core traits for import/export operations.
//!
//! Defines the [`ImportSource`] and [`ExportSink`] traits that document
//! formats implement.

use crate::Result;
use crate::models::Asset;

/// Source of assets to import.
///
/// Implementations read assets one at a time so that large documents are
/// never held in memory as a whole.
pub trait ImportSource {
    /// Reads the next asset from the source.
    ///
    /// Returns `Ok(None)` when the source is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or I/O fails. Errors
    /// are not recoverable; callers should stop reading.
    fn next(&mut self) -> Result<Option<Asset>>;
}

/// Sink for exported assets.
///
/// # Lifecycle
///
/// 1. Create sink with output destination
/// 2. Call `write()` for each asset, in discovery order
/// 3. Call `finalize()` to terminate the document
///
/// A sink dropped without `finalize()` leaves an unterminated document.
pub trait ExportSink {
    /// Writes one asset.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or I/O fails.
    fn write(&mut self, asset: &Asset) -> Result<()>;

    /// Terminates the document and flushes the destination.
    ///
    /// # Errors
    ///
    /// Returns an error if writing or flushing fails.
    fn finalize(&mut self) -> Result<()>;

    /// Number of assets written so far.
    fn count(&self) -> usize;
}
