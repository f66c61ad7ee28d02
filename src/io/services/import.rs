//! Catalog import service.
//!
//! Replays a catalog document into a catalog, one create request per asset.

use crate::catalog::CatalogClient;
use crate::io::formats::CatalogDocumentReader;
use crate::io::traits::ImportSource;
use crate::models::{Asset, view_type_of};
use crate::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

/// Options for catalog import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOptions {
    /// Validate the document and derive view types without creating assets.
    pub dry_run: bool,
}

impl ImportOptions {
    /// Sets dry-run mode.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Result of an import operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportResult {
    /// Number of assets recreated.
    pub succeeded: usize,
    /// Number of assets that could not be recreated.
    pub failed: usize,
    /// Total assets read from the document.
    pub total_processed: usize,
    /// Per-asset failure messages, in document order.
    pub errors: Vec<String>,
}

impl ImportResult {
    /// Returns whether any asset failed.
    #[must_use]
    pub const fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Running counters passed to import progress callbacks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportProgress {
    /// Assets read so far.
    pub processed: usize,
    /// Assets recreated so far.
    pub succeeded: usize,
    /// Assets failed so far.
    pub failed: usize,
}

/// Progress callback for import operations.
pub type ImportProgressCallback = Box<dyn Fn(&ImportProgress) + Send>;

/// Service for importing catalog assets.
pub struct ImportService {
    /// Catalog to import into.
    client: Arc<dyn CatalogClient>,
}

impl ImportService {
    /// Creates a new import service.
    #[must_use]
    pub fn new(client: Arc<dyn CatalogClient>) -> Self {
        Self { client }
    }

    /// Imports assets from a document file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or the document is
    /// malformed. Assets created before a structural error stay created.
    pub fn import_from_file(
        &self,
        path: &Path,
        options: &ImportOptions,
        progress: Option<ImportProgressCallback>,
    ) -> Result<ImportResult> {
        let file = File::open(path).map_err(|e| Error::OperationFailed {
            operation: "open_import_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        self.import_from_reader(BufReader::new(file), options, progress)
    }

    /// Imports assets from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or reading fails.
    pub fn import_from_reader<R: BufRead>(
        &self,
        reader: R,
        options: &ImportOptions,
        progress: Option<ImportProgressCallback>,
    ) -> Result<ImportResult> {
        let mut source = CatalogDocumentReader::new(reader);
        self.import_from_source(&mut source, options, progress)
    }

    /// Imports assets from a source.
    ///
    /// A failure to recreate one asset is counted and the run continues;
    /// a failure to read the source aborts it.
    ///
    /// # Errors
    ///
    /// Returns an error if the source fails.
    pub fn import_from_source(
        &self,
        source: &mut dyn ImportSource,
        options: &ImportOptions,
        progress: Option<ImportProgressCallback>,
    ) -> Result<ImportResult> {
        tracing::info!(dry_run = options.dry_run, "Starting catalog import");

        let mut result = ImportResult::default();

        while let Some(asset) = source.next().inspect_err(|e| {
            tracing::error!(error = %e, "Catalog document unreadable, aborting import");
        })? {
            result.total_processed += 1;
            let label = asset.to_string();

            match self.import_asset(asset, options) {
                Ok(new_id) => {
                    result.succeeded += 1;
                    metrics::counter!("catalog_import_assets_total", "status" => "success")
                        .increment(1);
                    tracing::debug!(asset = %label, new_id = ?new_id, "Asset imported");
                },
                Err(e) => {
                    result.failed += 1;
                    metrics::counter!("catalog_import_assets_total", "status" => "failure")
                        .increment(1);
                    tracing::warn!(asset = %label, error = %e, "Asset import failed");
                    result
                        .errors
                        .push(format!("Asset {} ({label}): {e}", result.total_processed));
                },
            }

            if let Some(ref cb) = progress {
                cb(&ImportProgress {
                    processed: result.total_processed,
                    succeeded: result.succeeded,
                    failed: result.failed,
                });
            }
        }

        tracing::info!(
            succeeded = result.succeeded,
            failed = result.failed,
            "Catalog import finished"
        );
        Ok(result)
    }

    /// Recreates one asset.
    ///
    /// The view type comes from the asset's own identifier, which is then
    /// dropped from the payload. Returns the new identifier, or `None` in
    /// dry-run mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier is missing or has no view type,
    /// the request fails, or the service answer lacks a body or location.
    pub fn import_asset(&self, mut asset: Asset, options: &ImportOptions) -> Result<Option<String>> {
        let view_type = {
            let id = asset
                .id()
                .ok_or_else(|| Error::InvalidInput("asset has no id".to_string()))?;
            view_type_of(id)
                .ok_or_else(|| Error::InvalidInput(format!("cannot derive view type from id '{id}'")))?
                .to_string()
        };
        asset.take_id();

        if options.dry_run {
            return Ok(None);
        }

        let response = self.client.update(&asset, &view_type)?;
        if !response.is_created() {
            return Err(Error::OperationFailed {
                operation: "update".to_string(),
                cause: "service answer carried no body or no new location".to_string(),
            });
        }

        Ok(response.new_id().map(str::to_string))
    }
}
