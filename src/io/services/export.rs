//! Catalog export service.
//!
//! Pages through a search, makes every hit portable and streams it into a
//! catalog document.

use crate::catalog::CatalogClient;
use crate::config::TransferConfig;
use crate::io::formats::CatalogDocumentWriter;
use crate::io::transform::{make_portable, remove_container_id};
use crate::io::traits::ExportSink;
use crate::models::{ANNOTATIONS_KEY, Asset, HEAVY_ANNOTATIONS};
use crate::{Error, Result};
use serde_json::Value;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

/// Options for catalog export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Search terms selecting the assets; empty exports everything.
    pub search_term: String,
    /// Search results requested per page.
    pub page_size: u32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            page_size: TransferConfig::DEFAULT_PAGE_SIZE,
        }
    }
}

impl ExportOptions {
    /// Creates export options from configuration.
    #[must_use]
    pub fn from_config(config: &TransferConfig) -> Self {
        Self::default().with_page_size(config.page_size)
    }

    /// Sets the search terms.
    #[must_use]
    pub fn with_search_term(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    /// Sets the page size.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }
}

/// Result of an export operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportResult {
    /// Number of assets written.
    pub exported: usize,
    /// `totalResults` reported by the first search page.
    pub total_results: u64,
    /// Number of search pages fetched.
    pub pages_fetched: u32,
    /// Number of assets whose heavy annotations were re-fetched.
    pub refetched: usize,
    /// Output path (if file export).
    pub output_path: Option<String>,
}

impl ExportResult {
    /// Returns whether any assets were exported.
    #[must_use]
    pub const fn has_exports(&self) -> bool {
        self.exported > 0
    }
}

/// Progress callback for export operations: `(exported, total_results)`.
pub type ExportProgressCallback = Box<dyn Fn(usize, Option<u64>) + Send>;

/// Service for exporting catalog assets.
pub struct ExportService {
    /// Catalog to export from.
    client: Arc<dyn CatalogClient>,
}

impl ExportService {
    /// Creates a new export service.
    #[must_use]
    pub fn new(client: Arc<dyn CatalogClient>) -> Self {
        Self { client }
    }

    /// Exports assets to a file.
    ///
    /// The document is written to a temporary file next to `path` and only
    /// renamed into place once complete, so a failed export never leaves a
    /// truncated document at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if a search or re-fetch fails, or the file cannot be
    /// written.
    pub fn export_to_file(
        &self,
        path: &Path,
        options: &ExportOptions,
        progress: Option<ExportProgressCallback>,
    ) -> Result<ExportResult> {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::OperationFailed {
            operation: "create_export_file".to_string(),
            cause: format!("{}: {e}", dir.display()),
        })?;

        let mut sink = CatalogDocumentWriter::new(BufWriter::new(temp));
        let mut result = self.export_to_sink(&mut sink, options, progress)?;
        sink.finalize()?;

        let temp = sink
            .into_inner()
            .into_inner()
            .map_err(|e| Error::OperationFailed {
                operation: "flush_export_file".to_string(),
                cause: e.error().to_string(),
            })?;
        temp.persist(path).map_err(|e| Error::OperationFailed {
            operation: "persist_export_file".to_string(),
            cause: format!("{}: {}", path.display(), e.error),
        })?;

        result.output_path = Some(path.display().to_string());
        Ok(result)
    }

    /// Exports assets to a writer and terminates the document.
    ///
    /// On error the writer holds a partial, unterminated document.
    ///
    /// # Errors
    ///
    /// Returns an error if a search or re-fetch fails, or writing fails.
    pub fn export_to_writer<W: Write>(
        &self,
        writer: W,
        options: &ExportOptions,
        progress: Option<ExportProgressCallback>,
    ) -> Result<ExportResult> {
        let mut sink = CatalogDocumentWriter::new(writer);
        let result = self.export_to_sink(&mut sink, options, progress)?;
        sink.finalize()?;
        Ok(result)
    }

    /// Exports assets to a sink without finalizing it.
    ///
    /// `totalResults` is read from the first page only. Page `n + 1` is
    /// requested while `n * page_size < totalResults`, even if the catalog
    /// changes during the run.
    ///
    /// # Errors
    ///
    /// Returns an error on the first failed search, re-fetch or write; the
    /// run is not resumed.
    pub fn export_to_sink(
        &self,
        sink: &mut dyn ExportSink,
        options: &ExportOptions,
        progress: Option<ExportProgressCallback>,
    ) -> Result<ExportResult> {
        if options.page_size == 0 {
            return Err(Error::InvalidInput(
                "page size must be greater than zero".to_string(),
            ));
        }

        tracing::info!(
            search_term = %options.search_term,
            page_size = options.page_size,
            "Starting catalog export"
        );

        let mut result = ExportResult::default();
        let mut total_results: Option<u64> = None;
        let mut page: u32 = 1;

        loop {
            let search_page = self
                .client
                .search(&options.search_term, page, options.page_size)
                .inspect_err(|e| {
                    tracing::error!(page, error = %e, "Search failed, aborting export");
                })?;
            metrics::counter!("catalog_export_pages_total").increment(1);
            result.pages_fetched = page;

            let total = *total_results.get_or_insert(search_page.total_results);
            result.total_results = total;
            tracing::debug!(page, hits = search_page.len(), total, "Fetched search page");

            for asset in search_page.into_assets() {
                let (asset, refetched) = self.prepare_asset(asset)?;
                sink.write(&asset)?;

                result.exported += 1;
                if refetched {
                    result.refetched += 1;
                }
                metrics::counter!("catalog_export_assets_total").increment(1);

                if let Some(ref cb) = progress {
                    cb(result.exported, Some(total));
                }
            }

            if u64::from(page) * u64::from(options.page_size) >= total {
                break;
            }
            page = page.checked_add(1).ok_or_else(|| {
                Error::InvalidInput(format!("totalResults {total} exceeds the page limit"))
            })?;
        }

        tracing::info!(
            exported = result.exported,
            pages = result.pages_fetched,
            refetched = result.refetched,
            "Catalog export finished"
        );
        Ok(result)
    }

    /// Turns a search hit into its exported form.
    ///
    /// Returns the asset and whether the full asset had to be fetched.
    ///
    /// # Errors
    ///
    /// Returns an error if the re-fetch fails.
    pub fn prepare_asset(&self, mut asset: Asset) -> Result<(Asset, bool)> {
        remove_container_id(asset.as_map_mut());
        let refetched = self.restore_heavy_annotations(&mut asset)?;
        make_portable(asset.as_map_mut());
        Ok((asset, refetched))
    }

    /// Replaces heavy annotations from the search hit with the full ones.
    ///
    /// Issues a single `get` when at least one heavy annotation is present,
    /// and copies back only those that were present.
    fn restore_heavy_annotations(&self, asset: &mut Asset) -> Result<bool> {
        let Some(annotations) = asset.annotations_mut() else {
            return Ok(false);
        };

        let present: Vec<&str> = HEAVY_ANNOTATIONS
            .into_iter()
            .filter(|field| annotations.remove(*field).is_some())
            .collect();
        if present.is_empty() {
            return Ok(false);
        }

        let id = asset
            .id()
            .ok_or_else(|| {
                Error::InvalidInput(
                    "search hit carries heavy annotations but no id to fetch them".to_string(),
                )
            })?
            .to_string();

        let full = self.client.get(&id).inspect_err(|e| {
            tracing::error!(asset_id = %id, error = %e, "Asset fetch failed, aborting export");
        })?;
        metrics::counter!("catalog_export_refetch_total").increment(1);

        let mut full_annotations = match full.into_map().remove(ANNOTATIONS_KEY) {
            Some(Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };

        if let Some(annotations) = asset.annotations_mut() {
            for field in present {
                match full_annotations.remove(field) {
                    Some(value) => {
                        annotations.insert(field.to_string(), value);
                    },
                    None => {
                        tracing::warn!(asset_id = %id, field, "Full asset lacks annotation");
                    },
                }
            }
        }

        Ok(true)
    }
}
