//! Export and import command handlers.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use catalog_transfer::io::{
    ExportOptions, ExportProgressCallback, ExportService, ImportOptions, ImportProgress,
    ImportProgressCallback, ImportService,
};
use catalog_transfer::{CatalogClient, Error, Result, TransferConfig};

/// Assets per progress dot during export.
const EXPORT_DOT_INTERVAL: usize = 10;

/// Successful imports per progress line.
const IMPORT_LINE_INTERVAL: usize = 50;

/// Maximum number of per-asset errors listed after an import.
const MAX_LISTED_ERRORS: usize = 10;

/// Executes the export command.
pub fn cmd_export(
    config: &TransferConfig,
    client: Arc<dyn CatalogClient>,
    output: &Path,
    search_term: Option<String>,
) -> Result<()> {
    let options =
        ExportOptions::from_config(config).with_search_term(search_term.unwrap_or_default());
    let service = ExportService::new(client);

    let progress: ExportProgressCallback = Box::new(|exported, _total| {
        if exported % EXPORT_DOT_INTERVAL == 0 {
            print!(".");
            let _ = std::io::stdout().flush();
        }
    });

    let result = service.export_to_file(output, &options, Some(progress));
    println!();
    let result = result?;

    println!("Items exported: {}", result.exported);
    if let Some(path) = result.output_path {
        println!("  Output:  {path}");
    }

    Ok(())
}

/// Executes the import command.
///
/// Returns an error when any asset failed, after printing the summary.
pub fn cmd_import(client: Arc<dyn CatalogClient>, input: &Path, dry_run: bool) -> Result<()> {
    let options = ImportOptions::default().with_dry_run(dry_run);
    let service = ImportService::new(client);

    let reported = AtomicUsize::new(0);
    let progress: ImportProgressCallback = Box::new(move |p: &ImportProgress| {
        if p.succeeded > 0
            && p.succeeded % IMPORT_LINE_INTERVAL == 0
            && reported.swap(p.succeeded, Ordering::Relaxed) != p.succeeded
        {
            println!("Imported {} assets ({} failed)", p.succeeded, p.failed);
        }
    });

    let result = service.import_from_file(input, &options, Some(progress))?;

    if dry_run {
        println!("Dry run completed (no assets created)");
    }
    println!("Total imported success: {}", result.succeeded);
    println!("Total imported failed:  {}", result.failed);

    if !result.errors.is_empty() {
        println!();
        println!("Errors ({}):", result.errors.len());
        for error in result.errors.iter().take(MAX_LISTED_ERRORS) {
            println!("  - {error}");
        }
        if result.errors.len() > MAX_LISTED_ERRORS {
            println!("  ... and {} more", result.errors.len() - MAX_LISTED_ERRORS);
        }
    }

    if result.has_failures() {
        return Err(Error::OperationFailed {
            operation: "import".to_string(),
            cause: format!("{} of {} assets failed", result.failed, result.total_processed),
        });
    }

    Ok(())
}
