//! End-to-end export and import against an in-memory catalog.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::too_many_lines,
    clippy::cast_possible_truncation
)]

use catalog_transfer::io::{ExportOptions, ExportService, ImportOptions, ImportService};
use catalog_transfer::{Asset, CatalogClient, Error, Result, RoleGrant, SearchPage, UpdateResponse};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

/// In-memory catalog that records every call.
#[derive(Default)]
struct MemoryCatalog {
    /// Search hits, paged by the requested page size.
    hits: Vec<Asset>,
    /// Full representations served by `get`.
    full: Vec<Asset>,
    /// `totalResults` per page; falls back to `hits.len()`.
    totals: Vec<u64>,
    /// Fail every `get`.
    fail_get: bool,
    /// Fail the search for this page.
    fail_search_page: Option<u32>,
    searches: Mutex<Vec<(String, u32, u32)>>,
    gets: Mutex<Vec<String>>,
    updates: Mutex<Vec<(String, Asset)>>,
}

impl MemoryCatalog {
    fn with_hits(hits: Vec<Asset>) -> Self {
        Self {
            hits,
            ..Self::default()
        }
    }

    fn search_pages(&self) -> Vec<u32> {
        self.searches.lock().unwrap().iter().map(|s| s.1).collect()
    }
}

impl CatalogClient for MemoryCatalog {
    fn search(&self, term: &str, page: u32, page_size: u32) -> Result<SearchPage> {
        self.searches
            .lock()
            .unwrap()
            .push((term.to_string(), page, page_size));

        if self.fail_search_page == Some(page) {
            return Err(Error::Transport {
                operation: "search".to_string(),
                request_id: "test".to_string(),
                cause: "connect error".to_string(),
            });
        }

        let total = self
            .totals
            .get(page as usize - 1)
            .copied()
            .unwrap_or(self.hits.len() as u64);
        let hits = self
            .hits
            .iter()
            .skip((page as usize - 1) * page_size as usize)
            .take(page_size as usize)
            .cloned();
        Ok(SearchPage::new(total, hits))
    }

    fn get(&self, asset_id: &str) -> Result<Asset> {
        self.gets.lock().unwrap().push(asset_id.to_string());
        if self.fail_get {
            return Err(Error::UnexpectedStatus {
                operation: "get".to_string(),
                request_id: "test".to_string(),
                status: 500,
                body: "boom".to_string(),
            });
        }
        self.full
            .iter()
            .find(|a| a.id() == Some(asset_id))
            .cloned()
            .ok_or_else(|| Error::InvalidInput(format!("unknown asset {asset_id}")))
    }

    fn update(&self, payload: &Asset, view_type: &str) -> Result<UpdateResponse> {
        let mut updates = self.updates.lock().unwrap();
        updates.push((view_type.to_string(), payload.clone()));
        Ok(UpdateResponse::new(
            "{}",
            Some(format!("https://target/views/{view_type}/{}", updates.len())),
        ))
    }
}

fn asset(value: Value) -> Asset {
    Asset::try_from(value).unwrap()
}

fn table(n: usize) -> Asset {
    asset(json!({
        "id": format!("https://src/catalogs/c/views/tables/{n}"),
        "type": "Microsoft.DataCatalog.Tables",
        "properties": {"name": format!("t{n}"), "containerId": "https://src/catalogs/c/views/containers/1"},
        "roles": [{"role": "Owner", "members": [{"objectId": "abc"}]}]
    }))
}

fn export_to_value(catalog: Arc<MemoryCatalog>, options: &ExportOptions) -> Value {
    let mut output = Vec::new();
    ExportService::new(catalog)
        .export_to_writer(&mut output, options, None)
        .unwrap();
    serde_json::from_slice(&output).unwrap()
}

// ============================================================================
// Export
// ============================================================================

mod export {
    use super::*;

    #[test]
    fn test_two_assets_one_with_previews() {
        let catalog = Arc::new(MemoryCatalog {
            hits: vec![
                table(1),
                asset(json!({
                    "id": "https://src/catalogs/c/views/tables/2",
                    "properties": {"name": "t2"},
                    "annotations": {"previews": [{"properties": {"preview": []}}]}
                })),
            ],
            full: vec![asset(json!({
                "id": "https://src/catalogs/c/views/tables/2",
                "annotations": {"previews": [{
                    "__id": "p",
                    "properties": {"preview": [{"a": 1}, {"a": 2}]}
                }]}
            }))],
            ..MemoryCatalog::default()
        });

        let doc = export_to_value(Arc::clone(&catalog), &ExportOptions::default());
        let assets = doc["catalog"].as_array().unwrap();

        assert_eq!(assets.len(), 2);
        assert_eq!(
            *catalog.gets.lock().unwrap(),
            vec!["https://src/catalogs/c/views/tables/2"]
        );

        let first = &assets[0];
        assert_eq!(first["id"], "https://src/catalogs/c/views/tables/1");
        assert!(first.get("type").is_none());
        assert!(first["properties"].get("containerId").is_none());
        assert_eq!(first["roles"], RoleGrant::portable_grants());

        let preview = &assets[1]["annotations"]["previews"][0];
        assert_eq!(preview["properties"]["preview"], json!([{"a": 1}, {"a": 2}]));
        assert!(preview.get("__id").is_none());
    }

    #[test]
    fn test_pagination_fetches_all_pages() {
        let catalog = Arc::new(MemoryCatalog::with_hits((1..=250).map(table).collect()));

        let doc = export_to_value(
            Arc::clone(&catalog),
            &ExportOptions::default().with_search_term("sales"),
        );

        assert_eq!(doc["catalog"].as_array().unwrap().len(), 250);
        assert_eq!(catalog.search_pages(), vec![1, 2, 3]);
        assert!(
            catalog
                .searches
                .lock()
                .unwrap()
                .iter()
                .all(|(term, _, size)| term == "sales" && *size == 100)
        );
    }

    #[test]
    fn test_total_read_from_first_page_only() {
        let catalog = Arc::new(MemoryCatalog {
            hits: (1..=5).map(table).collect(),
            totals: vec![4, 1_000],
            ..MemoryCatalog::default()
        });

        let doc = export_to_value(
            Arc::clone(&catalog),
            &ExportOptions::default().with_page_size(2),
        );

        assert_eq!(catalog.search_pages(), vec![1, 2]);
        assert_eq!(doc["catalog"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_empty_catalog_yields_empty_document() {
        let catalog = Arc::new(MemoryCatalog::default());
        let doc = export_to_value(Arc::clone(&catalog), &ExportOptions::default());

        assert_eq!(doc, json!({"catalog": []}));
        assert_eq!(catalog.search_pages(), vec![1]);
    }

    #[test]
    fn test_search_failure_aborts_and_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let catalog = Arc::new(MemoryCatalog {
            hits: (1..=150).map(table).collect(),
            totals: vec![150],
            fail_search_page: Some(2),
            ..MemoryCatalog::default()
        });

        let result = ExportService::new(Arc::clone(&catalog) as Arc<dyn CatalogClient>)
            .export_to_file(&path, &ExportOptions::default(), None);

        match result {
            Err(Error::Transport { operation, .. }) => assert_eq!(operation, "search"),
            other => panic!("expected search failure, got {other:?}"),
        }
        assert_eq!(catalog.search_pages(), vec![1, 2]);
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_get_failure_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let catalog = Arc::new(MemoryCatalog {
            hits: vec![
                table(1),
                asset(json!({
                    "id": "https://src/catalogs/c/views/tables/2",
                    "annotations": {"tableDataProfiles": []}
                })),
            ],
            fail_get: true,
            ..MemoryCatalog::default()
        });

        let result =
            ExportService::new(catalog).export_to_file(&path, &ExportOptions::default(), None);

        assert!(matches!(result, Err(Error::UnexpectedStatus { status: 500, .. })));
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}

// ============================================================================
// Import
// ============================================================================

mod import {
    use super::*;

    #[test]
    fn test_malformed_document_issues_no_updates() {
        let catalog = Arc::new(MemoryCatalog::default());
        let service = ImportService::new(Arc::clone(&catalog) as Arc<dyn CatalogClient>);

        for doc in [
            r#"{"items":[{"id":"a/b/c"}]}"#,
            r#"[{"id":"a/b/c"}]"#,
            r#"{"catalog":{"id":"a/b/c"}}"#,
        ] {
            let result =
                service.import_from_reader(doc.as_bytes(), &ImportOptions::default(), None);
            assert!(matches!(result, Err(Error::MalformedDocument(_))), "{doc}");
        }
        assert!(catalog.updates.lock().unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let service = ImportService::new(Arc::new(MemoryCatalog::default()));

        let result = service.import_from_file(
            &dir.path().join("missing.json"),
            &ImportOptions::default(),
            None,
        );
        assert!(result.is_err());
    }
}

// ============================================================================
// Round trip
// ============================================================================

#[test]
fn test_export_then_import_recreates_every_asset() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.json");

    let mut hits: Vec<Asset> = (1..=7).map(table).collect();
    hits.push(asset(json!({
        "id": "https://src/catalogs/c/views/containers/1",
        "properties": {"name": "db"},
        "annotations": {"experts": [{"properties": {"expert": "x"}, "creatorId": "amy@contoso.com"}]}
    })));
    let source = Arc::new(MemoryCatalog::with_hits(hits));

    let exported = ExportService::new(source)
        .export_to_file(&path, &ExportOptions::default().with_page_size(3), None)
        .unwrap();
    assert_eq!(exported.exported, 8);
    assert_eq!(exported.pages_fetched, 3);
    assert_eq!(exported.output_path.as_deref(), Some(path.display().to_string().as_str()));

    let target = Arc::new(MemoryCatalog::default());
    let imported = ImportService::new(Arc::clone(&target) as Arc<dyn CatalogClient>)
        .import_from_file(&path, &ImportOptions::default(), None)
        .unwrap();

    assert_eq!(imported.succeeded, 8);
    assert_eq!(imported.failed, 0);

    let updates = target.updates.lock().unwrap();
    assert_eq!(updates.len(), 8);
    assert!(updates[..7].iter().all(|(view, _)| view == "tables"));
    assert_eq!(updates[7].0, "containers");
    assert!(updates.iter().all(|(_, payload)| payload.id().is_none()));
    assert_eq!(
        updates[7].1.as_map()["annotations"]["experts"][0]["creatorId"],
        "imported_amy@contoso.com"
    );
}
