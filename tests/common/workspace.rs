//! Temporary database and media directories for a crawl.

use super::constants::TEST_SALT;
use super::server::TestSite;
use catalog_crawler::asset_store::AssetStore;
use catalog_crawler::catalog_store::{CatalogStore, SqliteCatalogStore};
use catalog_crawler::config::{FetcherSettings, SiteSettings};
use catalog_crawler::fetcher::PageFetcher;
use catalog_crawler::ingestion::{CatalogCrawler, CrawlerConfig};
use reqwest::Url;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Database plus media directories, cleaned up on drop.
pub struct TestWorkspace {
    pub store: Arc<SqliteCatalogStore>,
    dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = Arc::new(
            SqliteCatalogStore::new(dir.path().join("catalog.db"))
                .expect("Failed to open catalog store"),
        );
        Self { store, dir }
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("catalog.db")
    }

    pub fn images_dir(&self) -> PathBuf {
        self.dir.path().join("artists")
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.dir.path().join("tracks")
    }

    /// A crawler pointed at `site`, writing into this workspace.
    pub fn crawler(&self, site: &TestSite) -> CatalogCrawler {
        self.crawler_for(&site.base_url)
    }

    /// A crawler pointed at an arbitrary base URL.
    pub fn crawler_for(&self, base_url: &str) -> CatalogCrawler {
        let base_url = Url::parse(base_url).expect("Invalid site url");
        let fetcher = PageFetcher::new(&FetcherSettings {
            timeout_sec: 5,
            ..Default::default()
        })
        .expect("Failed to build fetcher");
        let assets = AssetStore::new(self.images_dir(), self.audio_dir(), fetcher.clone());
        let config = CrawlerConfig {
            site: SiteSettings::new(base_url),
            track_reference_salt: TEST_SALT.to_string(),
        };
        CatalogCrawler::new(
            config,
            fetcher,
            assets,
            self.store.clone() as Arc<dyn CatalogStore>,
        )
    }

    /// Sorted names of the files in `dir`.
    pub fn files_in(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = match std::fs::read_dir(dir) {
            Ok(entries) => entries
                .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
                .collect(),
            Err(_) => Vec::new(),
        };
        names.sort();
        names
    }
}
