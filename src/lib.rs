//! Catalog Crawler Library
//!
//! Crawls a catalog site (artists, their tracks and the tracks' audio) into a
//! local SQLite catalog and media directory. Exposes the internal modules for
//! the binary and for integration tests.

pub mod asset_store;
pub mod catalog_store;
pub mod config;
pub mod content_hash;
pub mod extractor;
pub mod fetcher;
pub mod ingestion;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use asset_store::AssetStore;
pub use catalog_store::{CatalogStore, SqliteCatalogStore};
pub use fetcher::PageFetcher;
pub use ingestion::{CatalogCrawler, CrawlReport, CrawlerConfig, IngestionError};
