//! Crawl-and-ingest pipeline.
//!
//! One sequential pass per invocation:
//! 1. Fetch the artist listing (any failure here ends the run)
//! 2. For each artist: materialize its image, then save the artist
//! 3. Fetch the artist's detail page (a non-success status skips the artist)
//! 4. For each track: materialize its audio, save the track, then save its
//!    stream reference (a missing asset skips just that track)
//!
//! Transport failures end the run wherever they happen.

mod crawler;
mod error;
mod report;
mod stream_reference;

pub use crawler::{CatalogCrawler, CrawlerConfig};
pub use error::{FailureKind, IngestionError};
pub use report::CrawlReport;
pub use stream_reference::stream_reference;
