use std::fmt;

use crate::asset_store::Materialized;

/// What a single crawl pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlReport {
    pub artists_seen: usize,
    pub artists_inserted: usize,
    pub artists_existing: usize,
    pub artists_skipped: usize,
    /// Artists whose detail page answered with a non-success status.
    pub detail_pages_failed: usize,
    pub tracks_seen: usize,
    pub tracks_inserted: usize,
    pub tracks_existing: usize,
    pub tracks_skipped: usize,
    pub stream_references_inserted: usize,
    /// References rejected by an integrity conflict; their track is stored
    /// without one.
    pub stream_references_skipped: usize,
    pub assets_downloaded: usize,
    pub assets_present: usize,
}

impl CrawlReport {
    pub(super) fn record_asset(&mut self, asset: &Materialized) {
        if asset.downloaded {
            self.assets_downloaded += 1;
        } else {
            self.assets_present += 1;
        }
    }
}

impl fmt::Display for CrawlReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "artists: {} seen, {} new, {} known, {} skipped ({} without detail page); \
             tracks: {} seen, {} new, {} known, {} skipped; \
             stream references: {} new, {} skipped; assets: {} downloaded, {} already present",
            self.artists_seen,
            self.artists_inserted,
            self.artists_existing,
            self.artists_skipped,
            self.detail_pages_failed,
            self.tracks_seen,
            self.tracks_inserted,
            self.tracks_existing,
            self.tracks_skipped,
            self.stream_references_inserted,
            self.stream_references_skipped,
            self.assets_downloaded,
            self.assets_present,
        )
    }
}
