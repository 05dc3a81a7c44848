use std::sync::Arc;
use tracing::{info, warn};

use super::error::IngestionError;
use super::report::CrawlReport;
use super::stream_reference::stream_reference;
use crate::asset_store::{AssetClass, AssetError, AssetStore};
use crate::catalog_store::{
    ArtistId, CatalogStore, NewArtist, NewStreamReference, NewTrack, Persisted, StoreError,
};
use crate::config::{AppConfig, SiteSettings};
use crate::extractor::{extract_artists, extract_tracks, parse_document, ArtistRecord, TrackRecord};
use crate::fetcher::{FetchError, PageFetcher};

/// Configuration for the CatalogCrawler.
#[derive(Clone)]
pub struct CrawlerConfig {
    pub site: SiteSettings,
    /// Secret mixed into every stream reference.
    pub track_reference_salt: String,
}

impl From<&AppConfig> for CrawlerConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            site: config.site.clone(),
            track_reference_salt: config.track_reference_salt.clone(),
        }
    }
}

/// Runs one sequential crawl pass over the catalog site.
pub struct CatalogCrawler {
    config: CrawlerConfig,
    fetcher: PageFetcher,
    assets: AssetStore,
    store: Arc<dyn CatalogStore>,
}

impl CatalogCrawler {
    pub fn new(
        config: CrawlerConfig,
        fetcher: PageFetcher,
        assets: AssetStore,
        store: Arc<dyn CatalogStore>,
    ) -> Self {
        Self {
            config,
            fetcher,
            assets,
            store,
        }
    }

    /// Fetches the artist listing and ingests every artist found on it.
    ///
    /// Running this twice against an unchanged site is a no-op: known assets
    /// are not downloaded again and known records are not written again.
    pub async fn run(&self) -> Result<CrawlReport, IngestionError> {
        self.assets.init().await.map_err(IngestionError::Asset)?;

        let mut report = CrawlReport::default();
        let listing_url = self.config.site.listing_url();
        info!("Getting artists from {}...", listing_url);

        let body = self
            .fetcher
            .fetch_page(&listing_url)
            .await
            .map_err(IngestionError::listing)?;
        let artists: Vec<ArtistRecord> = {
            let document = parse_document(&body);
            extract_artists(&document, &self.config.site.base_url).collect()
        };
        if artists.is_empty() {
            warn!("No artists found on {}", listing_url);
        }

        for artist in &artists {
            report.artists_seen += 1;
            self.ingest_artist(artist, &mut report).await?;
        }

        info!("Crawl completed: {}", report);
        Ok(report)
    }

    async fn ingest_artist(
        &self,
        record: &ArtistRecord,
        report: &mut CrawlReport,
    ) -> Result<(), IngestionError> {
        // The image comes first so that a stored artist always has one. For a
        // known artist the file is already there and nothing is fetched.
        let image = record.image_filename();
        match self
            .assets
            .materialize(record.image_url.as_str(), &image, AssetClass::Image)
            .await
        {
            Ok(asset) => report.record_asset(&asset),
            Err(e) => {
                let e = skippable(e)?;
                warn!(
                    "Skipping artist {} ({}), image unavailable: {}",
                    record.name, record.source_id, e
                );
                report.artists_skipped += 1;
                return Ok(());
            }
        }

        let artist = NewArtist {
            source_id: record.source_id,
            name: record.name.clone(),
            image,
        };
        let artist_id = match unless_conflict(self.store.save_artist(&artist))? {
            Some(saved) => {
                count_saved(
                    &saved,
                    &mut report.artists_inserted,
                    &mut report.artists_existing,
                );
                saved.id
            }
            None => {
                report.artists_skipped += 1;
                return Ok(());
            }
        };

        let detail_url = self
            .config
            .site
            .artist_detail_url(record.source_id, &record.slug());
        let body = match self.fetcher.fetch_page(&detail_url).await {
            Ok(body) => body,
            Err(e) if e.is_transport() => return Err(IngestionError::Transport(e)),
            Err(e) => {
                warn!("No tracks for {}: {}", record.name, e);
                report.detail_pages_failed += 1;
                return Ok(());
            }
        };

        info!("Getting tracks for: {}...", record.name);
        let tracks = collect_tracks(&body, artist_id);
        for track in &tracks {
            report.tracks_seen += 1;
            self.ingest_track(track, report).await?;
        }
        Ok(())
    }

    async fn ingest_track(
        &self,
        record: &TrackRecord,
        report: &mut CrawlReport,
    ) -> Result<(), IngestionError> {
        let url = self.config.site.track_download_url(record.source_id);
        info!("Downloading track: {}...", record.name);

        // The asset must be on disk before the track is persisted.
        match self
            .assets
            .materialize(&url, &record.filename, AssetClass::Audio)
            .await
        {
            Ok(asset) => report.record_asset(&asset),
            Err(e) => {
                let e = skippable(e)?;
                warn!(
                    "Skipping track {} ({}): {}",
                    record.name, record.source_id, e
                );
                report.tracks_skipped += 1;
                return Ok(());
            }
        }

        let track = NewTrack {
            source_id: record.source_id,
            artist_id: record.artist_id,
            name: record.name.clone(),
            filename: record.filename.clone(),
        };
        let Some(saved) = unless_conflict(self.store.save_track(&track))? else {
            report.tracks_skipped += 1;
            return Ok(());
        };
        count_saved(
            &saved,
            &mut report.tracks_inserted,
            &mut report.tracks_existing,
        );

        let stream = NewStreamReference {
            reference: stream_reference(&record.name, &self.config.track_reference_salt),
            track_id: saved.id,
        };
        match unless_conflict(self.store.save_stream_reference(&stream))? {
            Some(saved) if saved.inserted => report.stream_references_inserted += 1,
            Some(_) => {}
            None => report.stream_references_skipped += 1,
        }
        Ok(())
    }
}

/// Parses a detail page. The document is not `Send`, so it must not outlive
/// this call.
fn collect_tracks(body: &str, artist_id: ArtistId) -> Vec<TrackRecord> {
    let document = parse_document(body);
    extract_tracks(&document, artist_id).collect()
}

/// Asset failures limited to one item are handed back to be skipped; an
/// unreachable source or a failing disk ends the crawl.
fn skippable(error: AssetError) -> Result<AssetError, IngestionError> {
    match error {
        AssetError::Fetch(e @ FetchError::Transport { .. }) => Err(IngestionError::Transport(e)),
        AssetError::Fetch(FetchError::Status { .. }) | AssetError::InvalidFilename(_) => Ok(error),
        AssetError::Io { .. } => Err(IngestionError::Asset(error)),
    }
}

/// Turns an integrity conflict into `None` after logging it.
fn unless_conflict<T>(result: Result<T, StoreError>) -> Result<Option<T>, IngestionError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_integrity_conflict() => {
            warn!("Skipping record: {}", e);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn count_saved<Id>(saved: &Persisted<Id>, inserted: &mut usize, existing: &mut usize) {
    if saved.inserted {
        *inserted += 1;
    } else {
        *existing += 1;
    }
}
