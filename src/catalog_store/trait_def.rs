//! CatalogStore trait definition.

use super::error::StoreError;
use super::models::*;

/// Deduplicating persistence for crawled records.
///
/// Every `save_*` looks the candidate up by its natural key (`source_id` for
/// artists and tracks, `track_id` for stream references). A new candidate is
/// inserted and committed; a known one is left untouched and its existing
/// identity is returned. Either way the call is its own transaction.
pub trait CatalogStore: Send + Sync {
    // =========================================================================
    // Deduplicating writes
    // =========================================================================

    fn save_artist(&self, artist: &NewArtist) -> Result<Persisted<ArtistId>, StoreError>;

    fn save_track(&self, track: &NewTrack) -> Result<Persisted<TrackId>, StoreError>;

    fn save_stream_reference(
        &self,
        stream: &NewStreamReference,
    ) -> Result<Persisted<StreamReferenceId>, StoreError>;

    // =========================================================================
    // Natural key lookups
    // =========================================================================

    fn find_artist_by_source_id(&self, source_id: i64) -> Result<Option<Artist>, StoreError>;

    fn find_track_by_source_id(&self, source_id: i64) -> Result<Option<Track>, StoreError>;

    fn find_stream_reference_by_track(
        &self,
        track_id: TrackId,
    ) -> Result<Option<StreamReference>, StoreError>;

    // =========================================================================
    // Reads
    // =========================================================================

    fn get_artist(&self, id: ArtistId) -> Result<Option<Artist>, StoreError>;

    fn get_track(&self, id: TrackId) -> Result<Option<Track>, StoreError>;

    /// Tracks owned by an artist, in insertion order.
    fn get_artist_tracks(&self, artist_id: ArtistId) -> Result<Vec<Track>, StoreError>;

    fn counts(&self) -> Result<CatalogCounts, StoreError>;

    // =========================================================================
    // Deletes
    // =========================================================================

    /// Deletes an artist. Fails with [`StoreError::Restricted`] while any
    /// track references it. Returns false if no such artist exists.
    fn delete_artist(&self, id: ArtistId) -> Result<bool, StoreError>;

    /// Deletes a track together with its stream reference.
    fn delete_track(&self, id: TrackId) -> Result<bool, StoreError>;
}
