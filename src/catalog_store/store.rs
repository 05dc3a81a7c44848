//! SQLite-backed catalog store.
//!
//! All access goes through a single connection guarded by a mutex. Each write
//! opens its own `IMMEDIATE` transaction, hands it to the per-entity helper
//! and commits on success; dropping the transaction on any error path rolls
//! it back.

use super::error::StoreError;
use super::models::*;
use super::schema::CATALOG_VERSIONED_SCHEMAS;
use super::trait_def::CatalogStore;
use crate::sqlite_persistence::migrate_if_needed;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::info;

pub struct SqliteCatalogStore {
    conn: Mutex<Connection>,
}

impl SqliteCatalogStore {
    /// Opens (creating if needed) the catalog database at `db_path` and brings
    /// its schema up to date.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, StoreError> {
        let conn = Connection::open_with_flags(
            db_path.as_ref(),
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        let store = Self::from_connection(conn)?;

        let counts = store.counts()?;
        info!(
            "Opened catalog at {:?}: {} artists, {} tracks, {} stream references",
            db_path.as_ref(),
            counts.artists,
            counts.tracks,
            counts.stream_references
        );
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(mut conn: Connection) -> Result<Self, StoreError> {
        // Foreign key enforcement is per connection in SQLite.
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrate_if_needed(&mut conn, CATALOG_VERSIONED_SCHEMAS).map_err(StoreError::Schema)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn in_transaction<T>(
        &self,
        f: impl FnOnce(&Transaction) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut conn = self.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    // =========================================================================
    // Row mapping
    // =========================================================================

    fn artist_from_row(row: &Row) -> rusqlite::Result<Artist> {
        Ok(Artist {
            id: ArtistId(row.get(0)?),
            source_id: row.get(1)?,
            name: row.get(2)?,
            image: row.get(3)?,
        })
    }

    fn track_from_row(row: &Row) -> rusqlite::Result<Track> {
        Ok(Track {
            id: TrackId(row.get(0)?),
            source_id: row.get(1)?,
            artist_id: ArtistId(row.get(2)?),
            name: row.get(3)?,
            listeners: row.get(4)?,
            downloads: row.get(5)?,
            filename: row.get(6)?,
        })
    }

    fn stream_from_row(row: &Row) -> rusqlite::Result<StreamReference> {
        Ok(StreamReference {
            id: StreamReferenceId(row.get(0)?),
            reference: row.get(1)?,
            track_id: TrackId(row.get(2)?),
        })
    }
}

const ARTIST_COLUMNS: &str = "id, source_id, name, image";
const TRACK_COLUMNS: &str = "id, source_id, artist_id, name, listeners, downloads, filename";
const STREAM_COLUMNS: &str = "id, reference, track_id";

// =============================================================================
// Per-entity insert-or-fetch, scoped to the caller's transaction
// =============================================================================

fn insert_or_get_artist(
    tx: &Transaction,
    artist: &NewArtist,
) -> Result<Persisted<ArtistId>, StoreError> {
    let inserted: Option<i64> = tx
        .query_row(
            "INSERT INTO artists (source_id, name, image) VALUES (?1, ?2, ?3)
             ON CONFLICT(source_id) DO NOTHING RETURNING id",
            params![artist.source_id, artist.name, artist.image],
            |r| r.get(0),
        )
        .optional()
        .map_err(|e| StoreError::from_insert(e, EntityKind::Artist, artist.source_id))?;

    match inserted {
        Some(id) => Ok(Persisted::inserted(ArtistId(id))),
        None => {
            let id = tx.query_row(
                "SELECT id FROM artists WHERE source_id = ?1",
                params![artist.source_id],
                |r| r.get(0),
            )?;
            Ok(Persisted::existing(ArtistId(id)))
        }
    }
}

fn insert_or_get_track(tx: &Transaction, track: &NewTrack) -> Result<Persisted<TrackId>, StoreError> {
    let inserted: Option<i64> = tx
        .query_row(
            "INSERT INTO tracks (source_id, artist_id, name, filename) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(source_id) DO NOTHING RETURNING id",
            params![track.source_id, track.artist_id.0, track.name, track.filename],
            |r| r.get(0),
        )
        .optional()
        .map_err(|e| StoreError::from_insert(e, EntityKind::Track, track.source_id))?;

    match inserted {
        Some(id) => Ok(Persisted::inserted(TrackId(id))),
        None => {
            let id = tx.query_row(
                "SELECT id FROM tracks WHERE source_id = ?1",
                params![track.source_id],
                |r| r.get(0),
            )?;
            Ok(Persisted::existing(TrackId(id)))
        }
    }
}

fn insert_or_get_stream(
    tx: &Transaction,
    stream: &NewStreamReference,
) -> Result<Persisted<StreamReferenceId>, StoreError> {
    let inserted: Option<i64> = tx
        .query_row(
            "INSERT INTO streams (reference, track_id) VALUES (?1, ?2)
             ON CONFLICT(track_id) DO NOTHING RETURNING id",
            params![stream.reference, stream.track_id.0],
            |r| r.get(0),
        )
        .optional()
        .map_err(|e| StoreError::from_insert(e, EntityKind::StreamReference, stream.track_id))?;

    match inserted {
        Some(id) => Ok(Persisted::inserted(StreamReferenceId(id))),
        None => {
            let id = tx.query_row(
                "SELECT id FROM streams WHERE track_id = ?1",
                params![stream.track_id.0],
                |r| r.get(0),
            )?;
            Ok(Persisted::existing(StreamReferenceId(id)))
        }
    }
}

impl CatalogStore for SqliteCatalogStore {
    fn save_artist(&self, artist: &NewArtist) -> Result<Persisted<ArtistId>, StoreError> {
        self.in_transaction(|tx| insert_or_get_artist(tx, artist))
    }

    fn save_track(&self, track: &NewTrack) -> Result<Persisted<TrackId>, StoreError> {
        self.in_transaction(|tx| insert_or_get_track(tx, track))
    }

    fn save_stream_reference(
        &self,
        stream: &NewStreamReference,
    ) -> Result<Persisted<StreamReferenceId>, StoreError> {
        self.in_transaction(|tx| insert_or_get_stream(tx, stream))
    }

    fn find_artist_by_source_id(&self, source_id: i64) -> Result<Option<Artist>, StoreError> {
        let conn = self.lock();
        Ok(conn
            .query_row(
                &format!("SELECT {} FROM artists WHERE source_id = ?1", ARTIST_COLUMNS),
                params![source_id],
                Self::artist_from_row,
            )
            .optional()?)
    }

    fn find_track_by_source_id(&self, source_id: i64) -> Result<Option<Track>, StoreError> {
        let conn = self.lock();
        Ok(conn
            .query_row(
                &format!("SELECT {} FROM tracks WHERE source_id = ?1", TRACK_COLUMNS),
                params![source_id],
                Self::track_from_row,
            )
            .optional()?)
    }

    fn find_stream_reference_by_track(
        &self,
        track_id: TrackId,
    ) -> Result<Option<StreamReference>, StoreError> {
        let conn = self.lock();
        Ok(conn
            .query_row(
                &format!("SELECT {} FROM streams WHERE track_id = ?1", STREAM_COLUMNS),
                params![track_id.0],
                Self::stream_from_row,
            )
            .optional()?)
    }

    fn get_artist(&self, id: ArtistId) -> Result<Option<Artist>, StoreError> {
        let conn = self.lock();
        Ok(conn
            .query_row(
                &format!("SELECT {} FROM artists WHERE id = ?1", ARTIST_COLUMNS),
                params![id.0],
                Self::artist_from_row,
            )
            .optional()?)
    }

    fn get_track(&self, id: TrackId) -> Result<Option<Track>, StoreError> {
        let conn = self.lock();
        Ok(conn
            .query_row(
                &format!("SELECT {} FROM tracks WHERE id = ?1", TRACK_COLUMNS),
                params![id.0],
                Self::track_from_row,
            )
            .optional()?)
    }

    fn get_artist_tracks(&self, artist_id: ArtistId) -> Result<Vec<Track>, StoreError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM tracks WHERE artist_id = ?1 ORDER BY id",
            TRACK_COLUMNS
        ))?;
        let tracks = stmt
            .query_map(params![artist_id.0], Self::track_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tracks)
    }

    fn counts(&self) -> Result<CatalogCounts, StoreError> {
        let conn = self.lock();
        let count = |table: &str| -> Result<usize, StoreError> {
            let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| {
                r.get(0)
            })?;
            Ok(n as usize)
        };
        Ok(CatalogCounts {
            artists: count("artists")?,
            tracks: count("tracks")?,
            stream_references: count("streams")?,
        })
    }

    fn delete_artist(&self, id: ArtistId) -> Result<bool, StoreError> {
        self.in_transaction(|tx| {
            let deleted = tx
                .execute("DELETE FROM artists WHERE id = ?1", params![id.0])
                .map_err(|e| StoreError::from_delete(e, EntityKind::Artist, id.0))?;
            Ok(deleted > 0)
        })
    }

    fn delete_track(&self, id: TrackId) -> Result<bool, StoreError> {
        self.in_transaction(|tx| {
            let deleted = tx
                .execute("DELETE FROM tracks WHERE id = ?1", params![id.0])
                .map_err(|e| StoreError::from_delete(e, EntityKind::Track, id.0))?;
            Ok(deleted > 0)
        })
    }
}
