//! SQLite schema for the crawled catalog.
//!
//! Surrogate integer ids are assigned by SQLite, the catalog's own numeric
//! identifiers (`source_id`) are the natural keys used for deduplication.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP,
};

/// An artist cannot go away while tracks still point at it.
const TRACK_ARTIST_FK: ForeignKey = ForeignKey {
    foreign_table: "artists",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Restrict,
};

/// Deleting a track takes its stream reference with it.
const STREAM_TRACK_FK: ForeignKey = ForeignKey {
    foreign_table: "tracks",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

const ARTISTS_TABLE: Table = Table {
    name: "artists",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "source_id",
            &SqlType::Integer,
            non_null = true,
            is_unique = true
        ),
        sqlite_column!("name", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("image", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_artists_name", "name")],
};

const TRACKS_TABLE: Table = Table {
    name: "tracks",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "source_id",
            &SqlType::Integer,
            non_null = true,
            is_unique = true
        ),
        sqlite_column!(
            "artist_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&TRACK_ARTIST_FK)
        ),
        sqlite_column!("name", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!(
            "listeners",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "downloads",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "filename",
            &SqlType::Text,
            non_null = true,
            is_unique = true
        ),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[
        ("idx_tracks_name", "name"),
        ("idx_tracks_artist", "artist_id"),
    ],
};

const STREAMS_TABLE: Table = Table {
    name: "streams",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "reference",
            &SqlType::Text,
            non_null = true,
            is_unique = true
        ),
        sqlite_column!(
            "track_id",
            &SqlType::Integer,
            non_null = true,
            is_unique = true,
            foreign_key = Some(&STREAM_TRACK_FK)
        ),
    ],
    indices: &[],
};

pub const CATALOG_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[ARTISTS_TABLE, TRACKS_TABLE, STREAMS_TABLE],
    migration: None,
}];

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn create_schema() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        let schema = &CATALOG_VERSIONED_SCHEMAS[0];
        schema.create(&conn).unwrap();
        schema.validate(&conn).unwrap();
        conn
    }

    #[test]
    fn test_schema_creates_successfully() {
        create_schema();
    }

    #[test]
    fn test_track_counters_default_to_zero() {
        let conn = create_schema();
        conn.execute(
            "INSERT INTO artists (source_id, name, image) VALUES (7, 'Artist', 'a.jpg')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO tracks (source_id, artist_id, name, filename) VALUES (70, 1, 'Al Noor', 'al_noor.mp3')",
            [],
        )
        .unwrap();

        let (listeners, downloads): (i64, i64) = conn
            .query_row(
                "SELECT listeners, downloads FROM tracks WHERE source_id = 70",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!((listeners, downloads), (0, 0));
    }

    #[test]
    fn test_stream_requires_existing_track() {
        let conn = create_schema();
        let result = conn.execute(
            "INSERT INTO streams (reference, track_id) VALUES ('abc', 42)",
            [],
        );
        assert!(result.is_err());
    }
}
