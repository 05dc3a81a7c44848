//! Records persisted by the catalog store.

use std::fmt;

macro_rules! row_id {
    ($name:ident) => {
        /// Surrogate identity assigned by the store on first insert.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

row_id!(ArtistId);
row_id!(TrackId);
row_id!(StreamReferenceId);

/// Kind of record, used in error messages and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Artist,
    Track,
    StreamReference,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Artist => "artist",
            EntityKind::Track => "track",
            EntityKind::StreamReference => "stream reference",
        })
    }
}

/// Artist candidate, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArtist {
    pub source_id: i64,
    pub name: String,
    /// Content-derived filename of the downloaded image.
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artist {
    pub id: ArtistId,
    pub source_id: i64,
    pub name: String,
    pub image: String,
}

/// Track candidate, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTrack {
    pub source_id: i64,
    pub artist_id: ArtistId,
    pub name: String,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub id: TrackId,
    pub source_id: i64,
    pub artist_id: ArtistId,
    pub name: String,
    pub listeners: i64,
    pub downloads: i64,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStreamReference {
    pub reference: String,
    pub track_id: TrackId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamReference {
    pub id: StreamReferenceId,
    pub reference: String,
    pub track_id: TrackId,
}

/// Outcome of a save: the record's identity and whether this call created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Persisted<Id> {
    pub id: Id,
    pub inserted: bool,
}

impl<Id> Persisted<Id> {
    pub fn inserted(id: Id) -> Self {
        Self { id, inserted: true }
    }

    pub fn existing(id: Id) -> Self {
        Self {
            id,
            inserted: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogCounts {
    pub artists: usize,
    pub tracks: usize,
    pub stream_references: usize,
}
