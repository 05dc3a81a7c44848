use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use super::{first_attr, first_text, parse_catalog_id, selector};
use crate::catalog_store::ArtistId;

/// Extension of every downloaded track.
pub const TRACK_AUDIO_EXTENSION: &str = "mp3";

lazy_static! {
    static ref PLAYLIST_ENTRY: Selector = selector("ul#playlist li");
    static ref TRACK_LINK: Selector = selector("a.loadit");
    static ref TRACK_NAME: Selector = selector("a.loadit h2");
}

/// A track as listed on an artist's detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRecord {
    pub source_id: i64,
    /// Identity the owning artist already received from the store.
    pub artist_id: ArtistId,
    pub name: String,
    pub filename: String,
}

/// Local filename for a track: lower-cased name, spaces replaced by
/// underscores, fixed audio extension.
pub fn track_filename(name: &str) -> String {
    format!(
        "{}.{}",
        name.to_lowercase().replace(' ', "_"),
        TRACK_AUDIO_EXTENSION
    )
}

/// Lazily yields one [`TrackRecord`] per playlist entry of a detail page,
/// in page order.
pub fn extract_tracks(
    document: &Html,
    artist_id: ArtistId,
) -> impl Iterator<Item = TrackRecord> + '_ {
    document
        .select(&PLAYLIST_ENTRY)
        .filter_map(move |entry| match parse_playlist_entry(entry, artist_id) {
            Ok(record) => Some(record),
            Err(reason) => {
                warn!("Skipping playlist entry: {}", reason);
                None
            }
        })
}

fn parse_playlist_entry(entry: ElementRef<'_>, artist_id: ArtistId) -> Result<TrackRecord, String> {
    let name = first_text(entry, &TRACK_NAME).ok_or("no track name")?;
    let href = first_attr(entry, &TRACK_LINK, "href")
        .ok_or_else(|| format!("no link for track {}", name))?;
    let source_id = parse_catalog_id(href)
        .ok_or_else(|| format!("no catalog id in link {:?} for track {}", href, name))?;

    Ok(TrackRecord {
        source_id,
        artist_id,
        filename: track_filename(&name),
        name,
    })
}
