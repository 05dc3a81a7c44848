//! Fixture catalog site
//!
//! Describes the artists and tracks the test site serves and renders them
//! into the listing and detail pages the crawler parses.

use super::constants::*;

#[derive(Debug, Clone)]
pub struct FixtureTrack {
    pub source_id: i64,
    pub name: &'static str,
}

#[derive(Debug, Clone)]
pub struct FixtureArtist {
    pub source_id: i64,
    pub name: &'static str,
    /// Relative path as written in the listing page
    pub image: &'static str,
    pub tracks: Vec<FixtureTrack>,
}

impl FixtureArtist {
    pub fn slug(&self) -> String {
        self.name.replace(' ', "-")
    }

    /// Path of the detail page, as linked from the listing.
    pub fn detail_path(&self) -> String {
        format!("/singer/{}/{}/", self.source_id, self.slug())
    }
}

/// Two artists: three tracks for the first, two for the second.
pub fn default_catalog() -> Vec<FixtureArtist> {
    vec![
        FixtureArtist {
            source_id: ARTIST_1_SOURCE_ID,
            name: ARTIST_1_NAME,
            image: ARTIST_1_IMAGE,
            tracks: vec![
                FixtureTrack {
                    source_id: TRACK_1_SOURCE_ID,
                    name: TRACK_1_NAME,
                },
                FixtureTrack {
                    source_id: TRACK_2_SOURCE_ID,
                    name: TRACK_2_NAME,
                },
                FixtureTrack {
                    source_id: TRACK_3_SOURCE_ID,
                    name: TRACK_3_NAME,
                },
            ],
        },
        FixtureArtist {
            source_id: ARTIST_2_SOURCE_ID,
            name: ARTIST_2_NAME,
            image: ARTIST_2_IMAGE,
            tracks: vec![
                FixtureTrack {
                    source_id: TRACK_4_SOURCE_ID,
                    name: TRACK_4_NAME,
                },
                FixtureTrack {
                    source_id: TRACK_5_SOURCE_ID,
                    name: TRACK_5_NAME,
                },
            ],
        },
    ]
}

pub fn render_listing(artists: &[FixtureArtist]) -> String {
    let blocks: String = artists
        .iter()
        .map(|artist| {
            format!(
                r#"
    <div class="info-table">
      <div class="thumb"><img src="{image}" alt=""></div>
      <div class="info_cat">
        <a href="{link}"><h2>{name}</h2></a>
        <span class="count">{count} tracks</span>
      </div>
    </div>"#,
                image = artist.image,
                link = artist.detail_path(),
                name = artist.name,
                count = artist.tracks.len(),
            )
        })
        .collect();

    format!(
        "<!DOCTYPE html>\n<html><head><title>Singers</title></head><body>\n\
         <div id=\"singers\">{}\n</div>\n</body></html>",
        blocks
    )
}

pub fn render_detail(artist: &FixtureArtist) -> String {
    let entries: String = artist
        .tracks
        .iter()
        .map(|track| {
            format!(
                r#"
      <li><a class="loadit" href="/play/{id}/{slug}/"><h2>{name}</h2></a></li>"#,
                id = track.source_id,
                slug = track.name.replace(' ', "-"),
                name = track.name,
            )
        })
        .collect();

    format!(
        "<!DOCTYPE html>\n<html><head><title>{}</title></head><body>\n\
         <ul id=\"playlist\">{}\n    </ul>\n</body></html>",
        artist.name, entries
    )
}
