use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use super::{directory_url, first_attr, first_text, parse_catalog_id, selector};
use crate::content_hash::sha256_hex;

lazy_static! {
    static ref ARTIST_BLOCK: Selector = selector("div.info-table");
    static ref THUMB_IMAGE: Selector = selector("div.thumb img");
    static ref INFO_NAME: Selector = selector("div.info_cat a h2");
    static ref INFO_LINK: Selector = selector("div.info_cat a");
    static ref FILE_EXTENSION: Regex =
        Regex::new(r"^.*\.([a-zA-Z0-9]+)$").expect("valid regex");
}

/// An artist as listed on the catalog's listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistRecord {
    /// The catalog's own identifier, parsed from the detail link.
    pub source_id: i64,
    pub name: String,
    pub image_url: Url,
    pub image_extension: String,
}

impl ArtistRecord {
    /// Local filename for the artist image: hex SHA-256 of the name plus the
    /// source file's extension.
    pub fn image_filename(&self) -> String {
        format!("{}.{}", sha256_hex(&[&self.name]), self.image_extension)
    }

    pub fn slug(&self) -> String {
        artist_slug(&self.name)
    }
}

/// Slug used by the source site in detail URLs: spaces become dashes.
pub fn artist_slug(name: &str) -> String {
    name.replace(' ', "-")
}

/// Lazily yields one [`ArtistRecord`] per artist block in a listing page.
///
/// Relative image paths are resolved below `base_url`, which is treated as a
/// directory whether or not it ends in a slash.
pub fn extract_artists<'a>(
    document: &'a Html,
    base_url: &Url,
) -> impl Iterator<Item = ArtistRecord> + 'a {
    let base_url = directory_url(base_url);
    document
        .select(&ARTIST_BLOCK)
        .filter_map(move |block| match parse_artist_block(block, &base_url) {
            Ok(record) => Some(record),
            Err(reason) => {
                warn!("Skipping artist block: {}", reason);
                None
            }
        })
}

fn parse_artist_block(block: ElementRef<'_>, base_url: &Url) -> Result<ArtistRecord, String> {
    let image_src = first_attr(block, &THUMB_IMAGE, "src").ok_or("no thumbnail image")?;
    let image_url = base_url
        .join(image_src.trim())
        .map_err(|e| format!("bad image path {:?}: {}", image_src, e))?;

    let name = first_text(block, &INFO_NAME).ok_or("no artist name")?;

    let href = first_attr(block, &INFO_LINK, "href")
        .ok_or_else(|| format!("no detail link for {}", name))?;
    let source_id = parse_catalog_id(href)
        .ok_or_else(|| format!("no catalog id in link {:?} for {}", href, name))?;

    let image_extension = FILE_EXTENSION
        .captures(image_url.path())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| format!("no extension in image url {} for {}", image_url, name))?;

    Ok(ArtistRecord {
        source_id,
        name,
        image_url,
        image_extension,
    })
}
