//! Turns fetched listing and detail pages into candidate records.
//!
//! Extraction is pure: no I/O, no side effects. Both entry points return
//! lazy iterators borrowing the parsed document; a page without the expected
//! blocks simply yields nothing. A single malformed block is skipped with a
//! warning without ending the sequence.

mod artists;
mod tracks;

pub use artists::{artist_slug, extract_artists, ArtistRecord};
pub use tracks::{extract_tracks, track_filename, TrackRecord, TRACK_AUDIO_EXTENSION};

use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

lazy_static! {
    /// Numeric path segment followed by at least one more segment, e.g.
    /// `/singer/42/some-name/`. The last such segment wins.
    static ref CATALOG_ID: Regex = Regex::new(r".*/(\d+)/.*").expect("valid regex");
}

/// Parses a fetched page body.
///
/// The returned document is not `Send`; extract what is needed before the
/// next `.await`.
pub fn parse_document(body: &str) -> Html {
    Html::parse_document(body)
}

/// Extracts the catalog identifier embedded in a detail link.
pub fn parse_catalog_id(href: &str) -> Option<i64> {
    CATALOG_ID
        .captures(href)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// `url` with its path ending in `/`, so that joining a relative path
/// appends to it instead of replacing the last segment.
pub fn directory_url(url: &Url) -> Url {
    let mut url = url.clone();
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

/// Trimmed text content of the first element matching `selector` under `root`.
pub(crate) fn first_text(root: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let text = root
        .select(selector)
        .next()?
        .text()
        .collect::<String>()
        .trim()
        .to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Attribute value of the first element matching `selector` under `root`.
pub(crate) fn first_attr<'a>(
    root: ElementRef<'a>,
    selector: &Selector,
    attr: &str,
) -> Option<&'a str> {
    root.select(selector).next()?.value().attr(attr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_catalog_id() {
        assert_eq!(parse_catalog_id("/singer/42/some-name/"), Some(42));
        assert_eq!(
            parse_catalog_id("http://example.com/play/1234/al-noor.html"),
            Some(1234)
        );
        // Greedy prefix: the last numeric segment followed by a slash wins
        assert_eq!(parse_catalog_id("/7/singer/99/x"), Some(99));
    }

    #[test]
    fn test_directory_url() {
        let url = |s: &str| Url::parse(s).unwrap();
        assert_eq!(
            directory_url(&url("http://site.example/anasheed")).as_str(),
            "http://site.example/anasheed/"
        );
        assert_eq!(
            directory_url(&url("http://site.example/anasheed/")).as_str(),
            "http://site.example/anasheed/"
        );
        assert_eq!(
            directory_url(&url("http://site.example")).as_str(),
            "http://site.example/"
        );
    }

    #[test]
    fn test_parse_catalog_id_rejects_links_without_id() {
        assert_eq!(parse_catalog_id("/singer/name/"), None);
        // A trailing number with nothing after it is not an id segment
        assert_eq!(parse_catalog_id("/singer/42"), None);
        assert_eq!(parse_catalog_id(""), None);
        assert_eq!(parse_catalog_id("/singer/99999999999999999999999/x"), None);
    }
}
