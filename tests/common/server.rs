//! Test site lifecycle management
//!
//! This module spawns a small HTTP server that plays the catalog site: a
//! listing page, one detail page per artist, artist images and track
//! downloads. Every request is counted per path so tests can assert how often
//! an asset was fetched.

use super::fixtures::{default_catalog, render_detail, render_listing, FixtureArtist};
use super::constants::*;
use axum::extract::{Path, State};
use axum::http::{StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// Failures the test site should produce.
#[derive(Debug, Clone, Default)]
pub struct SiteBehavior {
    /// Status returned for the listing page instead of the page itself
    pub listing_status: Option<StatusCode>,
    /// Artist catalog ids whose detail page answers 500
    pub failing_details: HashSet<i64>,
    /// Track catalog ids whose download answers 404
    pub missing_tracks: HashSet<i64>,
    /// Image paths (as written in the listing) that answer 404
    pub missing_images: HashSet<String>,
}

struct SiteState {
    artists: Vec<FixtureArtist>,
    behavior: SiteBehavior,
    hits: Mutex<HashMap<String, usize>>,
}

impl SiteState {
    fn record(&self, uri: &Uri) {
        let mut hits = self.hits.lock().unwrap();
        *hits.entry(uri.path().to_string()).or_default() += 1;
    }
}

/// Test site instance serving the fixture catalog
///
/// When dropped, the server gracefully shuts down.
pub struct TestSite {
    /// Base URL for the crawler (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    state: Arc<SiteState>,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestSite {
    /// Spawns the default two-artist catalog with no failures.
    pub async fn spawn() -> Self {
        Self::spawn_with(default_catalog(), SiteBehavior::default()).await
    }

    /// Spawns a site serving `artists` on a random port.
    ///
    /// The listener is bound before this returns, so the site is ready.
    pub async fn spawn_with(artists: Vec<FixtureArtist>, behavior: SiteBehavior) -> Self {
        Self::start(artists, behavior, None).await
    }

    /// Spawns the default catalog mounted below `prefix` (e.g. "/anasheed").
    ///
    /// `base_url` then carries the prefix without a trailing slash. Hit
    /// counts are keyed by the path below the prefix.
    pub async fn spawn_under(prefix: &'static str) -> Self {
        Self::start(default_catalog(), SiteBehavior::default(), Some(prefix)).await
    }

    async fn start(
        artists: Vec<FixtureArtist>,
        behavior: SiteBehavior,
        prefix: Option<&'static str>,
    ) -> Self {
        let state = Arc::new(SiteState {
            artists,
            behavior,
            hits: Mutex::new(HashMap::new()),
        });

        let app = Router::new()
            .route("/singers", get(listing))
            .route("/singer/{source_id}/{slug}/", get(detail))
            .route("/uploads/singers/{file}", get(image))
            .route("/download/{source_id}/", get(download))
            .with_state(state.clone());
        let app = match prefix {
            Some(prefix) => Router::new().nest(prefix, app),
            None => app,
        };

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        Self {
            base_url: format!("http://127.0.0.1:{}{}", port, prefix.unwrap_or("")),
            state,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Number of requests received for `path`.
    pub fn hits(&self, path: &str) -> usize {
        self.state
            .hits
            .lock()
            .unwrap()
            .get(path)
            .copied()
            .unwrap_or(0)
    }

    /// Number of requests for images and track downloads together.
    pub fn asset_hits(&self) -> usize {
        self.state
            .hits
            .lock()
            .unwrap()
            .iter()
            .filter(|(path, _)| path.starts_with("/uploads/") || path.starts_with("/download/"))
            .map(|(_, count)| count)
            .sum()
    }

    /// Largest number of requests any single asset received.
    pub fn max_hits_per_asset(&self) -> usize {
        self.state
            .hits
            .lock()
            .unwrap()
            .iter()
            .filter(|(path, _)| path.starts_with("/uploads/") || path.starts_with("/download/"))
            .map(|(_, count)| *count)
            .max()
            .unwrap_or(0)
    }

    pub fn image_path(image: &str) -> String {
        format!("/{}", image)
    }

    pub fn download_path(track_source_id: i64) -> String {
        format!("/download/{}/", track_source_id)
    }
}

impl Drop for TestSite {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn listing(State(state): State<Arc<SiteState>>, uri: Uri) -> Response {
    state.record(&uri);
    match state.behavior.listing_status {
        Some(status) => status.into_response(),
        None => Html(render_listing(&state.artists)).into_response(),
    }
}

async fn detail(
    State(state): State<Arc<SiteState>>,
    Path((source_id, _slug)): Path<(i64, String)>,
    uri: Uri,
) -> Response {
    state.record(&uri);
    if state.behavior.failing_details.contains(&source_id) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    match state.artists.iter().find(|a| a.source_id == source_id) {
        Some(artist) => Html(render_detail(artist)).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn image(State(state): State<Arc<SiteState>>, uri: Uri) -> Response {
    state.record(&uri);
    let relative = uri.path().trim_start_matches('/');
    let known = state.artists.iter().any(|a| a.image == relative);
    if !known || state.behavior.missing_images.contains(relative) {
        return StatusCode::NOT_FOUND.into_response();
    }
    TEST_IMAGE_BYTES.into_response()
}

async fn download(
    State(state): State<Arc<SiteState>>,
    Path(source_id): Path<i64>,
    uri: Uri,
) -> Response {
    state.record(&uri);
    let known = state
        .artists
        .iter()
        .flat_map(|a| a.tracks.iter())
        .any(|t| t.source_id == source_id);
    if !known || state.behavior.missing_tracks.contains(&source_id) {
        return StatusCode::NOT_FOUND.into_response();
    }
    TEST_AUDIO_BYTES.into_response()
}
