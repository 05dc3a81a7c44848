use futures::StreamExt;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;
use tracing::debug;

use crate::fetcher::{FetchError, PageFetcher};

/// Size of the blocks written to disk while streaming a download.
const WRITE_CHUNK_SIZE: usize = 64 * 1024;

/// Prefix of in-progress downloads inside an asset directory.
const PARTIAL_PREFIX: &str = ".partial-";

#[derive(Debug, Error)]
pub enum AssetError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid filename: {0:?}")]
    InvalidFilename(String),
}

impl AssetError {
    fn io(path: &Path) -> impl FnOnce(std::io::Error) -> AssetError + '_ {
        move |source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Which directory an asset belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetClass {
    Image,
    Audio,
}

/// A file present on disk after [`AssetStore::materialize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Materialized {
    pub path: PathBuf,
    /// False when the file was already there and no request was made.
    pub downloaded: bool,
}

/// Downloads each asset at most once.
///
/// A file whose name already exists in its class directory is never fetched
/// again. New downloads are streamed into a hidden temporary file next to the
/// target and renamed into place once complete, so a visible file is always a
/// whole one. Concurrent calls for the same target are serialized.
pub struct AssetStore {
    images_dir: PathBuf,
    audio_dir: PathBuf,
    fetcher: PageFetcher,
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl AssetStore {
    pub fn new(
        images_dir: impl Into<PathBuf>,
        audio_dir: impl Into<PathBuf>,
        fetcher: PageFetcher,
    ) -> Self {
        Self {
            images_dir: images_dir.into(),
            audio_dir: audio_dir.into(),
            fetcher,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Creates both asset directories.
    pub async fn init(&self) -> Result<(), AssetError> {
        for dir in [&self.images_dir, &self.audio_dir] {
            fs::create_dir_all(dir).await.map_err(AssetError::io(dir))?;
        }
        Ok(())
    }

    pub fn dir(&self, class: AssetClass) -> &Path {
        match class {
            AssetClass::Image => &self.images_dir,
            AssetClass::Audio => &self.audio_dir,
        }
    }

    /// Target path of `filename` within the directory of `class`.
    pub fn path_for(&self, filename: &str, class: AssetClass) -> Result<PathBuf, AssetError> {
        validate_filename(filename)?;
        Ok(self.dir(class).join(filename))
    }

    /// Makes sure `filename` exists in the directory of `class`, downloading
    /// it from `source_url` only if it is not there yet.
    pub async fn materialize(
        &self,
        source_url: &str,
        filename: &str,
        class: AssetClass,
    ) -> Result<Materialized, AssetError> {
        let path = self.path_for(filename, class)?;

        let lock = self.lock_for(&path).await;
        let result = {
            let _guard = lock.lock().await;
            self.materialize_locked(source_url, &path).await
        };
        self.release_lock(&path, lock).await;

        result.map(|downloaded| Materialized { path, downloaded })
    }

    async fn materialize_locked(&self, source_url: &str, path: &Path) -> Result<bool, AssetError> {
        if fs::try_exists(path).await.map_err(AssetError::io(path))? {
            debug!("{:?} already present, not downloading", path);
            return Ok(false);
        }

        let response = self.fetcher.fetch_stream(source_url).await?;
        let bytes = write_atomically(source_url, path, response).await?;
        debug!("Downloaded {} bytes from {} to {:?}", bytes, source_url, path);
        Ok(true)
    }

    async fn lock_for(&self, path: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn release_lock(&self, path: &Path, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().await;
        // One reference in the map, one held here: nobody else is waiting.
        if Arc::strong_count(&lock) == 2 {
            locks.remove(path);
        }
    }
}

async fn write_atomically(
    source_url: &str,
    path: &Path,
    response: reqwest::Response,
) -> Result<u64, AssetError> {
    let dir = path
        .parent()
        .ok_or_else(|| AssetError::InvalidFilename(path.display().to_string()))?;

    // The temporary file is removed when `temp_path` drops on any early return.
    let (std_file, temp_path) = tempfile::Builder::new()
        .prefix(PARTIAL_PREFIX)
        .tempfile_in(dir)
        .map_err(AssetError::io(dir))?
        .into_parts();

    let mut writer = BufWriter::with_capacity(WRITE_CHUNK_SIZE, fs::File::from_std(std_file));
    let mut stream = response.bytes_stream();
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| FetchError::transport(source_url, e))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(AssetError::io(&temp_path))?;
        written += chunk.len() as u64;
    }

    writer.flush().await.map_err(AssetError::io(&temp_path))?;
    let file = writer.into_inner();
    file.sync_all().await.map_err(AssetError::io(&temp_path))?;
    drop(file);

    temp_path
        .persist(path)
        .map_err(|e| AssetError::io(path)(e.error))?;
    Ok(written)
}

/// Asset filenames are opaque identifiers; anything that could escape the
/// asset directory or hide itself is refused rather than rewritten.
fn validate_filename(filename: &str) -> Result<(), AssetError> {
    let invalid = filename.is_empty()
        || filename.starts_with('.')
        || filename.contains(['/', '\\', '\0']);
    if invalid {
        return Err(AssetError::InvalidFilename(filename.to_string()));
    }
    Ok(())
}
