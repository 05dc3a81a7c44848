use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub db_path: Option<String>,
    pub media_path: Option<String>,
    pub images_dir: Option<String>,
    pub audio_dir: Option<String>,
    pub track_reference_salt: Option<String>,

    // Sections
    pub site: Option<SiteConfig>,
    pub fetcher: Option<FetcherConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct SiteConfig {
    pub base_url: Option<String>,
    pub listing_path: Option<String>,
    /// Supports `{base_url}`, `{source_id}` and `{slug}` placeholders.
    pub artist_detail_template: Option<String>,
    /// Supports `{base_url}` and `{source_id}` placeholders.
    pub track_download_template: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct FetcherConfig {
    pub timeout_sec: Option<u64>,
    pub user_agent: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
