mod file_config;

pub use file_config::{FetcherConfig, FileConfig, SiteConfig};

use anyhow::{anyhow, bail, Context, Result};
use reqwest::Url;
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable holding the stream reference salt.
pub const TRACK_REFERENCE_SALT_ENV: &str = "TRACK_REFERENCE_SALT";

pub const DEFAULT_LISTING_PATH: &str = "/singers";
pub const DEFAULT_ARTIST_DETAIL_TEMPLATE: &str = "{base_url}/singer/{source_id}/{slug}/";
pub const DEFAULT_TRACK_DOWNLOAD_TEMPLATE: &str = "{base_url}/download/{source_id}/";
pub const DEFAULT_REQUEST_TIMEOUT_SEC: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub media_path: Option<PathBuf>,
    pub base_url: Option<String>,
    pub request_timeout_sec: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub media_path: PathBuf,
    pub images_dir: PathBuf,
    pub audio_dir: PathBuf,
    pub site: SiteSettings,
    pub fetcher: FetcherSettings,
    pub track_reference_salt: String,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("db_path", &self.db_path)
            .field("media_path", &self.media_path)
            .field("images_dir", &self.images_dir)
            .field("audio_dir", &self.audio_dir)
            .field("site", &self.site)
            .field("fetcher", &self.fetcher)
            .field("track_reference_salt", &"<redacted>")
            .finish()
    }
}

/// Where the catalog lives and how its URLs are built.
#[derive(Debug, Clone)]
pub struct SiteSettings {
    pub base_url: Url,
    pub listing_path: String,
    pub artist_detail_template: String,
    pub track_download_template: String,
}

impl SiteSettings {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            listing_path: DEFAULT_LISTING_PATH.to_string(),
            artist_detail_template: DEFAULT_ARTIST_DETAIL_TEMPLATE.to_string(),
            track_download_template: DEFAULT_TRACK_DOWNLOAD_TEMPLATE.to_string(),
        }
    }

    /// The base URL without trailing slash, as substituted into templates.
    fn base(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub fn listing_url(&self) -> String {
        format!(
            "{}/{}",
            self.base(),
            self.listing_path.trim_start_matches('/')
        )
    }

    pub fn artist_detail_url(&self, source_id: i64, slug: &str) -> String {
        self.artist_detail_template
            .replace("{base_url}", self.base())
            .replace("{source_id}", &source_id.to_string())
            .replace("{slug}", slug)
    }

    pub fn track_download_url(&self, source_id: i64) -> String {
        self.track_download_template
            .replace("{base_url}", self.base())
            .replace("{source_id}", &source_id.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct FetcherSettings {
    pub timeout_sec: u64,
    pub user_agent: String,
}

impl Default for FetcherSettings {
    fn default() -> Self {
        Self {
            timeout_sec: DEFAULT_REQUEST_TIMEOUT_SEC,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present. The salt is taken from
    /// the environment first, then from the file.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let env_salt = std::env::var(TRACK_REFERENCE_SALT_ENV).ok();
        Self::resolve_with_salt(cli, file_config, env_salt)
    }

    fn resolve_with_salt(
        cli: &CliConfig,
        file_config: Option<FileConfig>,
        env_salt: Option<String>,
    ) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = resolve_db_path(cli, Some(&file))?;
        let db_dir = match db_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let media_path = file
            .media_path
            .map(PathBuf::from)
            .or_else(|| cli.media_path.clone())
            .unwrap_or_else(|| db_dir.clone());
        let images_dir = file
            .images_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| media_path.join("artists"));
        let audio_dir = file
            .audio_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| media_path.join("tracks"));

        let site_file = file.site.unwrap_or_default();
        let base_url = site_file
            .base_url
            .or_else(|| cli.base_url.clone())
            .ok_or_else(|| {
                anyhow!("base_url must be specified via --base-url or in the [site] section")
            })?;
        let base_url = Url::parse(&base_url)
            .with_context(|| format!("Invalid base_url: {:?}", base_url))?;
        if base_url.cannot_be_a_base() {
            bail!("base_url cannot be used as a base: {}", base_url);
        }

        let mut site = SiteSettings::new(base_url);
        if let Some(listing_path) = site_file.listing_path {
            site.listing_path = listing_path;
        }
        if let Some(template) = site_file.artist_detail_template {
            site.artist_detail_template = template;
        }
        if let Some(template) = site_file.track_download_template {
            site.track_download_template = template;
        }
        for (name, template) in [
            ("artist_detail_template", &site.artist_detail_template),
            ("track_download_template", &site.track_download_template),
        ] {
            if !template.contains("{source_id}") {
                bail!("{} must contain {{source_id}}: {:?}", name, template);
            }
        }

        let fetcher_file = file.fetcher.unwrap_or_default();
        let fetcher = FetcherSettings {
            timeout_sec: fetcher_file
                .timeout_sec
                .or(cli.request_timeout_sec)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SEC),
            user_agent: fetcher_file
                .user_agent
                .or_else(|| cli.user_agent.clone())
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        };
        if fetcher.timeout_sec == 0 {
            bail!("timeout_sec must be greater than zero");
        }

        let track_reference_salt = env_salt
            .filter(|salt| !salt.is_empty())
            .or(file.track_reference_salt)
            .filter(|salt| !salt.is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "track_reference_salt must be set via {} or in config file",
                    TRACK_REFERENCE_SALT_ENV
                )
            })?;

        Ok(Self {
            db_path,
            media_path,
            images_dir,
            audio_dir,
            site,
            fetcher,
            track_reference_salt,
        })
    }
}

/// Resolves and checks the database location alone, for commands that never
/// touch the source site.
pub fn resolve_db_path(cli: &CliConfig, file: Option<&FileConfig>) -> Result<PathBuf> {
    let db_path = file
        .and_then(|f| f.db_path.as_ref())
        .map(PathBuf::from)
        .or_else(|| cli.db_path.clone())
        .ok_or_else(|| anyhow!("db_path must be specified via --db-path or in config file"))?;

    // The database file may be new, its directory may not
    let db_dir = match db_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    if !db_dir.is_dir() {
        bail!("Database directory does not exist: {:?}", db_dir);
    }
    if db_path.is_dir() {
        bail!("db_path is a directory: {:?}", db_path);
    }
    Ok(db_path)
}
