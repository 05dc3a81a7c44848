use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use catalog_crawler::asset_store::AssetStore;
use catalog_crawler::catalog_store::{CatalogStore, SqliteCatalogStore};
use catalog_crawler::config::{self, AppConfig, CliConfig, FileConfig};
use catalog_crawler::fetcher::PageFetcher;
use catalog_crawler::ingestion::{CatalogCrawler, CrawlReport, CrawlerConfig, IngestionError};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), "-", env!("GIT_HASH")))]
struct CliArgs {
    /// Path to a TOML config file. Its values override the flags.
    #[clap(long, global = true, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite catalog database file.
    #[clap(long, global = true, value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// Directory for downloaded media. Defaults to the database's directory.
    #[clap(long, global = true, value_parser = parse_path)]
    pub media_path: Option<PathBuf>,

    /// Base URL of the catalog site.
    #[clap(long, global = true)]
    pub base_url: Option<String>,

    /// Timeout in seconds for every request to the catalog site.
    #[clap(long, global = true)]
    pub request_timeout_sec: Option<u64>,

    /// User agent sent to the catalog site.
    #[clap(long, global = true)]
    pub user_agent: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawls the catalog site once, downloading and storing anything new.
    Crawl,

    /// Creates or migrates the catalog database and validates its schema.
    InitDb,

    /// Shows how many artists, tracks and stream references are stored.
    Stats,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for CliConfig {
    fn from(args: &CliArgs) -> Self {
        CliConfig {
            db_path: args.db_path.clone(),
            media_path: args.media_path.clone(),
            base_url: args.base_url.clone(),
            request_timeout_sec: args.request_timeout_sec,
            user_agent: args.user_agent.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let cli_config: CliConfig = (&cli_args).into();

    match cli_args.command {
        Command::InitDb => {
            let db_path = config::resolve_db_path(&cli_config, file_config.as_ref())?;
            let store = open_store(&db_path)?;
            let counts = store.counts()?;
            info!(
                "Catalog database ready at {:?} ({} artists, {} tracks)",
                db_path, counts.artists, counts.tracks
            );
        }
        Command::Stats => {
            let db_path = config::resolve_db_path(&cli_config, file_config.as_ref())?;
            let counts = open_store(&db_path)?.counts()?;
            println!("artists: {}", counts.artists);
            println!("tracks: {}", counts.tracks);
            println!("stream references: {}", counts.stream_references);
        }
        Command::Crawl => {
            let app_config = AppConfig::resolve(&cli_config, file_config)?;
            info!("Configuration loaded:");
            info!("  db_path: {:?}", app_config.db_path);
            info!("  images_dir: {:?}", app_config.images_dir);
            info!("  audio_dir: {:?}", app_config.audio_dir);
            info!("  base_url: {}", app_config.site.base_url);

            match crawl(&app_config).await? {
                Ok(report) => println!("{}", report),
                Err(e) => {
                    // The store is closed by now
                    error!("Crawl failed ({:?}): {}", e.kind(), e);
                    return Err(e).context("Crawl failed");
                }
            }
        }
    }

    Ok(())
}

fn open_store(db_path: &Path) -> Result<SqliteCatalogStore> {
    if !db_path.exists() {
        info!("Creating new catalog database at {:?}", db_path);
    }
    SqliteCatalogStore::new(db_path)
        .with_context(|| format!("Failed to open catalog database at {:?}", db_path))
}

/// Runs one crawl. Setup failures are returned as the outer error; the crawl
/// outcome is returned once the store has been dropped.
async fn crawl(app_config: &AppConfig) -> Result<Result<CrawlReport, IngestionError>> {
    let store: Arc<dyn CatalogStore> = Arc::new(open_store(&app_config.db_path)?);
    let fetcher = PageFetcher::new(&app_config.fetcher)?;
    let assets = AssetStore::new(
        &app_config.images_dir,
        &app_config.audio_dir,
        fetcher.clone(),
    );

    let crawler = CatalogCrawler::new(CrawlerConfig::from(app_config), fetcher, assets, store);
    let outcome = crawler.run().await;
    drop(crawler);
    Ok(outcome)
}
