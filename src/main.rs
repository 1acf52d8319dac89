use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use book_catalog_server::catalog_store::{CatalogStore, JsonFileBookPersistence};
use book_catalog_server::config::{AppConfig, CliConfig, FileConfig, DEFAULT_PORT};
use book_catalog_server::metadata::{
    OpenLibraryClient, DEFAULT_LOOKUP_TIMEOUT_SEC, OPEN_LIBRARY_BASE_URL,
};
use book_catalog_server::server::{run_server, GuardedMetadataFetcher, RequestsLoggingLevel};

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
struct CliArgs {
    /// Path to the JSON file holding the catalog. Created on first write.
    #[clap(long, value_parser = parse_path)]
    pub data_file: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Base URL of the Open Library compatible metadata service.
    #[clap(long, default_value = OPEN_LIBRARY_BASE_URL)]
    pub lookup_base_url: String,

    /// Timeout in seconds for each metadata request.
    #[clap(long, default_value_t = DEFAULT_LOOKUP_TIMEOUT_SEC)]
    pub lookup_timeout_sec: u64,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Optional TOML config file. Its values override the flags above.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            data_file: self.data_file.clone(),
            port: self.port,
            logging_level: self.logging_level.clone(),
            frontend_dir_path: self.frontend_dir_path.clone(),
            lookup_base_url: self.lookup_base_url.clone(),
            lookup_timeout_sec: self.lookup_timeout_sec,
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

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Reading config file {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    info!("Loading catalog from {:?}...", config.data_file);
    let persistence = JsonFileBookPersistence::new(config.data_file.clone());
    let catalog_store = CatalogStore::load(Box::new(persistence));
    info!("Catalog holds {} books", catalog_store.len());

    info!(
        "Looking up metadata at {} (timeout {}s)",
        config.lookup.base_url, config.lookup.timeout_sec
    );
    let metadata_fetcher: GuardedMetadataFetcher = Arc::new(OpenLibraryClient::new(
        &config.lookup.base_url,
        config.lookup.timeout_sec,
    )?);

    info!("Ready to serve at port {}!", config.port);
    run_server(
        catalog_store,
        metadata_fetcher,
        config.logging_level,
        config.port,
        config.frontend_dir_path,
    )
    .await
}
