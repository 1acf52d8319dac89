mod file_config;

pub use file_config::{FileConfig, LookupConfig};

use crate::catalog_store::DEFAULT_DATA_FILE_NAME;
use crate::metadata::{DEFAULT_LOOKUP_TIMEOUT_SEC, OPEN_LIBRARY_BASE_URL};
use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 8000;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub data_file: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub lookup_base_url: String,
    pub lookup_timeout_sec: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            data_file: None,
            port: DEFAULT_PORT,
            logging_level: RequestsLoggingLevel::default(),
            frontend_dir_path: None,
            lookup_base_url: OPEN_LIBRARY_BASE_URL.to_string(),
            lookup_timeout_sec: DEFAULT_LOOKUP_TIMEOUT_SEC,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_file: PathBuf,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub lookup: LookupSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupSettings {
    pub base_url: String,
    pub timeout_sec: u64,
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            base_url: OPEN_LIBRARY_BASE_URL.to_string(),
            timeout_sec: DEFAULT_LOOKUP_TIMEOUT_SEC,
        }
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let data_file = file
            .data_file
            .map(PathBuf::from)
            .or_else(|| cli.data_file.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE_NAME));

        if data_file.is_dir() {
            bail!("data_file is a directory: {:?}", data_file);
        }
        if let Some(parent) = data_file.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                bail!("Directory of data_file does not exist: {:?}", parent);
            }
        }

        let port = file.port.unwrap_or(cli.port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        let lookup_file = file.lookup.unwrap_or_default();
        let lookup = LookupSettings {
            base_url: lookup_file
                .base_url
                .unwrap_or_else(|| cli.lookup_base_url.clone()),
            timeout_sec: lookup_file.timeout_sec.unwrap_or(cli.lookup_timeout_sec),
        };
        if lookup.timeout_sec == 0 {
            bail!("Lookup timeout must be at least one second");
        }
        if !lookup.base_url.starts_with("http://") && !lookup.base_url.starts_with("https://") {
            bail!("Lookup base URL must be http(s): {}", lookup.base_url);
        }

        Ok(Self {
            data_file,
            port,
            logging_level,
            frontend_dir_path,
            lookup,
        })
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
