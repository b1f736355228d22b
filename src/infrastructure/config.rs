//! Configuration infrastructure
//!
//! Contains configuration loading and management for the enrichment runs.
//!
//! Values are layered in this order, later layers winning:
//! 1. Built-in defaults (see [`defaults`])
//! 2. Optional JSON configuration file
//! 3. Environment variables prefixed with `ENRICHER__` (`__` separates sections)

#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{info, warn};

use super::parsing::ParsingConfig;

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Remote site endpoints and request behaviour
    pub scraping: ScrapingConfig,

    /// Concurrency ceilings for each pipeline stage
    pub concurrency: ConcurrencyConfig,

    /// Default input and output locations for CLI runs
    pub paths: PathsConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Upload server settings
    pub server: ServerConfig,

    /// CSS selectors used by the extractor
    pub parsing: ParsingConfig,
}

/// Remote endpoints, timeouts and retry settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingConfig {
    /// Base URL of the product module (`producto.php`, `image_ext.php`)
    pub site_base_url: String,

    /// Host serving product images
    pub image_host_url: String,

    pub user_agent: String,

    /// Default timeout for product page requests in seconds
    pub request_timeout_seconds: u64,

    /// Timeout for the image existence probe in milliseconds
    pub probe_timeout_ms: u64,

    /// Timeout for the extended image page in milliseconds
    pub image_page_timeout_ms: u64,

    /// Retries after the first failed product page request
    pub max_retries: u32,

    /// First backoff delay; doubles on every retry
    pub retry_base_delay_ms: u64,

    pub follow_redirects: bool,
}

/// Concurrency knobs for each stage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcurrencyConfig {
    /// Row merge stage
    pub transform: usize,

    /// Image resolution
    pub images: usize,

    /// Product page scraping
    pub descriptions: usize,

    /// Items per progress batch
    pub batch_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub input_csv: PathBuf,
    pub output_dir: PathBuf,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted file logs
    pub json_format: bool,

    /// Enable console output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Log directory; `logs/` next to the executable when unset
    pub log_dir: Option<PathBuf>,

    pub file_name: String,

    /// Number of log files to keep (older files will be deleted)
    pub max_files: u32,

    /// Enable automatic log cleanup on startup
    pub auto_cleanup_logs: bool,

    /// Per-target level overrides (e.g. "reqwest": "warn")
    pub module_filters: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind the upload server to (host:port)
    pub bind: String,

    /// Maximum accepted request body in bytes
    pub max_upload_bytes: usize,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            site_base_url: deltron::SITE_BASE_URL.to_string(),
            image_host_url: deltron::IMAGE_HOST_URL.to_string(),
            user_agent: defaults::USER_AGENT.to_string(),
            request_timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            probe_timeout_ms: defaults::PROBE_TIMEOUT_MS,
            image_page_timeout_ms: defaults::IMAGE_PAGE_TIMEOUT_MS,
            max_retries: defaults::MAX_RETRIES,
            retry_base_delay_ms: defaults::RETRY_BASE_DELAY_MS,
            follow_redirects: true,
        }
    }
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            transform: defaults::CONCURRENCY_TRANSFORM,
            images: defaults::CONCURRENCY_IMAGES,
            descriptions: defaults::CONCURRENCY_DESCRIPTIONS,
            batch_size: defaults::BATCH_SIZE,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_csv: PathBuf::from(defaults::INPUT_CSV),
            output_dir: PathBuf::from(defaults::OUTPUT_DIR),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            log_dir: None,
            file_name: defaults::LOG_FILE_NAME.to_string(),
            max_files: defaults::LOG_MAX_FILES,
            auto_cleanup_logs: defaults::LOG_AUTO_CLEANUP,
            module_filters: {
                let mut filters = HashMap::new();
                filters.insert("reqwest".to_string(), "info".to_string());
                filters.insert("hyper".to_string(), "warn".to_string());
                filters.insert("h2".to_string(), "warn".to_string());
                filters.insert("tokio".to_string(), "info".to_string());
                filters.insert("axum".to_string(), "info".to_string());
                filters
            },
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: defaults::SERVER_BIND.to_string(),
            max_upload_bytes: defaults::MAX_UPLOAD_BYTES,
        }
    }
}

/// Configuration manager for loading and saving settings
pub struct ConfigManager {
    pub config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join(defaults::APP_DIR_NAME);

        Ok(config_dir)
    }

    /// Manager for the per-user configuration file
    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_dir()?.join(defaults::CONFIG_FILE_NAME);
        Ok(Self { config_path })
    }

    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Load defaults, the config file (if present) and `ENRICHER__*` variables
    pub fn load_config(&self) -> Result<AppConfig> {
        self.load_with_env(None)
    }

    /// Same as [`Self::load_config`] with an explicit environment map instead of the process env
    pub fn load_with_env(&self, env: Option<HashMap<String, String>>) -> Result<AppConfig> {
        match self.build(env.clone(), true) {
            Ok(config) => Ok(config),
            Err(parse_error) if self.config_path.exists() => {
                warn!("⚠️  Configuration file could not be parsed: {:#}", parse_error);

                let backup_path = self.config_path.with_extension("json.corrupted");
                if let Err(e) = std::fs::copy(&self.config_path, &backup_path) {
                    warn!("Failed to create backup of corrupted config: {}", e);
                } else {
                    info!("Backed up corrupted config to: {:?}", backup_path);
                }

                warn!("⚠️  Ignoring configuration file and using defaults");
                self.build(env, false)
            }
            Err(e) => Err(e),
        }
    }

    fn build(&self, env: Option<HashMap<String, String>>, with_file: bool) -> Result<AppConfig> {
        let defaults = config::Config::try_from(&AppConfig::default())
            .context("Failed to serialize default configuration")?;

        let mut builder = config::Config::builder().add_source(defaults);
        if with_file {
            builder = builder.add_source(
                config::File::from(self.config_path.as_path())
                    .format(config::FileFormat::Json)
                    .required(false),
            );
        }
        builder = builder.add_source(
            config::Environment::with_prefix(defaults::ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let settings = builder.build().context("Failed to assemble configuration")?;
        let config: AppConfig = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        if self.config_path.exists() && with_file {
            info!("Loaded configuration from: {:?}", self.config_path);
        }
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(config)
            .context("Failed to serialize configuration")?;

        tokio::fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;

        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }
}

/// Deltron site URLs
pub mod deltron {
    /// Product module root; product and image pages live below it
    pub const SITE_BASE_URL: &str = "https://www.deltron.com.pe/modulos/productos/items";

    /// Static image host
    pub const IMAGE_HOST_URL: &str = "https://imagenes.deltron.com.pe";

    /// Path of the large product images below the image host
    pub const LARGE_IMAGE_PATH: &str = "images/productos/items/large";

    /// Sample codes used for connectivity checks and speed probes
    pub const SAMPLE_CODES: &[&str] = &[
        "ACCFANPCCPLDEX4",
        "ACTE70207W",
        "MBGBH610MKD4",
        "ME16KF436C18BB2",
        "TBLENZAC50084PE",
    ];
}

/// Default configuration values
pub mod defaults {
    pub const APP_DIR_NAME: &str = "catalog-enricher";
    pub const CONFIG_FILE_NAME: &str = "config.json";
    pub const ENV_PREFIX: &str = "ENRICHER";

    pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

    /// Default request timeout in seconds
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;

    /// HEAD probe timeout in milliseconds
    pub const PROBE_TIMEOUT_MS: u64 = 2000;

    /// Extended image page timeout in milliseconds
    pub const IMAGE_PAGE_TIMEOUT_MS: u64 = 5000;

    /// Default maximum retries for product pages
    pub const MAX_RETRIES: u32 = 3;

    /// First retry delay in milliseconds (1s, 2s, 4s)
    pub const RETRY_BASE_DELAY_MS: u64 = 1000;

    pub const CONCURRENCY_TRANSFORM: usize = 10;
    pub const CONCURRENCY_IMAGES: usize = 20;
    pub const CONCURRENCY_DESCRIPTIONS: usize = 15;

    /// Items per progress batch
    pub const BATCH_SIZE: usize = 20;

    pub const INPUT_CSV: &str = "./csv/catalogo.csv";
    pub const OUTPUT_DIR: &str = "./output";

    // Log configuration defaults
    pub const LOG_LEVEL: &str = "info";
    pub const LOG_JSON_FORMAT: bool = false;
    pub const LOG_CONSOLE_OUTPUT: bool = true;
    pub const LOG_FILE_OUTPUT: bool = true;
    pub const LOG_FILE_NAME: &str = "catalog-enricher.log";
    pub const LOG_MAX_FILES: u32 = 5;
    pub const LOG_AUTO_CLEANUP: bool = true;

    pub const SERVER_BIND: &str = "127.0.0.1:3001";

    /// 50MB upload limit
    pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;
}

/// URL building helper functions
pub mod utils {
    use super::deltron::LARGE_IMAGE_PATH;
    use crate::domain::ProductCode;

    /// Product detail page
    pub fn product_page_url(site_base_url: &str, code: &ProductCode) -> String {
        format!(
            "{}/producto.php?item_number={}",
            site_base_url.trim_end_matches('/'),
            code
        )
    }

    /// Extended image page
    pub fn image_page_url(site_base_url: &str, code: &ProductCode) -> String {
        format!("{}/image_ext.php?item={}", site_base_url.trim_end_matches('/'), code)
    }

    /// Conventional large-image location derived from the code alone
    pub fn direct_image_url(image_host_url: &str, code: &ProductCode) -> String {
        let lower = code.to_lowercase();
        let part1: String = lower.chars().take(2).collect();
        let part2: String = lower.chars().skip(2).take(2).collect();
        format!(
            "{}/{}/{}/{}/{}.jpg",
            image_host_url.trim_end_matches('/'),
            LARGE_IMAGE_PATH,
            part1,
            part2,
            lower
        )
    }
}
