//! Infrastructure layer for HTTP access, parsing and file formats
//!
//! This module provides the HTTP client, the HTML extraction parsers, the
//! bounded fetch pool with its run cache, catalog CSV reading, spreadsheet
//! writing, configuration and logging.

pub mod catalog_reader; // CSV row grouping
pub mod config; // Configuration loading and site constants
pub mod description_scraper; // Product page fetch + extraction
pub mod fetch_pool; // Bounded concurrency and per-run cache
pub mod http_client;
pub mod image_resolver;
pub mod logging; // Logging infrastructure
pub mod parsing; // Selector-driven HTML extraction
pub mod parsing_error; // Parser construction errors
pub mod retry_manager;
pub mod spreadsheet_writer;

// Re-export commonly used items
pub use catalog_reader::{CatalogError, CatalogReader, read_catalog, read_from_bytes};
pub use config::{AppConfig, ConfigManager, deltron};
pub use description_scraper::DescriptionScraper;
pub use fetch_pool::{BoundedFetchPool, FetchCache};
pub use http_client::{FetchError, HttpClient, HttpClientConfig, PageFetcher};
pub use image_resolver::ImageResolver;
pub use logging::{get_log_directory, init_logging, init_logging_with_config};
pub use parsing::{ParsingConfig, ParsingError, ParsingResult, ProductDetailParser};
pub use retry_manager::RetryPolicy;
pub use spreadsheet_writer::SpreadsheetError;
