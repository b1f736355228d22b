//! Catalog Enricher - Deltron catalog scraping and spreadsheet enrichment
//!
//! Reads a distributor CSV export, scrapes product descriptions, technical
//! specifications and image URLs from the distributor's product pages, and
//! writes products, brands and categories workbooks. Exposed both as a CLI
//! and as an HTTP upload server.

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod server;

// Re-export the entry points used by the binary and integration tests
pub use application::{EnrichmentPipeline, PipelineOptions, ProductPreview, RunSummary, probe_concurrency};
pub use domain::{CatalogRow, ExtractionResult, ImageResult, ParsedCatalog, ProductCode, ProductRow, SpecTable};
pub use infrastructure::{AppConfig, ConfigManager};
