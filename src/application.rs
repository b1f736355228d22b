//! Application layer module
//!
//! Use cases that orchestrate the scrapers, the fetch pools and the
//! spreadsheet writer: the full enrichment run, single-product preview and
//! the concurrency speed probe.

pub mod concurrency_probe;
pub mod description_template;
pub mod enrichment_pipeline;
pub mod preview;

pub use concurrency_probe::{ProbeLevel, ProbeReport, probe_concurrency};
pub use description_template::generate_description;
pub use enrichment_pipeline::{EnrichmentPipeline, PipelineOptions, RunSummary};
pub use preview::ProductPreview;
