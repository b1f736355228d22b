use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use catalog_enricher::application::concurrency_probe::probe_levels;
use catalog_enricher::infrastructure::config::deltron;
use catalog_enricher::infrastructure::init_logging_with_config;
use catalog_enricher::infrastructure::logging::log_system_info;
use catalog_enricher::server::{self, AppState};
use catalog_enricher::{AppConfig, ConfigManager, EnrichmentPipeline, PipelineOptions, ProductCode, probe_concurrency};

#[derive(Parser, Debug)]
#[command(name = "catalog-enricher", version, about = "Enrich a Deltron catalog export with scraped descriptions and images")]
struct Cli {
    /// JSON configuration file (defaults to the per-user config directory)
    #[arg(long, global = true, env = "ENRICHER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Preview the first sample product without writing anything
    Test,

    /// Process the whole catalog and write the workbooks
    Full {
        /// Catalog CSV export
        #[arg(long)]
        input: Option<PathBuf>,

        /// Directory receiving the workbooks
        #[arg(long)]
        output: Option<PathBuf>,

        /// Concurrent product page requests
        concurrency_descriptions: Option<usize>,

        /// Concurrent image lookups
        concurrency_images: Option<usize>,

        /// Drop rows without a resolvable image
        #[arg(long)]
        skip_failed_images: bool,

        /// Also write especificaciones.xlsx
        #[arg(long)]
        specs: bool,
    },

    /// Preview a single product code
    Product { code: String },

    /// Time the image lookup at several concurrency levels
    TestSpeed {
        #[arg(long, default_value_t = 5)]
        min: usize,

        #[arg(long, default_value_t = 25)]
        max: usize,

        #[arg(long, default_value_t = 2)]
        step: usize,
    },

    /// Run the HTTP upload server
    Serve {
        /// Address to bind (host:port); overrides the configured one
        #[arg(long)]
        bind: Option<String>,
    },
}

fn load_config(path: Option<PathBuf>) -> Result<AppConfig> {
    let manager = match path {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };
    manager.load_config()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config)?;
    init_logging_with_config(config.logging.clone()).context("Failed to initialize logging")?;
    log_system_info();

    let pipeline = EnrichmentPipeline::from_config(&config)?;

    match cli.command {
        Command::Test => {
            let code = ProductCode::new(deltron::SAMPLE_CODES[0]);
            info!("🧪 Test mode: previewing {}", code);
            println!("{}", pipeline.preview(&code).await);
        }
        Command::Product { code } => {
            let code = ProductCode::new(code);
            println!("{}", pipeline.preview(&code).await);
        }
        Command::Full {
            input,
            output,
            concurrency_descriptions,
            concurrency_images,
            skip_failed_images,
            specs,
        } => {
            let defaults = PipelineOptions::from_config(&config.concurrency);
            let options = PipelineOptions {
                concurrency_descriptions: concurrency_descriptions
                    .unwrap_or(defaults.concurrency_descriptions)
                    .max(1),
                concurrency_images: concurrency_images.unwrap_or(defaults.concurrency_images).max(1),
                skip_failed_images,
                write_specifications: specs,
                ..defaults
            };
            let input = input.unwrap_or_else(|| config.paths.input_csv.clone());
            let output = output.unwrap_or_else(|| config.paths.output_dir.clone());

            println!(
                "Processing {} with {} description workers and {} image workers",
                input.display(),
                options.concurrency_descriptions,
                options.concurrency_images
            );
            let summary = pipeline.run(&input, &output, &options).await?;

            println!("{}", "=".repeat(50));
            println!("Products written:   {}", summary.rows_written);
            println!("Rows skipped:       {}", summary.rows_skipped);
            println!("Template fallbacks: {}", summary.placeholders);
            println!("Valid images:       {}/{}", summary.valid_images, summary.product_codes);
            println!("Brands:             {}", summary.brands);
            println!("Categories:         {}", summary.categories);
            for file in &summary.files {
                println!("  -> {}", file.display());
            }
            println!("Finished in {} ms", summary.elapsed_ms);
        }
        Command::TestSpeed { min, max, step } => {
            let codes: Vec<ProductCode> = deltron::SAMPLE_CODES.iter().map(|code| ProductCode::new(code)).collect();
            println!(
                "Probing image lookup over {} codes at levels {:?}",
                codes.len(),
                probe_levels(min, max, step)
            );
            let report = probe_concurrency(pipeline.resolver(), &codes, min, max, step).await;
            for level in &report.levels {
                println!(
                    "Concurrency {:>3}: {:>8} ms total, {:>6} ms per request",
                    level.concurrency,
                    level.total.as_millis(),
                    level.per_request.as_millis()
                );
            }
            if let Some(best) = report.best() {
                println!("Recommended: catalog-enricher full <DESCRIPTIONS> {}", best.concurrency);
            }
        }
        Command::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            server::serve(AppState::new(pipeline, config), &bind).await?;
        }
    }

    Ok(())
}
