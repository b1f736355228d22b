//! Catalog enrichment use case
//!
//! Reads the catalog export, scrapes descriptions and resolves images for
//! every distinct product code through bounded pools, merges the results
//! onto the catalog rows and writes the output workbooks.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::description_template::generate_description;
use crate::domain::constants::DEFAULT_SIZE;
use crate::domain::{CatalogRow, ExtractionResult, IdRegistry, ImageResult, ParsedCatalog, ProductRow};
use crate::infrastructure::catalog_reader::{self, CatalogError};
use crate::infrastructure::config::{AppConfig, ConcurrencyConfig};
use crate::infrastructure::spreadsheet_writer::{
    self, BRANDS_FILE, BRANDS_SHEET, CATEGORIES_FILE, CATEGORIES_SHEET, PRODUCTS_FILE, SPECIFICATIONS_FILE,
};
use crate::infrastructure::{
    BoundedFetchPool, DescriptionScraper, FetchCache, HttpClient, HttpClientConfig, ImageResolver, PageFetcher,
};

/// Per-run knobs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineOptions {
    pub concurrency_transform: usize,
    pub concurrency_images: usize,
    pub concurrency_descriptions: usize,
    pub batch_size: usize,
    /// Drop rows whose image could not be resolved to a real URL
    pub skip_failed_images: bool,
    /// Also write `especificaciones.xlsx`
    pub write_specifications: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from_config(&ConcurrencyConfig::default())
    }
}

impl PipelineOptions {
    pub fn from_config(config: &ConcurrencyConfig) -> Self {
        Self {
            concurrency_transform: config.transform,
            concurrency_images: config.images,
            concurrency_descriptions: config.descriptions,
            batch_size: config.batch_size,
            skip_failed_images: false,
            write_specifications: false,
        }
    }
}

/// Outcome of one enrichment run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub product_codes: usize,
    pub rows_written: usize,
    /// Catalog rows dropped for an empty title, zero price or missing image
    pub rows_skipped: usize,
    /// Codes whose page could not be fetched and got a template description
    pub placeholders: usize,
    pub valid_images: usize,
    pub brands: usize,
    pub categories: usize,
    pub files: Vec<PathBuf>,
    pub elapsed_ms: u128,
}

pub struct EnrichmentPipeline {
    scraper: DescriptionScraper,
    resolver: ImageResolver,
}

impl EnrichmentPipeline {
    /// Build the pipeline around any fetcher
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: &AppConfig) -> Result<Self> {
        let scraper = DescriptionScraper::new(fetcher.clone(), &config.scraping, &config.parsing)
            .context("Failed to build description extractor")?;
        let resolver = ImageResolver::new(fetcher, &config.scraping, &config.parsing)
            .context("Failed to build image page parser")?;
        Ok(Self { scraper, resolver })
    }

    /// Build the pipeline with the reqwest client
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = HttpClient::new(HttpClientConfig::from_scraping_config(&config.scraping))?;
        Self::new(Arc::new(client), config)
    }

    pub fn scraper(&self) -> &DescriptionScraper {
        &self.scraper
    }

    pub fn resolver(&self) -> &ImageResolver {
        &self.resolver
    }

    /// Enrich the catalog at `input` and write the workbooks into `output_dir`
    pub async fn run(&self, input: &Path, output_dir: &Path, options: &PipelineOptions) -> Result<RunSummary> {
        let catalog = match catalog_reader::read_catalog(input) {
            Ok(catalog) => catalog,
            Err(CatalogError::NotFound(path)) => {
                error!("❌ Input file not found: {}", path.display());
                anyhow::bail!("Input file not found: {}", path.display());
            }
            Err(e) => return Err(anyhow::Error::new(e).context("Failed to read catalog")),
        };
        self.run_catalog(catalog, output_dir, options).await
    }

    /// Enrich an already grouped catalog
    pub async fn run_catalog(
        &self,
        catalog: ParsedCatalog,
        output_dir: &Path,
        options: &PipelineOptions,
    ) -> Result<RunSummary> {
        let started = Instant::now();
        let run_id = Uuid::new_v4().to_string();
        info!(
            "🚀 Enrichment run {} started: {} product codes, {} catalog rows",
            run_id,
            catalog.product_codes.len(),
            catalog.rows.len()
        );

        tokio::fs::create_dir_all(output_dir)
            .await
            .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

        let descriptions: FetchCache<ExtractionResult> = FetchCache::new();
        let images: FetchCache<ImageResult> = FetchCache::new();
        let scraper = &self.scraper;
        let resolver = &self.resolver;
        let (description_cache, image_cache) = (&descriptions, &images);

        let description_pool = BoundedFetchPool::new(options.concurrency_descriptions, options.batch_size);
        let image_pool = BoundedFetchPool::new(options.concurrency_images, options.batch_size);

        let (extractions, resolved) = tokio::join!(
            description_pool.run_all("descriptions", catalog.product_codes.clone(), move |code| async move {
                scraper.scrape_cached(&code, description_cache).await
            }),
            image_pool.run_all("images", catalog.product_codes.clone(), move |code| async move {
                resolver.resolve_cached(&code, image_cache).await
            }),
        );

        let placeholders = extractions.iter().filter(|result| result.is_placeholder()).count();
        let valid_images = resolved.iter().filter(|image| image.has_valid_image()).count();
        if placeholders > 0 {
            warn!("⚠️ {} products fell back to template descriptions", placeholders);
        }

        let transform_pool = BoundedFetchPool::new(options.concurrency_transform, options.batch_size);
        let catalog_ref = &catalog;
        let merged = transform_pool
            .run_all("transform", catalog.rows.iter().collect(), move |row| async move {
                let extraction = scraper.scrape_cached(&row.code, description_cache).await;
                let image = resolver.resolve_cached(&row.code, image_cache).await;
                merge_row(row, &extraction, &image, catalog_ref, options)
            })
            .await;
        let rows: Vec<ProductRow> = merged.into_iter().flatten().collect();
        let rows_skipped = catalog.rows.len() - rows.len();

        let files = write_outputs(output_dir, rows.clone(), &catalog, extractions, options).await?;

        let summary = RunSummary {
            run_id,
            product_codes: catalog.product_codes.len(),
            rows_written: rows.len(),
            rows_skipped,
            placeholders,
            valid_images,
            brands: catalog.brands.len(),
            categories: catalog.categories.len(),
            files,
            elapsed_ms: started.elapsed().as_millis(),
        };
        info!(
            "✅ Run {} finished in {} ms: {} rows written, {} skipped, {} placeholders",
            summary.run_id, summary.elapsed_ms, summary.rows_written, summary.rows_skipped, summary.placeholders
        );
        Ok(summary)
    }
}

/// Combine one catalog row with its scraped data; `None` drops the row
fn merge_row(
    row: &CatalogRow,
    extraction: &ExtractionResult,
    image: &ImageResult,
    catalog: &ParsedCatalog,
    options: &PipelineOptions,
) -> Option<ProductRow> {
    if !row.is_publishable() {
        return None;
    }
    if options.skip_failed_images && !image.has_valid_image() {
        return None;
    }

    let description = if extraction.is_placeholder() {
        generate_description(row)
    } else {
        extraction.combined_description.clone()
    };

    Some(ProductRow {
        title: row.title.clone(),
        description,
        price: row.price,
        category_id: catalog.categories.id_of(&row.category).unwrap_or_default(),
        brand_id: catalog.brands.id_of(&row.brand).unwrap_or_default(),
        size: DEFAULT_SIZE.to_string(),
        featured: false,
        stock: row.stock,
        product_code: row.code.clone(),
        image_url: image.image_url.clone(),
    })
}

async fn write_outputs(
    output_dir: &Path,
    rows: Vec<ProductRow>,
    catalog: &ParsedCatalog,
    extractions: Vec<ExtractionResult>,
    options: &PipelineOptions,
) -> Result<Vec<PathBuf>> {
    let output_dir = output_dir.to_path_buf();
    let brands: IdRegistry = catalog.brands.clone();
    let categories: IdRegistry = catalog.categories.clone();
    let with_specs = options.write_specifications;

    tokio::task::spawn_blocking(move || -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        let products_path = output_dir.join(PRODUCTS_FILE);
        spreadsheet_writer::write_products(&rows, &products_path)?;
        files.push(products_path);

        let brands_path = output_dir.join(BRANDS_FILE);
        spreadsheet_writer::write_registry(&brands, BRANDS_SHEET, &brands_path)?;
        files.push(brands_path);

        let categories_path = output_dir.join(CATEGORIES_FILE);
        spreadsheet_writer::write_registry(&categories, CATEGORIES_SHEET, &categories_path)?;
        files.push(categories_path);

        if with_specs {
            let scraped: Vec<ExtractionResult> =
                extractions.into_iter().filter(|result| !result.is_placeholder()).collect();
            let specs_path = output_dir.join(SPECIFICATIONS_FILE);
            spreadsheet_writer::write_specifications(&scraped, &specs_path)?;
            files.push(specs_path);
        }

        Ok(files)
    })
    .await
    .context("Spreadsheet writer task failed")?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ProductCode, SpecTable};

    fn catalog_with(row: CatalogRow) -> ParsedCatalog {
        let mut catalog = ParsedCatalog::default();
        catalog.categories.register(&row.category);
        catalog.brands.register(&row.brand);
        catalog.product_codes.push(row.code.clone());
        catalog.row_by_code.insert(row.code.clone(), 0);
        catalog.rows.push(row);
        catalog
    }

    fn sample_row(price: f64) -> CatalogRow {
        CatalogRow {
            code: ProductCode::new("ACTE70207W"),
            title: "Teclado Teros".into(),
            full_title: "Teclado Teros".into(),
            category: "TECLADOS".into(),
            brand: "TEROS".into(),
            stock: 4,
            price,
        }
    }

    #[test]
    fn test_merge_uses_scraped_description() {
        let row = sample_row(19.9);
        let catalog = catalog_with(row.clone());
        let extraction = ExtractionResult::new(
            row.code.clone(),
            "Teclado USB".into(),
            SpecTable::new(),
            SpecTable::new(),
            "Teclado USB".into(),
        );
        let image = ImageResult::new(row.code.clone(), "https://img/x.jpg".into(), "t".into());

        let merged = merge_row(&row, &extraction, &image, &catalog, &PipelineOptions::default()).unwrap();
        assert_eq!(merged.description, "Teclado USB");
        assert_eq!(merged.category_id, 1);
        assert_eq!(merged.brand_id, 1);
        assert_eq!(merged.size, "S");
        assert!(!merged.featured);
    }

    #[test]
    fn test_merge_falls_back_to_template() {
        let row = sample_row(19.9);
        let catalog = catalog_with(row.clone());
        let extraction = ExtractionResult::placeholder(row.code.clone());
        let image = ImageResult::not_found(row.code.clone());

        let merged = merge_row(&row, &extraction, &image, &catalog, &PipelineOptions::default()).unwrap();
        assert!(merged.description.starts_with("Teclado Teros de la marca TEROS."));

        let strict = PipelineOptions {
            skip_failed_images: true,
            ..Default::default()
        };
        assert!(merge_row(&row, &extraction, &image, &catalog, &strict).is_none());
    }

    #[test]
    fn test_zero_price_rows_dropped() {
        let row = sample_row(0.0);
        let catalog = catalog_with(row.clone());
        let extraction = ExtractionResult::placeholder(row.code.clone());
        let image = ImageResult::not_found(row.code.clone());
        assert!(merge_row(&row, &extraction, &image, &catalog, &PipelineOptions::default()).is_none());
    }
}
