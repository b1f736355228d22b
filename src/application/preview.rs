//! Single-product preview
//!
//! Scrapes one product page and resolves its image without touching any
//! output file, and renders the result the way it would land in the
//! products workbook.

use serde::Serialize;
use std::fmt;

use super::enrichment_pipeline::EnrichmentPipeline;
use crate::domain::{ExtractionResult, ImageResult, ProductCode};

#[derive(Debug, Clone, Serialize)]
pub struct ProductPreview {
    pub product_code: ProductCode,
    pub extraction: ExtractionResult,
    pub image: ImageResult,
}

impl EnrichmentPipeline {
    /// Fetch description and image for `code`, uncached
    pub async fn preview(&self, code: &ProductCode) -> ProductPreview {
        let (extraction, image) = tokio::join!(self.scraper().scrape(code), self.resolver().resolve(code));
        ProductPreview {
            product_code: code.clone(),
            extraction,
            image,
        }
    }
}

impl fmt::Display for ProductPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(50);
        writeln!(f, "{rule}")?;
        writeln!(f, "      PRODUCT PREVIEW")?;
        writeln!(f, "{rule}")?;
        writeln!(f, "ProductCode: {}", self.product_code)?;
        writeln!(f, "ImageUrl: {}", self.image.image_url)?;
        writeln!(f, "ImageTitle: {}", self.image.image_title)?;

        if self.extraction.is_placeholder() {
            writeln!(f)?;
            writeln!(f, "{}", self.extraction.combined_description)?;
            writeln!(f, "A template description would be generated from the catalog row.")?;
        } else {
            writeln!(f)?;
            writeln!(f, "Description:")?;
            writeln!(f, "{}", self.extraction.raw_description)?;

            if self.extraction.has_specs {
                writeln!(f)?;
                writeln!(f, "Specifications:")?;
                for (category, values) in self.extraction.normalized_specs.iter() {
                    if values.is_empty() {
                        continue;
                    }
                    writeln!(f)?;
                    writeln!(f, "{category}:")?;
                    for value in values {
                        writeln!(f, "  - {value}")?;
                    }
                }
            } else {
                writeln!(f)?;
                writeln!(f, "No technical specifications found")?;
            }
        }

        write!(f, "{rule}")
    }
}
