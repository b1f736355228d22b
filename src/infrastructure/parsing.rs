//! HTML parsing infrastructure for Deltron product pages
//!
//! Trait-based extraction with ordered selector fallbacks. Parsers are built
//! once from a [`ParsingConfig`]; a broken selector is reported at build time
//! and extraction itself never fails on unexpected markup.

pub mod category_filter;
pub mod config;
pub mod context;
pub mod description_parser;
pub mod image_page_parser;
pub mod product_detail_parser;
pub mod spec_normalizer;
pub mod spec_table_parser;

// Re-export public types
pub use crate::infrastructure::parsing_error::{ParsingError, ParsingResult};
pub use category_filter::{CategoryFilter, MergedHeaderFilter};
pub use config::ParsingConfig;
pub use context::ParseContext;
pub use description_parser::DescriptionParser;
pub use image_page_parser::{ImageMatch, ImagePageParser};
pub use product_detail_parser::{PageExtraction, ProductDetailParser};
pub use spec_table_parser::SpecTableParser;

use scraper::{Html, Selector};
use tracing::warn;

/// Parser that needs to know which product/page it is looking at
pub trait ContextualParser {
    type Output;
    type Context;

    /// Parse HTML with contextual information
    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ParsingResult<Self::Output>;
}

/// Compile selector strings, skipping invalid ones as long as one survives
pub(crate) fn compile_selectors(field: &str, selector_strings: &[String]) -> ParsingResult<Vec<Selector>> {
    let mut selectors = Vec::with_capacity(selector_strings.len());

    for selector_str in selector_strings {
        match Selector::parse(selector_str) {
            Ok(selector) => selectors.push(selector),
            Err(e) => {
                warn!("Failed to compile {} selector '{}': {}", field, selector_str, e);
            }
        }
    }

    if selectors.is_empty() && !selector_strings.is_empty() {
        return Err(ParsingError::no_usable_selector(field, selector_strings));
    }

    Ok(selectors)
}

/// Compile a single built-in selector
pub(crate) fn compile_selector(selector_str: &str) -> ParsingResult<Selector> {
    Selector::parse(selector_str)
        .map_err(|e| ParsingError::invalid_selector(selector_str, &e.to_string(), Vec::new()))
}
