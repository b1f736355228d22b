//! Product detail page extraction
//!
//! Combines the description parser, the specification table parser, synonym
//! normalization and the category post-filter into one extraction pass, then
//! renders the surviving specifications after the description.

#![allow(clippy::uninlined_format_args)]

use scraper::Html;
use tracing::debug;

use super::category_filter::{CategoryFilter, MergedHeaderFilter};
use super::config::ParsingConfig;
use super::context::ParseContext;
use super::description_parser::DescriptionParser;
use super::spec_normalizer::normalize;
use super::spec_table_parser::SpecTableParser;
use super::{ContextualParser, ParsingResult};
use crate::domain::constants::SPECS_HEADING;
use crate::domain::{ExtractionResult, ProductCode, SpecTable};

/// Everything read from one product page
#[derive(Debug, Clone, PartialEq)]
pub struct PageExtraction {
    pub description: String,
    pub specs: SpecTable,
    pub normalized_specs: SpecTable,
    pub combined_description: String,
    pub has_specs: bool,
}

impl PageExtraction {
    pub fn into_result(self, product_code: ProductCode) -> ExtractionResult {
        ExtractionResult::new(
            product_code,
            self.description,
            self.specs,
            self.normalized_specs,
            self.combined_description,
        )
    }
}

/// Parser for Deltron `producto.php` pages
pub struct ProductDetailParser {
    description: DescriptionParser,
    spec_table: SpecTableParser,
    filter: Box<dyn CategoryFilter>,
}

impl ProductDetailParser {
    /// Create a new product detail parser with default configuration
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&ParsingConfig::default())
    }

    /// Create parser with custom selector configuration
    pub fn with_config(config: &ParsingConfig) -> ParsingResult<Self> {
        Ok(Self {
            description: DescriptionParser::new(&config.description)?,
            spec_table: SpecTableParser::new(&config.spec_table)?,
            filter: Box::new(MergedHeaderFilter::default()),
        })
    }

    /// Replace the category post-filter
    pub fn with_filter(mut self, filter: impl CategoryFilter + 'static) -> Self {
        self.filter = Box::new(filter);
        self
    }

    /// Extract description and specifications from a page body
    pub fn extract(&self, page_html: &str) -> PageExtraction {
        let html = Html::parse_document(page_html);
        self.extract_document(&html)
    }

    fn extract_document(&self, html: &Html) -> PageExtraction {
        let description = self.description.parse(html);
        let specs = self.spec_table.parse(html);
        let normalized_specs = self.filter.apply(&normalize(&specs));
        let combined_description = render_specs(&description, &normalized_specs);
        let has_specs = normalized_specs.has_values();

        debug!(
            "Extracted description ({} chars), {} raw / {} normalized categories",
            description.chars().count(),
            specs.len(),
            normalized_specs.len()
        );

        PageExtraction {
            description,
            specs,
            normalized_specs,
            combined_description,
            has_specs,
        }
    }
}

impl ContextualParser for ProductDetailParser {
    type Output = ExtractionResult;
    type Context = ParseContext;

    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ParsingResult<Self::Output> {
        debug!("Parsing product detail from: {}", context.page_url);
        Ok(self.extract_document(html).into_result(context.product_code.clone()))
    }
}

/// Append a `Category:` block per non-empty category after the description
pub fn render_specs(description: &str, specs: &SpecTable) -> String {
    let blocks: String = specs
        .iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(category, values)| {
            let lines: Vec<String> = values.iter().map(|value| format!("- {}", value)).collect();
            format!("\n\n{}:\n{}", category, lines.join("\n"))
        })
        .collect();

    if blocks.is_empty() {
        description.to_string()
    } else {
        format!("{}\n\n{}{}", description, SPECS_HEADING, blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div id="home"><div><p>Impresora láser.<br>Monocromática.</p></div></div>
          <div id="esp_tecnicas"><table>
            <tr><td fircol="y">FABRICANTE</td><td>HP</td></tr>
            <tr><td fircol="y">MODELO</td><td>M110w</td></tr>
            <tr><td fircol="y">DISPOSITIVOMARCAMODELONUMERO DE PARTE</td><td>x</td></tr>
          </table></div>
        </body></html>"#;

    #[test]
    fn test_extract_full_page() {
        let parser = ProductDetailParser::new().unwrap();
        let page = parser.extract(PAGE);

        assert_eq!(page.description, "Impresora láser.\nMonocromática.");
        assert!(page.specs.contains("FABRICANTE"));
        assert!(page.specs.contains("DISPOSITIVOMARCAMODELONUMERO DE PARTE"));
        assert_eq!(page.normalized_specs.get("MARCA").unwrap(), &["HP".to_string()]);
        assert!(!page.normalized_specs.contains("DISPOSITIVOMARCAMODELONUMERO DE PARTE"));
        assert!(page.has_specs);
        assert_eq!(
            page.combined_description,
            "Impresora láser.\nMonocromática.\n\nTECHNICAL SPECIFICATIONS:\n\nMARCA:\n- HP\n\nMODELO:\n- M110w"
        );
    }

    #[test]
    fn test_render_without_specs_keeps_description() {
        assert_eq!(render_specs("Solo texto", &SpecTable::new()), "Solo texto");
    }

    #[derive(Debug)]
    struct KeepEverything;

    impl CategoryFilter for KeepEverything {
        fn keep_category(&self, _name: &str) -> bool {
            true
        }

        fn keep_value(&self, _value: &str) -> bool {
            true
        }
    }

    #[test]
    fn test_replaceable_filter() {
        let parser = ProductDetailParser::new().unwrap().with_filter(KeepEverything);
        let page = parser.extract(PAGE);
        assert!(page.normalized_specs.contains("DISPOSITIVOMARCAMODELONUMERO DE PARTE"));
    }

    #[test]
    fn test_parse_with_context() {
        let parser = ProductDetailParser::new().unwrap();
        let html = Html::parse_document(PAGE);
        let ctx = ParseContext::new(ProductCode::new("IMHPM110W"), "https://example.test/producto.php");
        let result = parser.parse_with_context(&html, &ctx).unwrap();
        assert_eq!(result.product_code.as_str(), "IMHPM110W");
        assert!(!result.is_placeholder());
    }
}
