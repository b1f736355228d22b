//! Parsing context for page extraction
//!
//! Carries the product being parsed and the URL the page came from, so
//! relative resources can be resolved.

use url::Url;

use crate::domain::ProductCode;
use super::{ParsingError, ParsingResult};

/// Context information for parsing one product page
#[derive(Debug, Clone)]
pub struct ParseContext {
    /// Product the page belongs to
    pub product_code: ProductCode,

    /// URL the page was fetched from
    pub page_url: String,
}

impl ParseContext {
    pub fn new(product_code: ProductCode, page_url: impl Into<String>) -> Self {
        Self {
            product_code,
            page_url: page_url.into(),
        }
    }

    /// Resolve `href` against the page URL; absolute URLs pass through
    pub fn resolve_url(&self, href: &str) -> ParsingResult<String> {
        if let Ok(absolute) = Url::parse(href) {
            return Ok(absolute.to_string());
        }

        let base = Url::parse(&self.page_url).map_err(|e| {
            ParsingError::url_resolution_failed(href, &e.to_string(), Some(&self.page_url))
        })?;
        base.join(href)
            .map(|joined| joined.to_string())
            .map_err(|e| ParsingError::url_resolution_failed(href, &e.to_string(), Some(&self.page_url)))
    }
}
