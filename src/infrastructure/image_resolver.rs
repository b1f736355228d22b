//! Product image resolution
//!
//! Tries the conventional large-image URL with a short HEAD probe, then the
//! extended image page, and finally settles on the conventional URL anyway.
//! Resolution never fails.

use scraper::Html;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::config::utils::{direct_image_url, image_page_url};
use super::config::ScrapingConfig;
use super::fetch_pool::FetchCache;
use super::http_client::PageFetcher;
use super::parsing::{ContextualParser, ImageMatch, ImagePageParser, ParseContext, ParsingConfig, ParsingResult};
use crate::domain::{ImageResult, ProductCode};

pub struct ImageResolver {
    fetcher: Arc<dyn PageFetcher>,
    parser: ImagePageParser,
    site_base_url: String,
    image_host_url: String,
    probe_timeout: Duration,
    page_timeout: Duration,
}

impl ImageResolver {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        scraping: &ScrapingConfig,
        parsing: &ParsingConfig,
    ) -> ParsingResult<Self> {
        Ok(Self {
            fetcher,
            parser: ImagePageParser::new(&parsing.image_page)?,
            site_base_url: scraping.site_base_url.clone(),
            image_host_url: scraping.image_host_url.clone(),
            probe_timeout: Duration::from_millis(scraping.probe_timeout_ms),
            page_timeout: Duration::from_millis(scraping.image_page_timeout_ms),
        })
    }

    /// Resolve the image for one product without caching
    pub async fn resolve(&self, code: &ProductCode) -> ImageResult {
        let direct_url = direct_image_url(&self.image_host_url, code);

        match self.fetcher.probe(&direct_url, Some(self.probe_timeout)).await {
            Ok(200) => {
                debug!("🖼️ Direct image found for {}", code);
                return ImageResult::new(code.clone(), direct_url, format!("Producto {code}"));
            }
            Ok(status) => debug!("Direct image probe for {} returned {}", code, status),
            Err(e) => debug!("Direct image probe for {} failed: {}", code, e),
        }

        let page_url = image_page_url(&self.site_base_url, code);
        let found = match self.fetcher.fetch_text(&page_url, Some(self.page_timeout)).await {
            Ok(body) => self.find_on_page(code, &page_url, &body),
            Err(e) => {
                warn!("⚠️ Image page unavailable for {}: {}", code, e);
                None
            }
        };

        match found {
            Some(image) => {
                let title = image
                    .alt
                    .unwrap_or_else(|| format!("Imagen del producto {code}"));
                ImageResult::new(code.clone(), image.url, title)
            }
            None => {
                debug!("Falling back to conventional image URL for {}", code);
                ImageResult::new(code.clone(), direct_url, format!("Producto {code}"))
            }
        }
    }

    /// Resolve through the run cache; each code is resolved at most once
    pub async fn resolve_cached(&self, code: &ProductCode, cache: &FetchCache<ImageResult>) -> ImageResult {
        cache.get_or_fetch(code, || self.resolve(code)).await
    }

    fn find_on_page(&self, code: &ProductCode, page_url: &str, body: &str) -> Option<ImageMatch> {
        let html = Html::parse_document(body);
        let context = ParseContext::new(code.clone(), page_url);
        match self.parser.parse_with_context(&html, &context) {
            Ok(found) => found,
            Err(e) => {
                warn!("Image page for {} could not be parsed: {}", code, e);
                None
            }
        }
    }
}
