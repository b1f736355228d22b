//! Product page scraping with retry
//!
//! Fetches `producto.php` for a code through the retry policy and runs the
//! detail extractor over the body. A page that still fails after the last
//! retry becomes a placeholder result.

use scraper::Html;
use std::sync::Arc;
use tracing::{debug, warn};

use super::config::ScrapingConfig;
use super::config::utils::product_page_url;
use super::fetch_pool::FetchCache;
use super::http_client::PageFetcher;
use super::parsing::{ContextualParser, ParseContext, ParsingConfig, ParsingResult, ProductDetailParser};
use super::retry_manager::RetryPolicy;
use crate::domain::{ExtractionResult, ProductCode};

pub struct DescriptionScraper {
    fetcher: Arc<dyn PageFetcher>,
    parser: ProductDetailParser,
    site_base_url: String,
    retry: RetryPolicy,
}

impl DescriptionScraper {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        scraping: &ScrapingConfig,
        parsing: &ParsingConfig,
    ) -> ParsingResult<Self> {
        Ok(Self {
            fetcher,
            parser: ProductDetailParser::with_config(parsing)?,
            site_base_url: scraping.site_base_url.clone(),
            retry: RetryPolicy::from_scraping_config(scraping),
        })
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn with_parser(mut self, parser: ProductDetailParser) -> Self {
        self.parser = parser;
        self
    }

    /// Scrape one product page without caching
    pub async fn scrape(&self, code: &ProductCode) -> ExtractionResult {
        let url = product_page_url(&self.site_base_url, code);
        let page_url = url.as_str();
        let fetcher = self.fetcher.as_ref();

        match self
            .retry
            .run(code.as_str(), move |_| fetcher.fetch_text(page_url, None))
            .await
        {
            Ok(body) => self.extract(code, page_url, &body),
            Err(e) => {
                warn!("❌ Description for {} unavailable after retries: {}", code, e);
                ExtractionResult::placeholder(code.clone())
            }
        }
    }

    /// Scrape through the run cache; placeholders are cached too
    pub async fn scrape_cached(&self, code: &ProductCode, cache: &FetchCache<ExtractionResult>) -> ExtractionResult {
        cache.get_or_fetch(code, || self.scrape(code)).await
    }

    fn extract(&self, code: &ProductCode, page_url: &str, body: &str) -> ExtractionResult {
        let html = Html::parse_document(body);
        let context = ParseContext::new(code.clone(), page_url);
        match self.parser.parse_with_context(&html, &context) {
            Ok(result) => {
                debug!("📄 {} extracted, has_specs={}", code, result.has_specs);
                result
            }
            Err(e) => {
                warn!("Product page for {} could not be parsed: {}", code, e);
                ExtractionResult::placeholder(code.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::{HttpClient, HttpClientConfig};
    use std::time::Duration;

    fn scraper(server: &mockito::Server) -> DescriptionScraper {
        let scraping = ScrapingConfig {
            site_base_url: server.url(),
            ..Default::default()
        };
        let client = HttpClient::new(HttpClientConfig::from_scraping_config(&scraping)).unwrap();
        DescriptionScraper::new(Arc::new(client), &scraping, &ParsingConfig::default())
            .unwrap()
            .with_retry_policy(RetryPolicy::new(2, Duration::from_millis(1)))
    }

    #[tokio::test]
    async fn test_scrape_extracts_page() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/producto.php?item_number=IMHPM110W")
            .with_status(200)
            .with_body(r#"<div id="home"><div><p>Impresora compacta.</p></div></div>"#)
            .create_async()
            .await;

        let result = scraper(&server).scrape(&ProductCode::new("IMHPM110W")).await;
        assert_eq!(result.raw_description, "Impresora compacta.");
        assert!(!result.is_placeholder());
        assert!(!result.has_specs);
    }

    #[tokio::test]
    async fn test_failing_page_becomes_placeholder_after_retries() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/producto.php?item_number=ZZ9")
            .with_status(503)
            .expect(3)
            .create_async()
            .await;

        let result = scraper(&server).scrape(&ProductCode::new("ZZ9")).await;

        mock.assert_async().await;
        assert!(result.is_placeholder());
        assert_eq!(result.combined_description, "No se pudo obtener la información para ZZ9.");
    }

    #[tokio::test]
    async fn test_placeholder_is_cached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/producto.php?item_number=ZZ9")
            .with_status(500)
            .expect(3)
            .create_async()
            .await;

        let scraper = scraper(&server);
        let cache = FetchCache::new();
        let code = ProductCode::new("ZZ9");
        scraper.scrape_cached(&code, &cache).await;
        let again = scraper.scrape_cached(&code, &cache).await;

        mock.assert_async().await;
        assert!(again.is_placeholder());
    }
}
