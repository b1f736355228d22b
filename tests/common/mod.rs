//! Shared fixtures for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use catalog_enricher::AppConfig;
use catalog_enricher::infrastructure::{FetchError, PageFetcher};

pub const SITE: &str = "https://www.deltron.com.pe/modulos/productos/items";

/// In-memory fetcher: known pages answer 200, listed images probe 200,
/// everything else is a 404
#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, String>,
    images: HashSet<String>,
    calls: Mutex<HashMap<String, usize>>,
    latency: Option<Duration>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), body.into());
        self
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.images.insert(url.into());
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    fn record(&self, url: &str) {
        *self.calls.lock().unwrap().entry(url.to_string()).or_default() += 1;
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch_text(&self, url: &str, _timeout: Option<Duration>) -> Result<String, FetchError> {
        self.record(url);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.pages.get(url).cloned().ok_or_else(|| FetchError::HttpStatus {
            status: 404,
            url: url.to_string(),
        })
    }

    async fn probe(&self, url: &str, _timeout: Option<Duration>) -> Result<u16, FetchError> {
        self.record(url);
        Ok(if self.images.contains(url) { 200 } else { 404 })
    }
}

pub fn product_url(code: &str) -> String {
    format!("{SITE}/producto.php?item_number={code}")
}

pub fn image_page_url(code: &str) -> String {
    format!("{SITE}/image_ext.php?item={code}")
}

/// Default configuration with retries fast enough for tests
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.scraping.max_retries = 2;
    config.scraping.retry_base_delay_ms = 1;
    config.logging.file_output = false;
    config
}

pub const PRINTER_PAGE: &str = r#"
    <html><body>
      <div id="home"><div>
        <p>Línea economica.<br>Ideal para oficina.</p>
        <p>Foto referencial</p>
      </div></div>
      <div id="esp_tecnicas"><table>
        <tr><td fircol="y" rowspan="2">MARCA</td><td>HP</td></tr>
        <tr><td>Inc.</td></tr>
        <tr><td fircol="y">DESCRIPCION DE CARACTERISTICAS</td><td>Wifi</td></tr>
      </table></div>
    </body></html>"#;

pub const CATALOG_CSV: &str = "\
x,CODIGO,IMPRESORAS,,,,,,
1,IMHPM110W,Impresora HP M110w [@@@] Laser monocromo. Wifi integrado,8,\"450,00\",,,,HP
2,AB12XYZ,Accesorio generico,>20,15.5,,,,GENERICO
x,CODIGO,TECLADOS,,,,,,
3,ACTE70207W,Teclado Teros,0,0,,,,TEROS
";
