//! Product-level value objects shared by the scraping and output layers
//!
//! Every per-product lookup and cache is keyed by [`ProductCode`]. Results
//! produced for a code are immutable once built.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use super::constants::{IMAGE_ERROR, IMAGE_NOT_FOUND, NO_IMAGE_FILE};

/// Opaque product identifier as it appears in the catalog export
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductCode(String);

impl ProductCode {
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lower-cased form used in image paths and image-page matching
    pub fn to_lowercase(&self) -> String {
        self.0.to_lowercase()
    }
}

impl fmt::Display for ProductCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ProductCode {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Category name to ordered values, kept in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecTable {
    entries: Vec<(String, Vec<String>)>,
}

impl SpecTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure `category` exists without adding a value
    pub fn touch(&mut self, category: &str) {
        self.values_mut(category);
    }

    pub fn push(&mut self, category: &str, value: impl Into<String>) {
        self.values_mut(category).push(value.into());
    }

    pub fn extend<I>(&mut self, category: &str, values: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.values_mut(category).extend(values);
    }

    fn values_mut(&mut self, category: &str) -> &mut Vec<String> {
        let index = match self.entries.iter().position(|(name, _)| name == category) {
            Some(index) => index,
            None => {
                self.entries.push((category.to_string(), Vec::new()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[index].1
    }

    pub fn get(&self, category: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, values)| values.as_slice())
    }

    pub fn contains(&self, category: &str) -> bool {
        self.get(category).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when at least one category carries a value
    pub fn has_values(&self) -> bool {
        self.entries.iter().any(|(_, values)| !values.is_empty())
    }
}

impl Serialize for SpecTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, values) in &self.entries {
            map.serialize_entry(name, values)?;
        }
        map.end()
    }
}

/// Scraped description and specification data for one product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionResult {
    pub product_code: ProductCode,
    pub raw_description: String,
    /// Specification table exactly as read from the page
    pub specs: SpecTable,
    /// Canonical categories after synonym mapping and filtering
    pub normalized_specs: SpecTable,
    pub combined_description: String,
    pub has_specs: bool,
    #[serde(skip)]
    placeholder: bool,
}

impl ExtractionResult {
    pub fn new(
        product_code: ProductCode,
        raw_description: String,
        specs: SpecTable,
        normalized_specs: SpecTable,
        combined_description: String,
    ) -> Self {
        let has_specs = normalized_specs.has_values();
        Self {
            product_code,
            raw_description,
            specs,
            normalized_specs,
            combined_description,
            has_specs,
            placeholder: false,
        }
    }

    /// Result substituted when the product page could not be fetched
    pub fn placeholder(product_code: ProductCode) -> Self {
        let message = super::constants::fetch_failed_message(&product_code);
        Self {
            product_code,
            raw_description: String::new(),
            specs: SpecTable::new(),
            normalized_specs: SpecTable::new(),
            combined_description: message,
            has_specs: false,
            placeholder: true,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }
}

/// Resolved image for one product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResult {
    pub product_code: ProductCode,
    pub image_url: String,
    pub image_title: String,
}

impl ImageResult {
    pub fn new(product_code: ProductCode, image_url: String, image_title: String) -> Self {
        Self {
            product_code,
            image_url,
            image_title,
        }
    }

    pub fn not_found(product_code: ProductCode) -> Self {
        let image_title = format!("Producto {product_code}");
        Self {
            product_code,
            image_url: IMAGE_NOT_FOUND.to_string(),
            image_title,
        }
    }

    pub fn has_valid_image(&self) -> bool {
        !self.image_url.is_empty()
            && self.image_url != IMAGE_NOT_FOUND
            && self.image_url != IMAGE_ERROR
            && !self.image_url.ends_with(NO_IMAGE_FILE)
    }
}

/// One enriched output row of the products workbook
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductRow {
    pub title: String,
    pub description: String,
    pub price: f64,
    #[serde(rename = "CategoryID")]
    pub category_id: u32,
    #[serde(rename = "BrandID")]
    pub brand_id: u32,
    pub size: String,
    pub featured: bool,
    pub stock: u32,
    pub product_code: ProductCode,
    pub image_url: String,
}

impl ProductRow {
    pub const HEADERS: [&'static str; 10] = [
        "Title",
        "Description",
        "Price",
        "CategoryID",
        "BrandID",
        "Size",
        "Featured",
        "Stock",
        "ProductCode",
        "ImageUrl",
    ];
}
