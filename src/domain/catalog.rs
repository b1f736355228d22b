//! Catalog-level structures produced while scanning the CSV export

use serde::Serialize;
use std::collections::HashMap;

use super::product::ProductCode;

/// Name to sequential id mapping; the first name registered gets id 1
#[derive(Debug, Clone, Default)]
pub struct IdRegistry {
    names: Vec<String>,
    ids: HashMap<String, u32>,
}

impl IdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id for `name`, assigning the next one on first sight
    pub fn register(&mut self, name: &str) -> u32 {
        if let Some(id) = self.ids.get(name) {
            return *id;
        }
        self.names.push(name.to_string());
        let id = u32::try_from(self.names.len()).unwrap_or(u32::MAX);
        self.ids.insert(name.to_string(), id);
        id
    }

    pub fn id_of(&self, name: &str) -> Option<u32> {
        self.ids.get(name).copied()
    }

    /// Entries in id order
    pub fn entries(&self) -> impl Iterator<Item = (u32, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(index, name)| (u32::try_from(index + 1).unwrap_or(u32::MAX), name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Raw product fields read from one catalog data row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogRow {
    pub code: ProductCode,
    /// Title before the `[@@@]` feature marker
    pub title: String,
    pub full_title: String,
    pub category: String,
    pub brand: String,
    pub stock: u32,
    pub price: f64,
}

impl CatalogRow {
    /// Feature fragments listed after the `[@@@]` marker
    pub fn features(&self) -> Vec<String> {
        let Some((_, tail)) = self.full_title.split_once("[@@@]") else {
            return Vec::new();
        };
        tail.split([',', '.'])
            .map(str::trim)
            .filter(|feature| feature.chars().count() > 3)
            .map(str::to_string)
            .collect()
    }

    /// Rows that make it into the products workbook
    pub fn is_publishable(&self) -> bool {
        !self.title.is_empty() && self.price > 0.0
    }
}

/// Output of the row grouper
#[derive(Debug, Clone, Default)]
pub struct ParsedCatalog {
    /// Distinct product codes in first-seen order
    pub product_codes: Vec<ProductCode>,
    pub rows: Vec<CatalogRow>,
    pub row_by_code: HashMap<ProductCode, usize>,
    pub categories: IdRegistry,
    pub brands: IdRegistry,
}

impl ParsedCatalog {
    pub fn row(&self, code: &ProductCode) -> Option<&CatalogRow> {
        self.row_by_code.get(code).and_then(|index| self.rows.get(*index))
    }
}
