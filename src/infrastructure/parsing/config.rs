//! Parsing configuration for HTML extraction
//!
//! Centralized configuration for CSS selectors and parsing behavior.
//! Each selector list is an ordered set of fallbacks.

use serde::{Deserialize, Serialize};

/// Main parsing configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingConfig {
    /// Product page description selectors
    pub description: DescriptionSelectors,

    /// Specification table selectors
    pub spec_table: SpecTableSelectors,

    /// Extended image page selectors
    pub image_page: ImagePageSelectors,
}

/// Selectors for the active description panel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DescriptionSelectors {
    /// First paragraph of the active panel
    pub first_paragraph: Vec<String>,

    /// Headings and paragraphs of the panel, walked in document order
    pub panel_blocks: Vec<String>,

    /// Heading text that opens the considerations section
    pub considerations_heading: String,

    /// Paragraphs containing this phrase are skipped
    pub excluded_phrase: String,
}

impl Default for DescriptionSelectors {
    fn default() -> Self {
        Self {
            first_paragraph: vec!["#home > div > p:first-of-type".to_string()],
            panel_blocks: vec!["#home > div > h2, #home > div > p".to_string()],
            considerations_heading: "Consideraciones".to_string(),
            excluded_phrase: "Foto referencial".to_string(),
        }
    }
}

/// Selectors for the technical specification table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecTableSelectors {
    /// Candidate tables, probed in order
    pub candidate_tables: Vec<String>,

    /// Attribute marking a category header cell
    pub header_attribute: String,

    /// Value of [`Self::header_attribute`] on header cells
    pub header_attribute_value: String,
}

impl Default for SpecTableSelectors {
    fn default() -> Self {
        Self {
            candidate_tables: vec![
                "#esp_tecnicas table".to_string(),
                "#especificaciones table".to_string(),
                "div[id*='tecnic'] table".to_string(),
            ],
            header_attribute: "fircol".to_string(),
            header_attribute_value: "y".to_string(),
        }
    }
}

/// Selectors for the extended image page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagePageSelectors {
    /// Preferred image containers
    pub preferred: Vec<String>,

    /// Path fragments that mark a product image when no preferred match exists
    pub path_fragments: Vec<String>,
}

impl Default for ImagePageSelectors {
    fn default() -> Self {
        Self {
            preferred: vec!["center img".to_string()],
            path_fragments: vec!["/productos/".to_string(), "/items/".to_string()],
        }
    }
}
