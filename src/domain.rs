//! Domain module - Core business entities
//!
//! Value objects for products and the catalog scan. Each module is its own
//! file in the domain/ directory; common items are re-exported here.

pub mod catalog;
pub mod constants;
pub mod product;

pub use catalog::{CatalogRow, IdRegistry, ParsedCatalog};
pub use product::{ExtractionResult, ImageResult, ProductCode, ProductRow, SpecTable};
