//! Fallback product descriptions built from catalog fields
//!
//! Used when the product page could not be scraped, so every published row
//! still carries a readable description.

use crate::domain::CatalogRow;

const MAX_FEATURES: usize = 5;

/// Stock availability sentence
fn stock_sentence(stock: u32) -> String {
    match stock {
        0 => "Producto temporalmente sin stock.".to_string(),
        1..=10 => format!("Solo quedan {stock} unidades disponibles."),
        11..=20 => "Buena disponibilidad en stock.".to_string(),
        _ => "Alta disponibilidad en stock.".to_string(),
    }
}

pub fn generate_description(row: &CatalogRow) -> String {
    let mut description = format!(
        "{} de la marca {}. Pertenece a la categoría {}. {} Código de producto: {}.",
        row.title,
        row.brand,
        row.category,
        stock_sentence(row.stock),
        row.code
    );

    let features = row.features();
    if !features.is_empty() {
        let listed: Vec<&str> = features.iter().take(MAX_FEATURES).map(String::as_str).collect();
        description.push_str(" Características principales: ");
        description.push_str(&listed.join(". "));
        description.push('.');
    }

    description
}
