//! Category header normalization
//!
//! Raw headers are upper-cased, trimmed and looked up in a fixed synonym
//! table. Unmapped headers pass through trimmed but otherwise untouched.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::domain::SpecTable;

/// Canonical category names
pub const CANONICAL_CATEGORIES: &[&str] = &[
    "DISPOSITIVO",
    "MARCA",
    "MODELO",
    "NUMERO DE PARTE",
    "CARACTERISTICAS",
    "GARANTIA",
];

const SYNONYMS: &[(&str, &str)] = &[
    ("DISPOSITIVO", "DISPOSITIVO"),
    ("TIPO DE DISPOSITIVO", "DISPOSITIVO"),
    ("DEVICE", "DISPOSITIVO"),
    ("MARCA", "MARCA"),
    ("FABRICANTE", "MARCA"),
    ("MANUFACTURER", "MARCA"),
    ("BRAND", "MARCA"),
    ("MODELO", "MODELO"),
    ("MODEL", "MODELO"),
    ("NUMERO DE PARTE", "NUMERO DE PARTE"),
    ("NÚMERO DE PARTE", "NUMERO DE PARTE"),
    ("NRO DE PARTE", "NUMERO DE PARTE"),
    ("NRO. DE PARTE", "NUMERO DE PARTE"),
    ("PART NUMBER", "NUMERO DE PARTE"),
    ("P/N", "NUMERO DE PARTE"),
    ("CARACTERISTICAS", "CARACTERISTICAS"),
    ("CARACTERÍSTICAS", "CARACTERISTICAS"),
    ("FEATURES", "CARACTERISTICAS"),
    ("GARANTIA", "GARANTIA"),
    ("GARANTÍA", "GARANTIA"),
    ("WARRANTY", "GARANTIA"),
];

static SYNONYM_TABLE: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| SYNONYMS.iter().copied().collect());

/// Canonical name for a raw header
pub fn canonical_category(raw: &str) -> String {
    let trimmed = raw.trim();
    SYNONYM_TABLE
        .get(trimmed.to_uppercase().as_str())
        .map_or_else(|| trimmed.to_string(), |canonical| (*canonical).to_string())
}

/// Map every category to its canonical name; merged categories keep value order
pub fn normalize(specs: &SpecTable) -> SpecTable {
    let mut normalized = SpecTable::new();
    for (category, values) in specs.iter() {
        let canonical = canonical_category(category);
        if canonical.is_empty() {
            continue;
        }
        normalized.extend(&canonical, values.iter().cloned());
    }
    normalized
}
