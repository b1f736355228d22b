//! Catalog CSV reading and row grouping
//!
//! The distributor export is not a flat table: category header rows (second
//! column contains `CODIGO`) are followed by the product rows of that
//! category, with divider rows sprinkled in between. Rows are read without a
//! header, with a flexible column count and lossy UTF-8 decoding.

use csv::{ByteRecord, ReaderBuilder};
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::constants::{DEFAULT_BRAND, DEFAULT_TITLE};
use crate::domain::{CatalogRow, ParsedCatalog, ProductCode};

const DIVIDER_MARKER: &str = "_______________";
const CATEGORY_MARKER: &str = "CODIGO";
const FEATURE_MARKER: &str = "[@@@]";

mod column {
    pub const CODE: usize = 1;
    pub const TITLE: usize = 2;
    pub const STOCK: usize = 3;
    pub const PRICE: usize = 4;
    pub const BRAND: usize = 8;
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read catalog {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV")]
    Csv(#[from] csv::Error),
}

/// CSV reader for catalog exports
#[derive(Debug, Clone, Copy)]
pub struct CatalogReader {
    delimiter: u8,
}

impl Default for CatalogReader {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CatalogReader {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn read_path(&self, path: &Path) -> Result<ParsedCatalog, CatalogError> {
        if !path.is_file() {
            return Err(CatalogError::NotFound(path.to_path_buf()));
        }
        let file = std::fs::File::open(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let rows = self.read_raw_rows(file)?;
        info!("📄 Read {} raw rows from {}", rows.len(), path.display());
        Ok(parse_rows(&rows))
    }

    pub fn read_bytes(&self, bytes: &[u8]) -> Result<ParsedCatalog, CatalogError> {
        let rows = self.read_raw_rows(bytes)?;
        Ok(parse_rows(&rows))
    }

    /// Every record as untrimmed, lossily decoded fields
    pub fn read_raw_rows<R: Read>(&self, input: R) -> Result<Vec<Vec<String>>, CatalogError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_reader(input);

        let mut rows = Vec::new();
        let mut record = ByteRecord::new();
        while reader.read_byte_record(&mut record)? {
            rows.push(
                record
                    .iter()
                    .map(|field| String::from_utf8_lossy(field).into_owned())
                    .collect(),
            );
        }
        Ok(rows)
    }
}

/// Read and group a catalog file with the default reader
pub fn read_catalog(path: &Path) -> Result<ParsedCatalog, CatalogError> {
    CatalogReader::default().read_path(path)
}

/// Read and group an uploaded catalog held in memory
pub fn read_from_bytes(bytes: &[u8]) -> Result<ParsedCatalog, CatalogError> {
    CatalogReader::default().read_bytes(bytes)
}

/// Group raw rows into products, categories and brands
pub fn parse_rows(rows: &[Vec<String>]) -> ParsedCatalog {
    let mut catalog = ParsedCatalog::default();
    let mut current_category: Option<String> = None;

    for (line, row) in rows.iter().enumerate() {
        if row.len() < 3 || row[0].trim().is_empty() {
            debug!("Skipping short or empty row {}", line + 1);
            continue;
        }
        if row[0].contains(DIVIDER_MARKER) {
            continue;
        }

        if row[column::CODE].contains(CATEGORY_MARKER) {
            let name = row[column::TITLE].trim();
            if !name.is_empty() {
                catalog.categories.register(name);
                current_category = Some(name.to_string());
            }
            continue;
        }

        let Some(category) = current_category.as_deref() else {
            debug!("Skipping row {} before any category header", line + 1);
            continue;
        };
        let code = ProductCode::new(&row[column::CODE]);
        if code.is_empty() {
            debug!("Skipping row {} without product code", line + 1);
            continue;
        }

        let product = build_row(code, category, row);
        catalog.brands.register(&product.brand);

        if !catalog.row_by_code.contains_key(&product.code) {
            catalog.product_codes.push(product.code.clone());
            catalog.row_by_code.insert(product.code.clone(), catalog.rows.len());
        }
        catalog.rows.push(product);
    }

    info!(
        "Catalog grouped: {} product rows, {} distinct codes, {} categories, {} brands",
        catalog.rows.len(),
        catalog.product_codes.len(),
        catalog.categories.len(),
        catalog.brands.len()
    );
    catalog
}

fn build_row(code: ProductCode, category: &str, row: &[String]) -> CatalogRow {
    let field = |index: usize| row.get(index).map_or("", |value| value.trim());

    let full_title = match row.get(column::TITLE).map(String::as_str) {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => DEFAULT_TITLE.to_string(),
    };
    let title = full_title
        .split(FEATURE_MARKER)
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();
    let brand = match field(column::BRAND) {
        "" => DEFAULT_BRAND.to_string(),
        brand => brand.to_string(),
    };

    CatalogRow {
        code,
        title,
        full_title,
        category: category.to_string(),
        brand,
        stock: parse_stock(field(column::STOCK)),
        price: parse_price(field(column::PRICE)),
    }
}

/// Leading integer of the stock column; `>20` means "more than 20"
fn parse_stock(raw: &str) -> u32 {
    let digits: String = raw
        .trim_start_matches('>')
        .trim()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(0)
}

/// Longest decimal prefix of the price column, accepting a comma separator
fn parse_price(raw: &str) -> f64 {
    let normalized = raw.trim().replacen(',', ".", 1);
    let mut seen_dot = false;
    let number: String = normalized
        .chars()
        .take_while(|c| match c {
            '0'..='9' => true,
            '.' if !seen_dot => {
                seen_dot = true;
                true
            }
            _ => false,
        })
        .collect();
    number.parse().unwrap_or_else(|_| {
        if !raw.trim().is_empty() {
            debug!("Unparsable price '{}', using 0", raw);
        }
        0.0
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const SAMPLE: &str = "\
x,CODIGO,CASES Y ACCESORIOS,,,,,,
1,ACCFANPCCPLDEX4,Cooler Deepcool [@@@] RGB. PWM 4 pines,>20,\"25,50\",,,,DEEPCOOL
______________________________,,,,,,,,
2,ACTE70207W,Teclado inalámbrico,5,19.9,,,,
x,CODIGO,MEMORIAS,,,,,,
3,ME16KF436C18BB2,Memoria Fury 16GB,0,210,,,,KINGSTON
4,,sin codigo,1,1,,,,
corta,fila
";

    #[test]
    fn test_groups_rows_by_category() {
        let catalog = read_from_bytes(SAMPLE.as_bytes()).unwrap();

        let codes: Vec<&str> = catalog.product_codes.iter().map(ProductCode::as_str).collect();
        assert_eq!(codes, vec!["ACCFANPCCPLDEX4", "ACTE70207W", "ME16KF436C18BB2"]);

        let cooler = catalog.row(&ProductCode::new("ACCFANPCCPLDEX4")).unwrap();
        assert_eq!(cooler.title, "Cooler Deepcool");
        assert_eq!(cooler.category, "CASES Y ACCESORIOS");
        assert_eq!(cooler.stock, 20);
        assert!((cooler.price - 25.5).abs() < f64::EPSILON);
        assert_eq!(cooler.brand, "DEEPCOOL");

        let keyboard = catalog.row(&ProductCode::new("ACTE70207W")).unwrap();
        assert_eq!(keyboard.brand, "Sin marca");

        let categories: Vec<_> = catalog.categories.entries().collect();
        assert_eq!(categories, vec![(1, "CASES Y ACCESORIOS"), (2, "MEMORIAS")]);
        assert_eq!(catalog.brands.id_of("KINGSTON"), Some(3));
    }

    #[test]
    fn test_rows_before_category_are_ignored() {
        let rows = vec![vec!["1".to_string(), "X1".to_string(), "Suelto".to_string()]];
        let catalog = parse_rows(&rows);
        assert!(catalog.rows.is_empty());
        assert!(catalog.brands.is_empty());
    }

    #[test]
    fn test_lossy_utf8() {
        let mut bytes = b"x,CODIGO,IMPRESORAS\n1,IMP1,Impresora ".to_vec();
        bytes.push(0xE9);
        bytes.extend_from_slice(b",2,100\n");
        let catalog = read_from_bytes(&bytes).unwrap();
        assert!(catalog.rows[0].title.starts_with("Impresora"));
    }

    #[test]
    fn test_missing_file() {
        let err = read_catalog(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[test]
    fn test_semicolon_delimiter() {
        let data = "x;CODIGO;MONITORES\n1;MON1;Monitor 24;3;500\n";
        let catalog = CatalogReader::new().with_delimiter(b';').read_bytes(data.as_bytes()).unwrap();
        assert_eq!(catalog.rows.len(), 1);
        assert_eq!(catalog.rows[0].code.as_str(), "MON1");
    }

    #[rstest]
    #[case(">20", 20)]
    #[case("15 und", 15)]
    #[case("abc", 0)]
    #[case("", 0)]
    fn test_parse_stock(#[case] raw: &str, #[case] expected: u32) {
        assert_eq!(parse_stock(raw), expected);
    }

    #[rstest]
    #[case("25,50", 25.5)]
    #[case("19.9", 19.9)]
    #[case("1.234.50", 1.234)]
    #[case("1,234.50", 1.234)]
    #[case("99.90 USD", 99.9)]
    #[case("n/a", 0.0)]
    fn test_parse_price(#[case] raw: &str, #[case] expected: f64) {
        assert!((parse_price(raw) - expected).abs() < f64::EPSILON);
    }
}
