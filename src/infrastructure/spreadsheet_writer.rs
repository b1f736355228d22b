//! `.xlsx` output
//!
//! One workbook per logical grouping: enriched products, brand and category
//! id tables, and the optional per-product specification sheet. Every sheet
//! is a bold header row followed by one row per record.

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::{ExtractionResult, IdRegistry, ProductRow};

pub const PRODUCTS_FILE: &str = "productos.xlsx";
pub const BRANDS_FILE: &str = "marcas.xlsx";
pub const CATEGORIES_FILE: &str = "categorias.xlsx";
pub const SPECIFICATIONS_FILE: &str = "especificaciones.xlsx";

pub const PRODUCTS_SHEET: &str = "Productos";
pub const BRANDS_SHEET: &str = "Marcas";
pub const CATEGORIES_SHEET: &str = "Categorias";
pub const SPECIFICATIONS_SHEET: &str = "Especificaciones";

/// Longest string Excel accepts in a single cell, in characters
pub const MAX_CELL_CHARS: usize = 32_767;

#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Failed to write workbook {path}")]
    Xlsx {
        path: PathBuf,
        #[source]
        source: XlsxError,
    },
}

type SheetResult<T> = Result<T, XlsxError>;

/// Write the enriched products workbook
pub fn write_products(rows: &[ProductRow], path: &Path) -> Result<(), SpreadsheetError> {
    save_workbook(path, PRODUCTS_SHEET, |sheet, header| {
        write_header(sheet, &ProductRow::HEADERS, header)?;
        for (index, row) in rows.iter().enumerate() {
            let r = data_row(index);
            let code = row.product_code.as_str();
            sheet.write_string(r, 0, fit_cell(&row.title, code, "Title"))?;
            sheet.write_string(r, 1, fit_cell(&row.description, code, "Description"))?;
            sheet.write_number(r, 2, row.price)?;
            sheet.write_number(r, 3, f64::from(row.category_id))?;
            sheet.write_number(r, 4, f64::from(row.brand_id))?;
            sheet.write_string(r, 5, &row.size)?;
            sheet.write_boolean(r, 6, row.featured)?;
            sheet.write_number(r, 7, f64::from(row.stock))?;
            sheet.write_string(r, 8, code)?;
            sheet.write_string(r, 9, fit_cell(&row.image_url, code, "ImageUrl"))?;
        }
        Ok(())
    })?;
    info!("💾 {} products written to {}", rows.len(), path.display());
    Ok(())
}

/// Write an `ID, Name` table for a brand or category registry
pub fn write_registry(registry: &IdRegistry, sheet_name: &str, path: &Path) -> Result<(), SpreadsheetError> {
    save_workbook(path, sheet_name, |sheet, header| {
        write_header(sheet, &["ID", "Name"], header)?;
        for (index, (id, name)) in registry.entries().enumerate() {
            let r = data_row(index);
            sheet.write_number(r, 0, f64::from(id))?;
            sheet.write_string(r, 1, fit_cell(name, sheet_name, "Name"))?;
        }
        Ok(())
    })?;
    info!("💾 {} {} written to {}", registry.len(), sheet_name, path.display());
    Ok(())
}

/// Write one row per scraped product with a `Spec_<Category>` column per category
pub fn write_specifications(results: &[ExtractionResult], path: &Path) -> Result<(), SpreadsheetError> {
    let mut columns: Vec<String> = Vec::new();
    for result in results {
        for category in result.normalized_specs.categories() {
            let column = spec_column_name(category);
            if !columns.contains(&column) {
                columns.push(column);
            }
        }
    }

    save_workbook(path, SPECIFICATIONS_SHEET, |sheet, header| {
        let mut headers = vec!["ProductCode".to_string(), "Description".to_string()];
        headers.extend(columns.iter().cloned());
        write_header(sheet, &headers, header)?;

        for (index, result) in results.iter().enumerate() {
            let r = data_row(index);
            let code = result.product_code.as_str();
            sheet.write_string(r, 0, code)?;
            sheet.write_string(r, 1, fit_cell(&result.raw_description, code, "Description"))?;
            for (category, values) in result.normalized_specs.iter() {
                let column = spec_column_name(category);
                if let Some(position) = columns.iter().position(|c| *c == column) {
                    let joined = values.join("; ");
                    sheet.write_string(r, column_index(position + 2), fit_cell(&joined, code, &column))?;
                }
            }
        }
        Ok(())
    })?;
    info!("💾 Specifications for {} products written to {}", results.len(), path.display());
    Ok(())
}

/// `Spec_` plus the category with whitespace as `_` and other symbols dropped
pub fn spec_column_name(category: &str) -> String {
    let cleaned: String = category
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    format!("Spec_{cleaned}")
}

/// Cut `value` to [`MAX_CELL_CHARS`] on a char boundary
pub fn fit_cell<'a>(value: &'a str, owner: &str, field: &str) -> &'a str {
    match value.char_indices().nth(MAX_CELL_CHARS) {
        Some((cut, _)) => {
            warn!(
                "✂️ {} of {} truncated to {} characters for Excel",
                field, owner, MAX_CELL_CHARS
            );
            &value[..cut]
        }
        None => value,
    }
}

fn save_workbook<F>(path: &Path, sheet_name: &str, fill: F) -> Result<(), SpreadsheetError>
where
    F: FnOnce(&mut Worksheet, &Format) -> SheetResult<()>,
{
    let wrap = |source| SpreadsheetError::Xlsx {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name).map_err(wrap)?;
    fill(sheet, &header).map_err(wrap)?;
    workbook.save(path).map_err(wrap)
}

fn write_header<S: AsRef<str>>(sheet: &mut Worksheet, headers: &[S], format: &Format) -> SheetResult<()> {
    for (position, title) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, column_index(position), title.as_ref(), format)?;
    }
    Ok(())
}

fn data_row(index: usize) -> u32 {
    u32::try_from(index + 1).unwrap_or(u32::MAX)
}

fn column_index(position: usize) -> u16 {
    u16::try_from(position).unwrap_or(u16::MAX)
}
