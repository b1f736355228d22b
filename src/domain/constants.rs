//! Sentinel values written in place of genuine results

use super::product::ProductCode;

pub const NO_DESCRIPTION: &str = "No hay descripción disponible para este producto.";
pub const CONSIDERATIONS_PREFIX: &str = "Información del producto: ";
pub const SPECS_HEADING: &str = "TECHNICAL SPECIFICATIONS:";

pub const IMAGE_NOT_FOUND: &str = "No encontrada";
pub const IMAGE_ERROR: &str = "Error";
pub const NO_IMAGE_FILE: &str = "no_image.jpg";

pub const DEFAULT_TITLE: &str = "Producto sin nombre";
pub const DEFAULT_BRAND: &str = "Sin marca";
pub const DEFAULT_SIZE: &str = "S";

pub fn fetch_failed_message(code: &ProductCode) -> String {
    format!("No se pudo obtener la información para {code}.")
}
