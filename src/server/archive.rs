//! Zip packaging of the run output

use std::io::{Cursor, Write};
use std::path::Path;
use thiserror::Error;
use tracing::debug;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::infrastructure::spreadsheet_writer::{BRANDS_FILE, CATEGORIES_FILE, PRODUCTS_FILE};

pub const ARCHIVE_NAME: &str = "productos_procesados.zip";

/// Workbooks shipped back to the uploader, in archive order
pub const ARCHIVED_FILES: [&str; 3] = [PRODUCTS_FILE, BRANDS_FILE, CATEGORIES_FILE];

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Failed to read {name}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write zip entry")]
    Zip(#[from] zip::result::ZipError),

    #[error("Failed to write zip entry")]
    Io(#[from] std::io::Error),
}

/// Zip whichever of the archived workbooks exist in `output_dir`
pub fn zip_outputs(output_dir: &Path) -> Result<Vec<u8>, ArchiveError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for name in ARCHIVED_FILES {
        let path = output_dir.join(name);
        if !path.exists() {
            debug!("Skipping missing output {}", name);
            continue;
        }
        let bytes = std::fs::read(&path).map_err(|source| ArchiveError::Read {
            name: name.to_string(),
            source,
        })?;
        writer.start_file(name, options)?;
        writer.write_all(&bytes)?;
    }

    Ok(writer.finish()?.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_zip_contains_existing_files_only() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(PRODUCTS_FILE), b"products").unwrap();
        std::fs::write(dir.path().join(CATEGORIES_FILE), b"categories").unwrap();

        let bytes = zip_outputs(dir.path()).unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<&str> = archive.file_names().collect();

        assert_eq!(archive.len(), 2);
        assert!(names.contains(&PRODUCTS_FILE));
        assert!(names.contains(&CATEGORIES_FILE));
        assert!(!names.contains(&BRANDS_FILE));
    }

    #[test]
    fn test_empty_directory_gives_empty_archive() {
        let dir = tempdir().unwrap();
        let bytes = zip_outputs(dir.path()).unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 0);
    }
}
