//! End-to-end enrichment runs against an in-memory site
mod common;

use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

use catalog_enricher::infrastructure::spreadsheet_writer::MAX_CELL_CHARS;
use catalog_enricher::{EnrichmentPipeline, PipelineOptions, ProductCode};
use common::{CATALOG_CSV, FakeFetcher, PRINTER_PAGE, image_page_url, product_url, test_config};

const PRINTER_IMAGE_PAGE: &str =
    r#"<html><body><center><img src="/fotos/imhpm110w_big.jpg" alt="HP LaserJet M110w"></center></body></html>"#;

fn fetcher() -> FakeFetcher {
    FakeFetcher::new()
        .with_page(product_url("IMHPM110W"), PRINTER_PAGE)
        .with_page(image_page_url("IMHPM110W"), PRINTER_IMAGE_PAGE)
}

fn shared_strings(workbook: &Path) -> String {
    let file = std::fs::File::open(workbook).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut xml = String::new();
    archive
        .by_name("xl/sharedStrings.xml")
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();
    xml
}

#[tokio::test]
async fn full_run_writes_workbooks_and_falls_back() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("catalogo.csv");
    std::fs::write(&input, CATALOG_CSV).unwrap();
    let output = dir.path().join("output");

    let fake = Arc::new(fetcher());
    let pipeline = EnrichmentPipeline::new(fake.clone(), &test_config()).unwrap();
    let summary = pipeline
        .run(&input, &output, &PipelineOptions::default())
        .await
        .unwrap();

    assert_eq!(summary.product_codes, 3);
    assert_eq!(summary.rows_written, 2);
    assert_eq!(summary.rows_skipped, 1);
    assert_eq!(summary.placeholders, 2);
    assert_eq!(summary.brands, 3);
    assert_eq!(summary.categories, 2);
    assert_eq!(summary.files.len(), 3);
    for file in &summary.files {
        assert!(file.exists(), "missing {}", file.display());
    }

    // Each page is fetched once even though the transform pool asks again
    assert_eq!(fake.calls(&product_url("IMHPM110W")), 1);
    // Failing pages are tried max_retries + 1 times
    assert_eq!(fake.calls(&product_url("AB12XYZ")), 3);

    let products = shared_strings(&output.join("productos.xlsx"));
    assert!(products.contains("Línea economica."));
    assert!(products.contains("Ideal para oficina."));
    assert!(products.contains("TECHNICAL SPECIFICATIONS:"));
    assert!(products.contains("https://www.deltron.com.pe/fotos/imhpm110w_big.jpg"));
    assert!(products.contains("https://imagenes.deltron.com.pe/images/productos/items/large/ab/12/ab12xyz.jpg"));
    assert!(products.contains("Accesorio generico de la marca GENERICO."));
    assert!(!products.contains("Teclado Teros"));

    let brands = shared_strings(&output.join("marcas.xlsx"));
    assert!(brands.contains("TEROS"));
}

#[tokio::test]
async fn overlong_description_is_truncated_not_fatal() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("catalogo.csv");
    std::fs::write(&input, CATALOG_CSV).unwrap();
    let output = dir.path().join("output");

    let paragraph = "a".repeat(40_000);
    let page = format!(r#"<html><body><div id="home"><div><p>{paragraph}</p></div></div></body></html>"#);
    let fake = FakeFetcher::new().with_page(product_url("IMHPM110W"), page);
    let pipeline = EnrichmentPipeline::new(Arc::new(fake), &test_config()).unwrap();

    let summary = pipeline
        .run(&input, &output, &PipelineOptions::default())
        .await
        .unwrap();
    assert_eq!(summary.rows_written, 2);

    let products = shared_strings(&output.join("productos.xlsx"));
    assert!(products.contains(&"a".repeat(MAX_CELL_CHARS)));
    assert!(!products.contains(&"a".repeat(MAX_CELL_CHARS + 1)));
}

#[tokio::test]
async fn missing_input_is_fatal() {
    let dir = tempdir().unwrap();
    let pipeline = EnrichmentPipeline::new(Arc::new(FakeFetcher::new()), &test_config()).unwrap();

    let err = pipeline
        .run(&dir.path().join("nope.csv"), dir.path(), &PipelineOptions::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Input file not found"));
}

#[tokio::test]
async fn skip_failed_images_and_specifications_workbook() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("catalogo.csv");
    std::fs::write(&input, CATALOG_CSV).unwrap();
    let output = dir.path().join("output");

    let fake = fetcher().with_page(
        image_page_url("AB12XYZ"),
        r#"<center><img src="/fotos/no_image.jpg"></center>"#,
    );
    let pipeline = EnrichmentPipeline::new(Arc::new(fake), &test_config()).unwrap();
    let options = PipelineOptions {
        skip_failed_images: true,
        write_specifications: true,
        ..PipelineOptions::default()
    };
    let summary = pipeline.run(&input, &output, &options).await.unwrap();

    assert_eq!(summary.rows_written, 1);
    assert_eq!(summary.rows_skipped, 2);
    assert_eq!(summary.files.len(), 4);

    let specs = shared_strings(&output.join("especificaciones.xlsx"));
    assert!(specs.contains("Spec_MARCA"));
    assert!(specs.contains("HP; Inc."));
    assert!(!specs.contains("DESCRIPCION DE CARACTERISTICAS"));
}

#[tokio::test]
async fn preview_uses_direct_image_when_probe_hits() {
    let direct = "https://imagenes.deltron.com.pe/images/productos/items/large/im/hp/imhpm110w.jpg";
    let fake = Arc::new(fetcher().with_image(direct));
    let pipeline = EnrichmentPipeline::new(fake.clone(), &test_config()).unwrap();

    let preview = pipeline.preview(&ProductCode::new("IMHPM110W")).await;
    assert_eq!(preview.image.image_url, direct);
    assert_eq!(preview.image.image_title, "Producto IMHPM110W");
    assert_eq!(preview.extraction.normalized_specs.get("MARCA").unwrap(), &["HP".to_string(), "Inc.".to_string()]);
    assert_eq!(fake.calls(&image_page_url("IMHPM110W")), 0);

    let text = preview.to_string();
    assert!(text.contains("MARCA:\n  - HP\n  - Inc."));
}
