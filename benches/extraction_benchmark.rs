//! Extraction and pool throughput
//!
//! - `extract`: one product page through the detail parser (description,
//!   spec table, normalization, rendering)
//! - `run_all`: pool overhead for 200 trivial workers at two concurrency levels

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use tokio::runtime::Runtime;

use catalog_enricher::infrastructure::{BoundedFetchPool, ProductDetailParser};

fn product_page(rows: usize) -> String {
    let mut table = String::new();
    for i in 0..rows {
        table.push_str(&format!(
            r#"<tr><td fircol="y" rowspan="2">CATEGORIA {i}</td><td>Valor {i}</td></tr><tr><td>Extra {i}</td></tr>"#
        ));
    }
    format!(
        r#"<html><body>
             <div id="home"><div>
               <p>Monitor LED 24 pulgadas.<br>Panel IPS.</p>
               <h2>Consideraciones</h2><p>Garantía de 3 años</p>
             </div></div>
             <div id="esp_tecnicas"><table>
               <tr><td fircol="y">FABRICANTE</td><td>LG</td></tr>
               {table}
             </table></div>
           </body></html>"#
    )
}

fn extraction(c: &mut Criterion) {
    let parser = ProductDetailParser::new().unwrap();
    let small = product_page(5);
    let large = product_page(80);

    c.bench_function("extract - 5 spec rows", |b| b.iter(|| black_box(parser.extract(&small))));
    c.bench_function("extract - 80 spec rows", |b| b.iter(|| black_box(parser.extract(&large))));
}

fn pool_overhead(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    for concurrency in [1, 20] {
        c.bench_function(&format!("run_all - 200 items, concurrency {concurrency}"), |b| {
            b.to_async(&rt).iter(|| async move {
                let pool = BoundedFetchPool::new(concurrency, 50);
                let items: Vec<u32> = (0..200).collect();
                black_box(pool.run_all("bench", items, |n| async move { n * 2 }).await)
            })
        });
    }
}

criterion_group!(benches, extraction, pool_overhead);
criterion_main!(benches);
