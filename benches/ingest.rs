use criterion::{Criterion, criterion_group, criterion_main};
use delimited_ingest::{FileIngestor, IngestConfig, RowEvent, tokenize_buffer, tokenize_line};
use std::hint::black_box;
use tempfile::TempDir;

fn sample_export(rows: usize) -> String {
    let mut text = String::from("gbifID,scientificName,locality,eventDate,individualCount\n");
    for i in 0..rows {
        text.push_str(&format!(
            "{i},\"Acer rubrum\",\"Burlington, VT\",2021-06-{:02},{}\n",
            i % 28 + 1,
            i % 17
        ));
    }
    text
}

fn bench_tokenizers(c: &mut Criterion) {
    let line = r#"1001,  "Turdus ""robin"" migratorius" ,"Stowe, VT",2021-06-01,12"#;
    c.bench_function("tokenize_line", |b| {
        b.iter(|| tokenize_line(black_box(line), ',', false))
    });

    let buffer = sample_export(1_000);
    c.bench_function("tokenize_buffer_1k_rows", |b| {
        b.iter(|| tokenize_buffer(black_box(&buffer), ',', true))
    });
}

fn bench_ingestion_modes(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("occurrences.csv");
    std::fs::write(&path, sample_export(10_000)).unwrap();

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let ingestor = FileIngestor::new(IngestConfig::default()).unwrap();

    c.bench_function("ingest_bulk_10k_rows", |b| {
        b.iter(|| runtime.block_on(ingestor.ingest_file(&path)).unwrap().row_count)
    });

    c.bench_function("ingest_streaming_10k_rows", |b| {
        b.iter(|| {
            let mut fields = 0usize;
            runtime
                .block_on(ingestor.ingest_file_streaming(&path, |event, _| {
                    if let RowEvent::Row(row) = event {
                        fields += row.values().len();
                    }
                    Ok(())
                }))
                .unwrap();
            fields
        })
    });
}

criterion_group!(benches, bench_tokenizers, bench_ingestion_modes);
criterion_main!(benches);
