/// Performance benchmarks for the streaming match filter
///
/// Run with: cargo bench
///
/// These track throughput of the full parse + filter + reduce pipeline
/// over synthetic report streams of increasing size.
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::io::Cursor;

use binsift::filter::FilterConfig;
use binsift::filter_stream::StreamFilter;

/// Generate a synthetic report with one section and `num_matches` records
fn generate_synthetic_report(num_matches: usize) -> String {
    let len_a = (num_matches * 8).max(1024);
    let mut lines = Vec::with_capacity(num_matches + 2);

    lines.push(format!("File a.bin, offset 0, len {len_a}"));
    lines.push(format!("File b.bin, offset 0, len {len_a}"));

    for i in 0..num_matches {
        let a = (i * 7) % len_a;
        let b = (i * 3) % len_a;
        let score = 10 + (i % 90) as i64;
        let length = 4 + (i % 28);
        lines.push(format!("{a},{b},{score},{length}"));
    }

    lines.join("\n")
}

fn bench_filtering_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("stream_filtering");

    for size in [1_000, 10_000, 100_000].iter() {
        let report = generate_synthetic_report(*size);
        group.throughput(Throughput::Elements(*size as u64));

        for (mode, config) in [
            (
                "passthrough",
                FilterConfig {
                    sort: false,
                    ..FilterConfig::default()
                },
            ),
            ("sort", FilterConfig::default()),
            (
                "coverage",
                FilterConfig {
                    coverage: true,
                    ..FilterConfig::default()
                },
            ),
        ] {
            group.bench_with_input(
                BenchmarkId::new(mode, size),
                &report,
                |bencher, report| {
                    let filter = StreamFilter::new(config.clone());
                    bencher.iter(|| {
                        let mut out = Vec::with_capacity(report.len());
                        let stats = filter
                            .process(Cursor::new(report.as_bytes()), &mut out)
                            .unwrap();
                        black_box((stats, out))
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_significance_model(c: &mut Criterion) {
    use binsift::significance::KarlinAltschul;

    let model = KarlinAltschul::default();
    c.bench_function("significance_decision", |bencher| {
        bencher.iter(|| {
            let mut accepted = 0u64;
            for score in 1..200i64 {
                for length in 1..100i64 {
                    if model.is_significant(black_box(score), black_box(length)) {
                        accepted += 1;
                    }
                }
            }
            black_box(accepted)
        });
    });
}

criterion_group!(benches, bench_filtering_modes, bench_significance_model);
criterion_main!(benches);
