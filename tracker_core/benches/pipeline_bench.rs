use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tracker_core::pipeline::{Pipeline, PipelineConfig};
use tracker_core::PositionUpdate;

/// Alternating left/right reports for `n` tags circling between the anchors.
fn make_lines(n: usize, rounds: usize) -> Vec<String> {
    let baseline = 5.0_f64;
    let mut lines = Vec::with_capacity(n * rounds * 2);
    for k in 0..rounds {
        for i in 0..n {
            let angle = (i + k) as f64 * std::f64::consts::TAU / n as f64;
            let x = baseline / 2.0 + angle.cos();
            let y = 2.0 + angle.sin();
            let right = (x * x + y * y).sqrt();
            let left = ((x - baseline).powi(2) + y * y).sqrt();
            lines.push(format!("83,{left:.3},tag-{i}"));
            lines.push(format!("84,{right:.3},tag-{i}"));
        }
    }
    lines
}

fn config() -> PipelineConfig {
    PipelineConfig {
        anchor_baseline: 5.0,
        ..Default::default()
    }
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");

    for n in [1, 10, 100, 1000] {
        let lines = make_lines(n, 10);

        group.bench_function(format!("{n}_tags_sequential"), |b| {
            b.iter(|| {
                let mut pipeline = Pipeline::new(config()).unwrap();
                let mut out: Vec<PositionUpdate> = Vec::new();
                for line in &lines {
                    black_box(pipeline.ingest(line, &mut out));
                }
            });
        });

        group.bench_function(format!("{n}_tags_batch"), |b| {
            b.iter(|| {
                let mut pipeline = Pipeline::new(config()).unwrap();
                let mut out: Vec<PositionUpdate> = Vec::new();
                black_box(pipeline.ingest_batch(lines.as_slice(), &mut out));
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
