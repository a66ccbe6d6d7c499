//! Benchmarks for the D86 and point-count pipelines.
//! Run with: cargo bench -p lumen --bench analysis

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lumen::{analyze, Analysis, AnalysisConfig, ImageBuffer, PixelFormat, ThresholdMode};
use std::hint::black_box;

/// RGB image with Gaussian spots on a faint background.
fn synthetic_spots(width: usize, height: usize, num_spots: usize) -> Vec<u8> {
    let mut luma = vec![4.0f32; width * height];

    let sigma = 2.5f32;
    let radius = (sigma * 4.0).ceil() as i32;
    for i in 0..num_spots {
        let cx = ((i * 97 + 13) % width) as i32;
        let cy = ((i * 73 + 29) % height) as i32;
        let amplitude = 180.0 + (i % 5) as f32 * 15.0;

        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let x = (cx + dx) as usize;
                let y = (cy + dy) as usize;
                if x < width && y < height {
                    let r2 = (dx * dx + dy * dy) as f32;
                    luma[y * width + x] += amplitude * (-r2 / (2.0 * sigma * sigma)).exp();
                }
            }
        }
    }

    luma.iter()
        .flat_map(|&v| {
            let v = v.min(255.0) as u8;
            [v, v, v]
        })
        .collect()
}

fn analysis_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis");

    for &size in &[256usize, 1024] {
        let bytes = synthetic_spots(size, size, size / 8);
        let image = ImageBuffer::new(size, size, PixelFormat::Rgb8, &bytes)
            .expect("synthetic image has matching length");
        group.throughput(Throughput::Elements((size * size) as u64));

        let d86_config = AnalysisConfig {
            hx: size as f64,
            hy: size as f64,
            ..Default::default()
        };
        group.bench_with_input(BenchmarkId::new("d86", size), &image, |b, image| {
            b.iter(|| analyze(black_box(image), &d86_config, Analysis::D86))
        });

        let count_config = AnalysisConfig {
            blur_kernel: 5,
            threshold_mode: ThresholdMode::Otsu,
            ..Default::default()
        };
        group.bench_with_input(BenchmarkId::new("point_count", size), &image, |b, image| {
            b.iter(|| analyze(black_box(image), &count_config, Analysis::PointCount))
        });
    }

    group.finish();
}

criterion_group!(benches, analysis_benchmarks);
criterion_main!(benches);
