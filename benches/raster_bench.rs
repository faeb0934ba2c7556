// Rasterizer Benchmarks
// Performance benchmarks for pixel addressing, line and circle drawing

use criterion::{criterion_group, criterion_main, Criterion};
use ssd1305::{draw_circle, draw_line, FrameBuffer};
use std::hint::black_box;

/// Benchmark single pixel writes across the whole panel
fn bench_set_pixel(c: &mut Criterion) {
    let mut group = c.benchmark_group("pixel");

    group.bench_function("fill_128x32", |b| {
        let mut fb = FrameBuffer::default();
        b.iter(|| {
            for y in 0..32 {
                for x in 0..128 {
                    fb.set_pixel(black_box(x), black_box(y), true);
                }
            }
            black_box(fb.as_slice());
        });
    });

    group.bench_function("clear_128x32", |b| {
        let mut fb = FrameBuffer::default();
        b.iter(|| {
            for y in 0..32 {
                for x in 0..128 {
                    fb.set_pixel(black_box(x), black_box(y), false);
                }
            }
            black_box(fb.as_slice());
        });
    });

    group.finish();
}

/// Benchmark line drawing for the three branches of the algorithm
fn bench_lines(c: &mut Criterion) {
    let mut group = c.benchmark_group("line");

    group.bench_function("vertical", |b| {
        let mut fb = FrameBuffer::default();
        b.iter(|| draw_line(&mut fb, black_box(64), 0, 64, black_box(31)));
    });

    group.bench_function("shallow_full_diagonal", |b| {
        let mut fb = FrameBuffer::default();
        b.iter(|| draw_line(&mut fb, black_box(0), 0, 127, black_box(31)));
    });

    group.bench_function("steep", |b| {
        let mut fb = FrameBuffer::default();
        b.iter(|| draw_line(&mut fb, black_box(60), 0, 70, black_box(31)));
    });

    group.finish();
}

/// Benchmark circle outlines of increasing radius
fn bench_circles(c: &mut Criterion) {
    let mut group = c.benchmark_group("circle");

    for radius in [4, 15, 60] {
        group.bench_function(format!("radius_{}", radius), |b| {
            let mut fb = FrameBuffer::default();
            b.iter(|| draw_circle(&mut fb, 64, 16, black_box(radius)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_set_pixel, bench_lines, bench_circles);
criterion_main!(benches);
