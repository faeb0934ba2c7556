// Flush Benchmarks
// Performance benchmarks for streaming the frame buffer to the controller

use criterion::{criterion_group, criterion_main, Criterion};
use ssd1305::sim::{RecordingTransport, SimDelay, SimPin};
use ssd1305::{
    BusConfig, BusError, DeviceId, DisplayConfig, FlushLayout, FlushStream, FrameBuffer, Framing,
    Ssd1305, Transport,
};
use std::hint::black_box;

/// Transport that discards every byte
struct NullTransport;

impl Transport for NullTransport {
    fn init(&mut self, _config: &BusConfig) -> Result<(), BusError> {
        Ok(())
    }

    fn transfer(&mut self, _device: DeviceId, byte: u8, framing: Framing) -> Result<(), BusError> {
        black_box((byte, framing));
        Ok(())
    }
}

/// Benchmark generating the wire byte stream on its own
fn bench_flush_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("flush_stream");

    group.bench_function("default_layout", |b| {
        let mut fb = FrameBuffer::default();
        for x in 0..128 {
            fb.set_pixel(x, x % 32, true);
        }

        b.iter(|| {
            let sum: u32 = FlushStream::new(&fb, FlushLayout::default())
                .map(|(byte, _)| byte as u32)
                .sum();
            black_box(sum);
        });
    });

    group.finish();
}

/// Benchmark full driver flushes
fn bench_flush(c: &mut Criterion) {
    let mut group = c.benchmark_group("flush");

    group.bench_function("dirty_frame", |b| {
        let mut display = Ssd1305::new(
            NullTransport,
            SimPin::new(),
            SimPin::new(),
            &mut SimDelay::new(),
            &DisplayConfig::default(),
        )
        .expect("controller init");

        b.iter(|| {
            display.draw_circle(64, 16, 12);
            black_box(display.flush().expect("flush"));
        });
    });

    group.bench_function("clean_frame", |b| {
        let mut display = Ssd1305::new(
            NullTransport,
            SimPin::new(),
            SimPin::new(),
            &mut SimDelay::new(),
            &DisplayConfig::default(),
        )
        .expect("controller init");

        b.iter(|| black_box(display.flush().expect("flush")));
    });

    group.bench_function("recorded_frame", |b| {
        let dc = SimPin::new();
        let transport = RecordingTransport::new().with_dc_probe(dc.probe());
        let mut display = Ssd1305::new(
            transport,
            dc,
            SimPin::new(),
            &mut SimDelay::new(),
            &DisplayConfig::default(),
        )
        .expect("controller init");

        b.iter(|| {
            display.transport_mut().clear();
            display.set_pixel(0, 0, true);
            black_box(display.flush().expect("flush"));
        });
    });

    group.finish();
}

criterion_group!(benches, bench_flush_stream, bench_flush);
criterion_main!(benches);
