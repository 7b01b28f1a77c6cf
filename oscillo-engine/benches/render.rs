//! Criterion benchmarks for the render loop.
//!
//! Measures one 512-frame stereo block per waveform, the size a typical
//! device callback asks for. Run with: cargo bench --bench render

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use oscillo_engine::{SignalEngine, WaveformKind};
use std::hint::black_box;

const FRAMES: usize = 512;
const CHANNELS: usize = 2;

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_512_stereo");

    for kind in WaveformKind::ALL {
        let mut engine = SignalEngine::new(48_000.0).unwrap();
        engine.set_waveform(kind);
        let mut out = vec![0.0f32; FRAMES * CHANNELS];

        group.bench_with_input(BenchmarkId::from_parameter(kind), &kind, |bencher, _| {
            bencher.iter(|| {
                engine.render(black_box(&mut out), FRAMES, CHANNELS).unwrap();
                black_box(out[0])
            })
        });
    }

    group.finish();
}

/// Render while a control handle publishes a change before every block.
fn bench_render_with_updates(c: &mut Criterion) {
    let mut engine = SignalEngine::new(48_000.0).unwrap();
    let ctl = engine.control();
    let mut out = vec![0.0f32; FRAMES * CHANNELS];
    let mut f = 220.0f32;

    c.bench_function("render_512_stereo_with_update", |bencher| {
        bencher.iter(|| {
            f = if f > 880.0 { 220.0 } else { f * 1.01 };
            ctl.set_parameters(0.8, f);
            engine.render(black_box(&mut out), FRAMES, CHANNELS).unwrap();
            black_box(out[0])
        })
    });
}

criterion_group!(benches, bench_render, bench_render_with_updates);
criterion_main!(benches);
