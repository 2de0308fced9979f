//! Benchmarks for oscillator waveform generation.

use std::hint::black_box;

use cosmos_dsp::dsp::{Oscillator, Waveform};
use criterion::{BenchmarkId, Criterion};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for waveform in [Waveform::Sine, Waveform::Triangle, Waveform::Saw] {
            let mut osc = Oscillator::new(SAMPLE_RATE).with_waveform(waveform);
            osc.set_freq(440.0);
            osc.set_amp(1.0);
            group.bench_with_input(BenchmarkId::new(waveform.name(), size), &size, |b, _| {
                b.iter(|| {
                    osc.render(black_box(&mut buffer));
                })
            });
        }

        // Sine with a retune every block - pays for the resonator reseed
        let mut osc = Oscillator::new(SAMPLE_RATE);
        osc.set_amp(1.0);
        let mut toggle = false;
        group.bench_with_input(BenchmarkId::new("sine_retune", size), &size, |b, _| {
            b.iter(|| {
                toggle = !toggle;
                osc.set_freq(if toggle { 220.0 } else { 330.0 });
                osc.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
