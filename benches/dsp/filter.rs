//! Benchmarks for the low-pass biquad, direct vs table coefficients.

use std::{hint::black_box, sync::Arc};

use cosmos_dsp::dsp::{CoefficientTable, Filter};
use criterion::{BenchmarkId, Criterion};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");
    let table = Arc::new(CoefficientTable::new(SAMPLE_RATE));

    for &size in BLOCK_SIZES {
        // Test signal (sawtooth-like ramp)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();
        let mut buffer = input.clone();

        // Static cutoff: coefficients never change
        let mut filter = Filter::new(SAMPLE_RATE);
        filter.set_freq(1_000.0);
        filter.set_q(2.0);
        group.bench_with_input(BenchmarkId::new("static", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer));
            })
        });

        // Per-sample sweep, the envelope-driven case
        for (name, mut filter) in [
            ("sweep_direct", Filter::new(SAMPLE_RATE)),
            ("sweep_table", Filter::with_table(Arc::clone(&table))),
        ] {
            filter.set_freq(200.0);
            filter.set_q(2.0);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    for (i, &x) in input.iter().enumerate() {
                        filter.add_freq(i as f32 * 8.0);
                        buffer[i] = filter.process(black_box(x));
                    }
                })
            });
        }
    }

    group.finish();
}
