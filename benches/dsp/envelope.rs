//! Benchmarks for the AD envelope generator.

use std::hint::black_box;

use cosmos_dsp::dsp::Envelope;
use criterion::{BenchmarkId, Criterion};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Attack phase (ramping up)
        let mut env = Envelope::ad(10.0, 10.0, SAMPLE_RATE);
        env.trigger();
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer));
            })
        });

        // Decay phase (ramping down)
        let mut env = Envelope::ad(0.001, 10.0, SAMPLE_RATE);
        env.trigger();
        for _ in 0..100 {
            env.process();
        }
        group.bench_with_input(BenchmarkId::new("decay", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer));
            })
        });

        // Retriggered every block
        let mut env = Envelope::ad(0.005, 0.05, SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("retrigger", size), &size, |b, _| {
            b.iter(|| {
                env.trigger();
                env.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
