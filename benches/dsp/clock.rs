//! Benchmarks for the master clock.

use std::hint::black_box;

use cosmos_dsp::dsp::{Clock, ClockMultiplier};
use criterion::{BenchmarkId, Criterion};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_clock(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/clock");

    for &size in BLOCK_SIZES {
        // x16 at 220 BPM: the fastest tick rate the panel allows
        let mut clock = Clock::from_bpm(220.0, SAMPLE_RATE);
        clock.set_multiplier(ClockMultiplier::from_index(10));
        group.bench_with_input(BenchmarkId::new("process", size), &size, |b, _| {
            b.iter(|| {
                let mut ticks = 0u32;
                for _ in 0..size {
                    ticks += clock.process() as u32;
                }
                black_box(ticks)
            })
        });
    }

    group.finish();
}
