//! Benchmarks for whole engine blocks.

use std::{collections::VecDeque, hint::black_box};

use cosmos_dsp::{
    dsp::{FilterRealization, Waveform},
    engine::{ControlMessage, Engine, EngineConfig},
    sequencing::Scale,
};
use criterion::{BenchmarkId, Criterion};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

/// Busy patch: every primary step on, fast tempo, short envelopes.
fn busy_engine(realization: FilterRealization) -> Engine {
    let config = EngineConfig::new(SAMPLE_RATE)
        .with_bpm(220.0)
        .with_waveform(Waveform::Saw)
        .with_filter(realization, 400.0, 3.0)
        .with_amp_envelope(0.002, 0.08)
        .with_filter_envelope(0.001, 0.05, 1.0);
    let mut engine = Engine::new(&config).expect("bench config is valid");
    let mut setup: VecDeque<ControlMessage> = (0..8)
        .map(ControlMessage::TogglePrimaryStep)
        .chain((0..8).map(|step| ControlMessage::SetNote {
            step,
            note: 30 + step * 5,
        }))
        .collect();
    engine.drain(&mut setup);
    engine.start();
    engine
}

pub fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/engine");

    for &size in BLOCK_SIZES {
        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        for (name, realization) in [
            ("block_direct", FilterRealization::Direct),
            ("block_table", FilterRealization::Table),
        ] {
            let mut engine = busy_engine(realization);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    engine.process_block(black_box(&mut left), black_box(&mut right));
                })
            });
        }

        // Interleaved stereo, as the audio callback sees it
        let mut engine = busy_engine(FilterRealization::Table);
        let mut interleaved = vec![0.0f32; size * 2];
        group.bench_with_input(BenchmarkId::new("interleaved", size), &size, |b, _| {
            b.iter(|| {
                engine.process_interleaved(black_box(&mut interleaved), 2);
            })
        });
    }

    // Control-rate work
    group.bench_function("build_engine_with_table", |b| {
        b.iter(|| black_box(busy_engine(FilterRealization::Table)))
    });

    let mut engine = busy_engine(FilterRealization::Direct);
    let mut scale = 0u8;
    group.bench_function("scale_change", |b| {
        b.iter(|| {
            scale = (scale + 1) % 12;
            engine.apply(ControlMessage::SetScale(Scale::from_index(scale)));
        })
    });

    group.finish();
}
