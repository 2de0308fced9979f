//! Real-world scenario benchmarks.
//!
//! A full engine block is what the audio callback pays for; the control
//! side is measured where it does real work (filter table setup, requantizing).

mod engine;

pub use engine::bench_engine;
