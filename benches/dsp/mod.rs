//! Benchmarks for low-level DSP primitives.

mod clock;
mod envelope;
mod filter;
mod oscillator;

pub use clock::bench_clock;
pub use envelope::bench_envelope;
pub use filter::bench_filter;
pub use oscillator::bench_oscillator;
