//! Low-level DSP primitives driven by the engine one sample at a time.
//!
//! These components are allocation-free and realtime-safe once constructed.
//! Every parameter setter clamps to its documented range instead of failing,
//! so the control side can forward raw knob values without validation.

/// Phase-accumulator master clock with a rational tempo multiplier.
pub mod clock;
/// Percussive attack/decay envelope generator.
pub mod envelope;
/// Resonant low-pass biquad with direct and table-driven coefficients.
pub mod filter;
/// Sine, triangle and band-limited sawtooth oscillator.
pub mod oscillator;

pub use clock::{Clock, ClockMultiplier};
pub use envelope::{Envelope, EnvelopeStage};
pub use filter::{CoefficientTable, Filter, FilterRealization};
pub use oscillator::{Oscillator, Waveform};
