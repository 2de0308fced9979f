use std::f64::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Master Clock
============

The clock is a phase accumulator running at control rate (a few Hz) but
advanced once per audio sample. Every time the phase crosses 2π it wraps and
reports a tick, and a tick is what moves every sequencer forward by one step.

  phase_increment = 2π · frequency · multiplier / sample_rate

At 120 BPM (2 Hz) and 48 kHz that is one tick every 24000 samples. The phase
is kept in f64: an f32 accumulator near 2π only has ~5e-7 of resolution, which
turns into tens of samples of drift per tick at slow tempos.

The multiplier is picked from a fixed table of ratios so the tempo knob and the
rate knob stay independent:

    index   0    1   2   3   4   5   6   7   8   9   10
    ratio  /16  /8  /4  /3  /2  x1  x2  x3  x4  x8  x16
*/

/// Number of entries in the multiplier table.
pub const MULTIPLIER_COUNT: usize = 11;

const MULTIPLIERS: [f64; MULTIPLIER_COUNT] = [
    1.0 / 16.0,
    1.0 / 8.0,
    1.0 / 4.0,
    1.0 / 3.0,
    1.0 / 2.0,
    1.0,
    2.0,
    3.0,
    4.0,
    8.0,
    16.0,
];

const MULTIPLIER_LABELS: [&str; MULTIPLIER_COUNT] = [
    "/16", "/8", "/4", "/3", "/2", "", "x2", "x3", "x4", "x8", "x16",
];

/// Rational tempo multiplier, stored as an index into the fixed ratio table.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "u8", into = "u8"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockMultiplier(u8);

impl ClockMultiplier {
    pub const UNITY: ClockMultiplier = ClockMultiplier(5);

    /// Build from a raw table index, clamping out-of-range values to the table bounds.
    pub fn from_index(index: u8) -> Self {
        Self(index.min(MULTIPLIER_COUNT as u8 - 1))
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn ratio(self) -> f64 {
        MULTIPLIERS[self.0 as usize]
    }

    /// Short label for the display ("" for unity).
    pub fn label(self) -> &'static str {
        MULTIPLIER_LABELS[self.0 as usize]
    }
}

impl From<u8> for ClockMultiplier {
    fn from(index: u8) -> Self {
        Self::from_index(index)
    }
}

impl From<ClockMultiplier> for u8 {
    fn from(multiplier: ClockMultiplier) -> Self {
        multiplier.0
    }
}

impl Default for ClockMultiplier {
    fn default() -> Self {
        Self::UNITY
    }
}

pub struct Clock {
    frequency: f32,
    multiplier: ClockMultiplier,
    phase: f64,
    phase_increment: f64,
    sample_rate: f32,
}

impl Clock {
    /// Create a clock at `frequency` Hz with unity multiplier and zero phase.
    ///
    /// `frequency` must be positive; the clock does not guard against zero.
    pub fn new(frequency: f32, sample_rate: f32) -> Self {
        let mut clock = Self {
            frequency,
            multiplier: ClockMultiplier::UNITY,
            phase: 0.0,
            phase_increment: 0.0,
            sample_rate,
        };
        clock.update_increment();
        clock
    }

    /// Create a clock from a tempo in beats per minute.
    pub fn from_bpm(bpm: f32, sample_rate: f32) -> Self {
        Self::new(bpm / 60.0, sample_rate)
    }

    /// Advance by one sample. Returns true when the phase wrapped (a tick).
    #[inline]
    pub fn process(&mut self) -> bool {
        self.phase += self.phase_increment;
        if self.phase >= TAU {
            self.phase -= TAU;
            return true;
        }
        false
    }

    /// Non-finite frequencies are ignored.
    pub fn set_frequency(&mut self, frequency: f32) {
        if frequency.is_finite() {
            self.frequency = frequency;
            self.update_increment();
        }
    }

    /// Set the tempo in beats per minute (`frequency = bpm / 60`).
    pub fn set_bpm(&mut self, bpm: f32) {
        self.set_frequency(bpm / 60.0);
    }

    pub fn set_multiplier(&mut self, multiplier: ClockMultiplier) {
        self.multiplier = multiplier;
        self.update_increment();
    }

    /// Position the phase one increment before the wrap so the next `process()` ticks.
    pub fn set_phase_to_end(&mut self) {
        self.phase = TAU - self.phase_increment;
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn bpm(&self) -> f32 {
        self.frequency * 60.0
    }

    pub fn multiplier(&self) -> ClockMultiplier {
        self.multiplier
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn phase_increment(&self) -> f64 {
        self.phase_increment
    }

    fn update_increment(&mut self) {
        self.phase_increment =
            TAU * self.frequency as f64 * self.multiplier.ratio() / self.sample_rate as f64;
    }
}
