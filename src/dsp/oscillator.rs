use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Voice Oscillator
================

One phase accumulator in [0, 1) drives every waveform:

    phase_increment = frequency / sample_rate

Sine
----
Instead of calling sin() per sample the sine uses the digital resonator
recurrence (two multiplies, no transcendental call):

    y[n] = 2·cos(w)·y[n-1] - y[n-2]        w = 2π·f/sr

Seeding y[n-1] = sin(θ - w) and y[n-2] = sin(θ - 2w) makes the next output
sin(θ). In f32 the recurrence runs at a slightly different rate than the
phase accumulator (2·cos(w) is rounded), so after a long note the two no
longer agree. On a frequency change the angle is therefore read back from the
resonator itself:

    cos(w)  = coeff / 2
    cos(θ1) = (y[n-1]·cos(w) - y[n-2]) / sin(w)       θ1 = angle of y[n-1]
    θ1      = atan2(y[n-1], cos(θ1))

The accumulator is moved to θ1 + w and the resonator is reseeded from there
at unit amplitude, so a pitch change bends the running sine instead of
jumping.

Triangle
--------
Folded saw: 2·(|2·phase - 1| - 0.5). Symmetric around phase 0.5, so
triangle(p) == triangle(1 - p).

Sawtooth (polyBLEP)
-------------------
The naive ramp 2·phase - 1 jumps from +1 to -1 at the wrap, and that step
aliases badly. polyBLEP subtracts a two-sample polynomial residual around the
discontinuity:

    t < dt        : u = t/dt,       blep = 2u - u² - 1
    t > 1 - dt    : u = (t - 1)/dt, blep = u² + 2u + 1
    otherwise     : 0

The residual is written for a phase normalised to [0, 1) with dt in the same
units. Feeding it a [0, 2π) phase changes its magnitude and brings the
aliasing back, so the accumulator stays in [0, 1).
*/

/// Waveform selection. `Off` is the silent fallback for unknown mode indices.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Saw,
    Off,
}

impl Waveform {
    /// Map a raw mode index (0 = sine, 1 = triangle, 2 = saw) to a waveform.
    /// Anything else selects `Off`.
    pub fn from_index(index: u8) -> Self {
        match index {
            0 => Waveform::Sine,
            1 => Waveform::Triangle,
            2 => Waveform::Saw,
            _ => Waveform::Off,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Triangle => "tri",
            Waveform::Saw => "saw",
            Waveform::Off => "off",
        }
    }
}

/// Polynomial band-limited step residual for a [0, 1) phase `t` and increment `dt`.
#[inline]
pub fn poly_blep(t: f32, dt: f32) -> f32 {
    if t < dt {
        let u = t / dt;
        u + u - u * u - 1.0
    } else if t > 1.0 - dt {
        let u = (t - 1.0) / dt;
        u * u + u + u + 1.0
    } else {
        0.0
    }
}

#[inline]
pub fn triangle(phase: f32) -> f32 {
    2.0 * ((2.0 * phase - 1.0).abs() - 0.5)
}

#[inline]
pub fn sawtooth(phase: f32, dt: f32) -> f32 {
    (2.0 * phase - 1.0) - poly_blep(phase, dt)
}

pub struct Oscillator {
    sample_rate: f32,
    frequency: f32,
    amplitude: f32,
    waveform: Waveform,
    phase: f32,
    phase_increment: f32,

    // Resonator state for the sine recurrence
    coeff: f32,
    y1: f32,
    y2: f32,
}

impl Oscillator {
    pub fn new(sample_rate: f32) -> Self {
        let mut osc = Self {
            sample_rate,
            frequency: 440.0,
            amplitude: 0.5,
            waveform: Waveform::Sine,
            phase: 0.0,
            phase_increment: 0.0,
            coeff: 0.0,
            y1: 0.0,
            y2: 0.0,
        };
        osc.update_increment();
        osc.seed_sine();
        osc
    }

    pub fn with_waveform(mut self, waveform: Waveform) -> Self {
        self.set_waveform(waveform);
        self
    }

    /// Non-finite frequencies are ignored.
    pub fn set_freq(&mut self, frequency: f32) {
        if !frequency.is_finite() {
            return;
        }
        if self.waveform == Waveform::Sine {
            self.sync_phase_to_resonator();
        }
        self.frequency = frequency;
        self.update_increment();
        self.seed_sine();
    }

    /// Non-finite amplitudes are ignored.
    pub fn set_amp(&mut self, amplitude: f32) {
        if amplitude.is_finite() {
            self.amplitude = amplitude;
        }
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        if waveform == Waveform::Sine && self.waveform != Waveform::Sine {
            self.seed_sine();
        }
        self.waveform = waveform;
    }

    /// Produce one stereo frame. Both channels carry the same signal.
    #[inline]
    pub fn process(&mut self) -> (f32, f32) {
        let out = match self.waveform {
            Waveform::Sine => {
                let y0 = self.coeff * self.y1 - self.y2;
                self.y2 = self.y1;
                self.y1 = y0;
                y0
            }
            Waveform::Triangle => triangle(self.phase),
            Waveform::Saw => sawtooth(self.phase, self.phase_increment),
            Waveform::Off => 0.0,
        };

        self.phase += self.phase_increment;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        let out = out * self.amplitude;
        (out, out)
    }

    /// Render a mono block (left channel) into `buffer`.
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process().0;
        }
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    fn update_increment(&mut self) {
        self.phase_increment = self.frequency / self.sample_rate;
    }

    // Point the accumulator at the resonator's next angle.
    fn sync_phase_to_resonator(&mut self) {
        let cos_w = 0.5 * self.coeff;
        let sin_w = (1.0 - cos_w * cos_w).max(0.0).sqrt();
        if sin_w < 1e-6 {
            return;
        }
        let cos_theta = (self.y1 * cos_w - self.y2) / sin_w;
        let theta = self.y1.atan2(cos_theta) + sin_w.atan2(cos_w);
        let phase = (theta / TAU).rem_euclid(1.0);
        // rem_euclid can round up to exactly 1.0
        self.phase = if phase < 1.0 { phase } else { 0.0 };
    }

    // Next sine output becomes sin(2π·phase).
    fn seed_sine(&mut self) {
        let w = TAU * self.phase_increment;
        let theta = TAU * self.phase;
        self.coeff = 2.0 * w.cos();
        self.y1 = (theta - w).sin();
        self.y2 = (theta - 2.0 * w).sin();
    }
}
