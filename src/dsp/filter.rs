use std::f32::consts::TAU;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Resonant Low-Pass Biquad
========================

A second-order IIR low-pass using the Audio EQ Cookbook design:

    w0    = 2π · freq / sample_rate
    alpha = sin(w0) / (2 · Q)

    b0 = b2 = ((1 - cos w0) / 2) / a0
    b1 =       (1 - cos w0)      / a0
    a1 =       (-2 · cos w0)     / a0
    a2 =       (1 - alpha)       / a0        a0 = 1 + alpha

    y[n] = b0·x[n] + b1·x[n-1] + b2·x[n-2] - a1·y[n-1] - a2·y[n-2]

Cutoff and Q are swept continuously by the filter envelope, which would mean
a cos/sin pair every sample. Two realizations are offered:

  Direct   recompute the coefficients whenever freq or Q changes
  Table    interpolate between cells of a precomputed 512 × 32 grid,
           with no transcendental calls beyond two logarithms

Grid layout
-----------
Both axes are spaced logarithmically: frequency over [20, min(20000,
0.49·sample_rate)] Hz (a ~1.36% step at 48 kHz), Q over [0.2, 5.0] (a ~11%
step). Cells are stored flat as [q_index][freq_index].

A lookup blends the four cells around (freq, Q) bilinearly:

    q0 ┤ c00 ──fx── c01        low  = lerp(c00, c01, fx)
       │      ·                high = lerp(c10, c11, fx)
    q1 ┤ c10 ──fx── c11        out  = lerp(low, high, qx)

Nearest-cell snapping is not enough here: one Q row near 0.2 is ~40% of the
value, and the first samples of the impulse response follow Q closely. With
interpolation the response stays well inside 1% of the direct one.
*/

pub const MIN_FREQ: f32 = 20.0;
pub const MAX_FREQ: f32 = 20_000.0;
pub const MIN_Q: f32 = 0.2;
pub const MAX_Q: f32 = 5.0;

pub const TABLE_FREQ_STEPS: usize = 512;
pub const TABLE_Q_STEPS: usize = 32;

/// Cutoffs are kept below this fraction of the sample rate.
const NYQUIST_GUARD: f32 = 0.49;

/// Normalized biquad coefficients (a0 folded in).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coefficients {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

impl Coefficients {
    pub fn lowpass(freq: f32, q: f32, sample_rate: f32) -> Self {
        let freq = freq.min(sample_rate * NYQUIST_GUARD);

        let w0 = TAU * freq / sample_rate;
        let cos_w0 = w0.cos();
        let alpha = w0.sin() / (2.0 * q);

        let a0 = 1.0 + alpha;
        let b1 = (1.0 - cos_w0) / a0;

        Self {
            b0: b1 * 0.5,
            b1,
            b2: b1 * 0.5,
            a1: (-2.0 * cos_w0) / a0,
            a2: (1.0 - alpha) / a0,
        }
    }

    #[inline]
    fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            b0: self.b0 + (other.b0 - self.b0) * t,
            b1: self.b1 + (other.b1 - self.b1) * t,
            b2: self.b2 + (other.b2 - self.b2) * t,
            a1: self.a1 + (other.a1 - self.a1) * t,
            a2: self.a2 + (other.a2 - self.a2) * t,
        }
    }
}

/// Point `index` of a log-spaced grid of `steps` points over [lo, hi].
fn grid_point(lo: f32, hi: f32, steps: usize, index: usize) -> f32 {
    let t = index as f32 / (steps - 1) as f32;
    lo * (hi / lo).powf(t)
}

/// Lower grid index around `x` and the fractional distance to the next point.
#[inline]
fn grid_position(x: f32, lo: f32, hi: f32, steps: usize) -> (usize, f32) {
    let x = x.clamp(lo, hi);
    let t = (x / lo).ln() / (hi / lo).ln() * (steps - 1) as f32;
    let index = (t as usize).min(steps - 2);
    (index, (t - index as f32).clamp(0.0, 1.0))
}

/// Precomputed low-pass coefficients over the frequency × Q grid.
///
/// Built once at startup (it allocates) and shared read-only between filters.
pub struct CoefficientTable {
    sample_rate: f32,
    max_freq: f32,
    cells: Vec<Coefficients>,
}

impl CoefficientTable {
    pub fn new(sample_rate: f32) -> Self {
        let max_freq = MAX_FREQ.min(sample_rate * NYQUIST_GUARD).max(2.0 * MIN_FREQ);
        let mut cells = Vec::with_capacity(TABLE_Q_STEPS * TABLE_FREQ_STEPS);
        for q_index in 0..TABLE_Q_STEPS {
            let q = Self::q_at(q_index);
            for freq_index in 0..TABLE_FREQ_STEPS {
                let freq = grid_point(MIN_FREQ, max_freq, TABLE_FREQ_STEPS, freq_index);
                cells.push(Coefficients::lowpass(freq, q, sample_rate));
            }
        }
        Self {
            sample_rate,
            max_freq,
            cells,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Top of the frequency axis.
    pub fn max_freq(&self) -> f32 {
        self.max_freq
    }

    /// Grid frequency for a column index.
    pub fn freq_at(&self, index: usize) -> f32 {
        grid_point(MIN_FREQ, self.max_freq, TABLE_FREQ_STEPS, index)
    }

    /// Grid Q for a row index.
    pub fn q_at(index: usize) -> f32 {
        grid_point(MIN_Q, MAX_Q, TABLE_Q_STEPS, index)
    }

    #[inline]
    pub fn cell(&self, q_index: usize, freq_index: usize) -> Coefficients {
        self.cells[q_index * TABLE_FREQ_STEPS + freq_index]
    }

    /// Bilinear blend of the four cells around (`freq`, `q`), both clamped to the grid.
    #[inline]
    pub fn interpolate(&self, freq: f32, q: f32) -> Coefficients {
        let (f0, fx) = grid_position(freq, MIN_FREQ, self.max_freq, TABLE_FREQ_STEPS);
        let (q0, qx) = grid_position(q, MIN_Q, MAX_Q, TABLE_Q_STEPS);

        let low = self.cell(q0, f0).lerp(self.cell(q0, f0 + 1), fx);
        let high = self.cell(q0 + 1, f0).lerp(self.cell(q0 + 1, f0 + 1), fx);
        low.lerp(high, qx)
    }
}

/// Selects how the filter derives coefficients.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterRealization {
    Direct,
    Table,
}

enum CoefficientSource {
    Direct,
    Table(Arc<CoefficientTable>),
}

pub struct Filter {
    sample_rate: f32,
    source: CoefficientSource,

    base_freq: f32,
    freq_offset: f32,
    q: f32,

    // Parameters the current coefficients were derived from
    effective_freq: f32,
    effective_q: f32,
    coeffs: Coefficients,

    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Filter {
    /// Low-pass computing coefficients directly on every parameter change.
    pub fn new(sample_rate: f32) -> Self {
        Self::with_source(sample_rate, CoefficientSource::Direct)
    }

    /// Low-pass reading coefficients from a shared lookup table.
    pub fn with_table(table: Arc<CoefficientTable>) -> Self {
        let sample_rate = table.sample_rate();
        Self::with_source(sample_rate, CoefficientSource::Table(table))
    }

    fn with_source(sample_rate: f32, source: CoefficientSource) -> Self {
        let mut filter = Self {
            sample_rate,
            source,
            base_freq: MAX_FREQ,
            freq_offset: 0.0,
            q: std::f32::consts::FRAC_1_SQRT_2,
            effective_freq: 0.0,
            effective_q: 0.0,
            coeffs: Coefficients::default(),
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        };
        filter.update_coefficients();
        filter
    }

    pub fn realization(&self) -> FilterRealization {
        match self.source {
            CoefficientSource::Direct => FilterRealization::Direct,
            CoefficientSource::Table(_) => FilterRealization::Table,
        }
    }

    /// Set the base cutoff, clamped to [20, 20000] Hz. Non-finite values are ignored.
    pub fn set_freq(&mut self, freq: f32) {
        if freq.is_finite() {
            self.base_freq = freq.clamp(MIN_FREQ, MAX_FREQ);
            self.update_coefficients();
        }
    }

    /// Set resonance, clamped to [0.2, 5.0]. Non-finite values are ignored.
    pub fn set_q(&mut self, q: f32) {
        if q.is_finite() {
            self.q = q.clamp(MIN_Q, MAX_Q);
            self.update_coefficients();
        }
    }

    /// Modulation input: cutoff becomes `base + delta` (not cumulative).
    #[inline]
    pub fn add_freq(&mut self, delta: f32) {
        if delta.is_finite() && delta != self.freq_offset {
            self.freq_offset = delta;
            self.update_coefficients();
        }
    }

    #[inline]
    pub fn process(&mut self, x0: f32) -> f32 {
        let c = &self.coeffs;
        let y0 = c.b0 * x0 + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = x0;
        self.y2 = self.y1;
        self.y1 = y0;

        y0
    }

    /// Filter `buffer` in place.
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }

    pub fn freq(&self) -> f32 {
        self.base_freq
    }

    pub fn q(&self) -> f32 {
        self.q
    }

    /// Cutoff including the modulation offset.
    pub fn effective_freq(&self) -> f32 {
        self.effective_freq
    }

    pub fn coefficients(&self) -> Coefficients {
        self.coeffs
    }

    fn update_coefficients(&mut self) {
        let freq = (self.base_freq + self.freq_offset).clamp(MIN_FREQ, MAX_FREQ);
        let q = self.q;
        if freq == self.effective_freq && q == self.effective_q {
            return;
        }
        self.effective_freq = freq;
        self.effective_q = q;

        self.coeffs = match &self.source {
            CoefficientSource::Direct => Coefficients::lowpass(freq, q, self.sample_rate),
            CoefficientSource::Table(table) => table.interpolate(freq, q),
        };
    }
}
