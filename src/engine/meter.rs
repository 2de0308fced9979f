use std::time::Duration;

/// Advisory load meter: block processing time over the block's real-time budget.
///
/// One-pole smoothing keeps the reading steady enough to display.
#[derive(Debug, Clone, Copy)]
pub struct CpuMeter {
    sample_rate: f32,
    smoothing: f32,
    load: f32,
}

impl CpuMeter {
    pub const DEFAULT_SMOOTHING: f32 = 0.03;

    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            smoothing: Self::DEFAULT_SMOOTHING,
            load: 0.0,
        }
    }

    /// Fold in one block that took `elapsed` to compute `frames` frames.
    #[inline]
    pub fn record(&mut self, elapsed: Duration, frames: usize) {
        if frames == 0 {
            return;
        }
        let budget = frames as f32 / self.sample_rate;
        let usage = elapsed.as_secs_f32() / budget;
        self.load += self.smoothing * (usage - self.load);
    }

    /// Smoothed load as a fraction (1.0 = the whole budget).
    pub fn load(&self) -> f32 {
        self.load
    }

    pub fn percent(&self) -> f32 {
        self.load * 100.0
    }

    pub fn reset(&mut self) {
        self.load = 0.0;
    }
}
