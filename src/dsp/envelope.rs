#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Percussive AD Envelope
======================

A linear attack/decay generator with no sustain stage: every trigger runs
the full shape and the envelope returns to idle on its own.

  Level
    1.0 ┐    ╱╲
        │   ╱  ╲
        │  ╱    ╲
    0.0 └─╱──────╲────→ Time
         Attack Decay

The state machine is   Idle ──trigger──→ Attack ──level=1──→ Decay ──level≈0──→ Idle

Time, not level, is integrated: each sample adds 1/sample_rate to a stage
timer, and the level is the timer divided by the stage length.

    attack: level = timer / attack_time
    decay:  level = 1 - timer / decay_time

Retriggering
------------
Restarting the attack at zero while the envelope is still sounding produces
an audible click. Instead a retrigger seeds the timer with level·attack_time,
so the attack ramp continues from wherever the output currently is.
*/

pub const MIN_STAGE_TIME: f32 = 0.001;
pub const MAX_STAGE_TIME: f32 = 10.0;

/// Decay ends (and snaps to zero) once the level falls to this value.
const IDLE_THRESHOLD: f32 = 1e-4;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Idle,
    Attack,
    Decay,
}

pub struct Envelope {
    attack_time: f32,
    decay_time: f32,
    // Output multiplier in [0, 1], applied after the state machine
    scale: f32,

    stage: EnvelopeStage,
    stage_elapsed: f32,
    time_step: f32,
    level: f32,
}

impl Envelope {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            attack_time: 0.01,
            decay_time: 1.0,
            scale: 1.0,
            stage: EnvelopeStage::Idle,
            stage_elapsed: 0.0,
            time_step: 1.0 / sample_rate,
            level: 0.0,
        }
    }

    pub fn ad(attack: f32, decay: f32, sample_rate: f32) -> Self {
        let mut env = Self::new(sample_rate);
        env.set_attack(attack);
        env.set_decay(decay);
        env
    }

    /// Attack time in seconds, clamped to [0.001, 10]. Non-finite values are ignored.
    pub fn set_attack(&mut self, seconds: f32) {
        if seconds.is_finite() {
            self.attack_time = seconds.clamp(MIN_STAGE_TIME, MAX_STAGE_TIME);
        }
    }

    /// Decay time in seconds, clamped to [0.001, 10]. Non-finite values are ignored.
    pub fn set_decay(&mut self, seconds: f32) {
        if seconds.is_finite() {
            self.decay_time = seconds.clamp(MIN_STAGE_TIME, MAX_STAGE_TIME);
        }
    }

    pub fn set_scale(&mut self, scale: f32) {
        if scale.is_finite() {
            self.scale = scale.clamp(0.0, 1.0);
        }
    }

    /// Start (or restart) the attack stage.
    pub fn trigger(&mut self) {
        self.stage_elapsed = if self.level == 0.0 {
            0.0
        } else {
            self.level * self.attack_time
        };
        self.stage = EnvelopeStage::Attack;
    }

    /// Advance one sample and return the scaled output.
    #[inline]
    pub fn process(&mut self) -> f32 {
        match self.stage {
            EnvelopeStage::Idle => {}
            EnvelopeStage::Attack => {
                self.stage_elapsed += self.time_step;
                self.level = self.stage_elapsed / self.attack_time;
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage_elapsed = 0.0;
                    self.stage = EnvelopeStage::Decay;
                }
            }
            EnvelopeStage::Decay => {
                self.stage_elapsed += self.time_step;
                self.level = 1.0 - self.stage_elapsed / self.decay_time;
                if self.level <= IDLE_THRESHOLD {
                    self.level = 0.0;
                    self.stage = EnvelopeStage::Idle;
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level * self.scale
    }

    /// Render a block of envelope values into the buffer.
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process();
        }
    }

    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeStage::Idle
    }

    pub fn reset(&mut self) {
        self.stage = EnvelopeStage::Idle;
        self.stage_elapsed = 0.0;
        self.level = 0.0;
    }

    /// Unscaled level (0.0 to 1.0)
    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    pub fn stage_elapsed(&self) -> f32 {
        self.stage_elapsed
    }

    pub fn attack(&self) -> f32 {
        self.attack_time
    }

    pub fn decay(&self) -> f32 {
        self.decay_time
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1_000.0;

    #[test]
    fn attack_rises_and_decay_falls_monotonically() {
        let mut env = Envelope::ad(0.05, 0.2, SAMPLE_RATE);
        env.trigger();

        let mut last = 0.0;
        let mut stage = env.stage();
        let mut saw_decay = false;
        for _ in 0..1_000 {
            let out = env.process();
            match env.stage() {
                EnvelopeStage::Attack => assert!(out >= last, "attack fell: {last} -> {out}"),
                EnvelopeStage::Decay if stage == EnvelopeStage::Decay => {
                    saw_decay = true;
                    assert!(out <= last, "decay rose: {last} -> {out}")
                }
                _ => {}
            }
            last = out;
            stage = env.stage();
            if stage == EnvelopeStage::Idle {
                break;
            }
        }

        assert!(saw_decay);
        assert_eq!(env.stage(), EnvelopeStage::Idle);
        assert_eq!(env.level(), 0.0, "idle entry must land on exactly zero");
    }

    #[test]
    fn peak_reaches_exactly_one() {
        let mut env = Envelope::ad(0.01, 0.5, SAMPLE_RATE);
        env.trigger();
        let peak = (0..20).map(|_| env.process()).fold(0.0f32, f32::max);
        assert_eq!(peak, 1.0);
        assert_eq!(env.stage(), EnvelopeStage::Decay);
    }

    #[test]
    fn retrigger_resumes_from_current_level() {
        let mut env = Envelope::ad(1.0, 1.0, SAMPLE_RATE);
        env.trigger();
        while env.level() < 0.5 {
            env.process();
        }
        let level = env.level();
        env.trigger();

        assert_eq!(env.stage(), EnvelopeStage::Attack);
        assert!(
            (env.stage_elapsed() - level * 1.0).abs() < 1e-6,
            "expected timer seeded to {}, got {}",
            level,
            env.stage_elapsed()
        );
        // Next sample continues upward instead of restarting near zero.
        assert!(env.process() > level);
    }

    #[test]
    fn trigger_from_idle_starts_at_zero() {
        let mut env = Envelope::ad(1.0, 1.0, SAMPLE_RATE);
        env.trigger();
        assert_eq!(env.stage_elapsed(), 0.0);
        let first = env.process();
        assert!((first - 0.001).abs() < 1e-6);
    }

    #[test]
    fn output_is_zero_only_while_idle() {
        let mut env = Envelope::ad(0.002, 0.005, SAMPLE_RATE);
        assert_eq!(env.process(), 0.0);
        env.trigger();
        loop {
            let out = env.process();
            if env.is_active() {
                assert!(out > 0.0);
            } else {
                assert_eq!(out, 0.0);
                break;
            }
        }
    }

    #[test]
    fn times_are_clamped() {
        let mut env = Envelope::new(SAMPLE_RATE);
        env.set_attack(0.0);
        env.set_decay(100.0);
        assert_eq!(env.attack(), MIN_STAGE_TIME);
        assert_eq!(env.decay(), MAX_STAGE_TIME);
    }

    #[test]
    fn non_finite_parameters_are_ignored() {
        let mut env = Envelope::ad(0.005, 0.02, SAMPLE_RATE);
        env.set_attack(f32::NAN);
        env.set_decay(f32::INFINITY);
        env.set_scale(f32::NAN);
        assert_eq!(env.attack(), 0.005);
        assert_eq!(env.decay(), 0.02);
        assert_eq!(env.scale(), 1.0);

        env.trigger();
        for _ in 0..100 {
            let out = env.process();
            assert!((0.0..=1.0).contains(&out), "out of range: {out}");
        }
    }

    #[test]
    fn degenerate_times_give_single_sample_stages() {
        let mut env = Envelope::ad(0.0, 0.0, SAMPLE_RATE);
        env.trigger();
        assert_eq!(env.process(), 1.0);
        assert_eq!(env.process(), 0.0);
        assert_eq!(env.stage(), EnvelopeStage::Idle);
    }

    #[test]
    fn scale_applies_to_output_only() {
        let mut env = Envelope::ad(0.001, 1.0, SAMPLE_RATE);
        env.set_scale(0.5);
        env.trigger();
        let out = env.process();
        assert_eq!(env.level(), 1.0);
        assert_eq!(out, 0.5);
    }
}
