#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::error::EngineError;
use crate::{
    dsp::{ClockMultiplier, FilterRealization, Waveform},
    sequencing::{quantizer::DEFAULT_KEY, Scale},
    MAX_BLOCK_SIZE, MAX_STEPS,
};

/// What the audio path does while the transport is stopped.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopBehavior {
    /// Sequencing halts but sounding envelopes ring out.
    #[default]
    HoldTail,
    /// Output is forced to zero.
    Mute,
}

/// Settings for one envelope.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeConfig {
    pub attack: f32,
    pub decay: f32,
    pub scale: f32,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            attack: 0.01,
            decay: 1.0,
            scale: 1.0,
        }
    }
}

/// Startup configuration for an [`Engine`](super::Engine).
///
/// Everything here can also be changed at runtime through control messages,
/// except the sample rate, block size and step counts, which size the engine.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f32,
    /// Nominal frames per audio callback, used for the CPU budget.
    pub block_size: usize,

    pub primary_steps: usize,
    pub secondary_steps: usize,
    pub pitch_steps: usize,

    pub bpm: f32,
    pub multiplier: ClockMultiplier,

    pub key: u8,
    pub scale: Scale,
    pub waveform: Waveform,

    pub filter_realization: FilterRealization,
    pub filter_freq: f32,
    pub filter_q: f32,
    /// Cutoff offset in Hz at full envelope 2 output.
    pub filter_env_depth: f32,

    pub amp_envelope: EnvelopeConfig,
    pub filter_envelope: EnvelopeConfig,

    /// Fixed gain applied ahead of the filters.
    pub output_gain: f32,
    pub stop_behavior: StopBehavior,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            block_size: 256,
            primary_steps: 8,
            secondary_steps: 8,
            pitch_steps: 8,
            bpm: 120.0,
            multiplier: ClockMultiplier::UNITY,
            key: DEFAULT_KEY,
            scale: Scale::default(),
            waveform: Waveform::Saw,
            filter_realization: FilterRealization::Table,
            filter_freq: 1_200.0,
            filter_q: 1.0,
            filter_env_depth: 2_000.0,
            amp_envelope: EnvelopeConfig::default(),
            filter_envelope: EnvelopeConfig {
                attack: 0.01,
                decay: 0.4,
                scale: 1.0,
            },
            output_gain: 0.5,
            stop_behavior: StopBehavior::default(),
        }
    }
}

impl EngineConfig {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            ..Self::default()
        }
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Step counts for the primary, secondary and pitch tracks.
    pub fn with_steps(mut self, primary: usize, secondary: usize, pitch: usize) -> Self {
        self.primary_steps = primary;
        self.secondary_steps = secondary;
        self.pitch_steps = pitch;
        self
    }

    pub fn with_bpm(mut self, bpm: f32) -> Self {
        self.bpm = bpm;
        self
    }

    pub fn with_multiplier(mut self, multiplier: ClockMultiplier) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn with_key(mut self, key: u8, scale: Scale) -> Self {
        self.key = key;
        self.scale = scale;
        self
    }

    pub fn with_waveform(mut self, waveform: Waveform) -> Self {
        self.waveform = waveform;
        self
    }

    pub fn with_filter(mut self, realization: FilterRealization, freq: f32, q: f32) -> Self {
        self.filter_realization = realization;
        self.filter_freq = freq;
        self.filter_q = q;
        self
    }

    pub fn with_filter_env_depth(mut self, depth: f32) -> Self {
        self.filter_env_depth = depth;
        self
    }

    pub fn with_amp_envelope(mut self, attack: f32, decay: f32) -> Self {
        self.amp_envelope.attack = attack;
        self.amp_envelope.decay = decay;
        self
    }

    pub fn with_filter_envelope(mut self, attack: f32, decay: f32, scale: f32) -> Self {
        self.filter_envelope = EnvelopeConfig {
            attack,
            decay,
            scale,
        };
        self
    }

    pub fn with_stop_behavior(mut self, behavior: StopBehavior) -> Self {
        self.stop_behavior = behavior;
        self
    }

    /// Check the values that size the engine. Everything else is clamped on use.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(EngineError::InvalidSampleRate(self.sample_rate));
        }

        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(EngineError::BlockTooLarge {
                size: self.block_size,
                max: MAX_BLOCK_SIZE,
            });
        }

        for steps in [self.primary_steps, self.secondary_steps, self.pitch_steps] {
            if steps == 0 || steps > MAX_STEPS {
                return Err(EngineError::InvalidStepCount {
                    steps,
                    max: MAX_STEPS,
                });
            }
        }

        Ok(())
    }

    /// Parse a JSON config. Missing fields take their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "serde")]
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_json_str(&json)?;
        log::info!("loaded engine config from {}", path.display());
        Ok(config)
    }
}
