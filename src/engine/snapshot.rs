use crate::{
    dsp::{ClockMultiplier, Waveform},
    sequencing::{note_name, note_octave, Scale},
    MAX_STEPS,
};

/// Engine state published to the control context once per block.
///
/// Fixed-size and `Copy` so it can cross a ring buffer without allocating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSnapshot {
    pub playing: bool,
    pub bpm: f32,
    pub multiplier: ClockMultiplier,
    /// Smoothed block processing time as a percentage of the block budget.
    pub cpu_percent: f32,
    /// Blocks since the last clock tick, for step LED blinking.
    pub blocks_since_tick: u16,
    pub ticks: u64,

    pub primary_step: u8,
    pub secondary_step: u8,
    pub pitch_step: u8,
    pub primary_len: u8,
    pub secondary_len: u8,
    pub pitch_len: u8,
    pub primary_pattern: [bool; MAX_STEPS],
    pub secondary_pattern: [bool; MAX_STEPS],
    pub pitch_notes: [u8; MAX_STEPS],

    pub amp_env: f32,
    pub filter_env: f32,
    pub filter_freq: f32,
    pub filter_q: f32,
    pub osc_freq: f32,
    pub waveform: Waveform,
    pub key: u8,
    pub scale: Scale,
    pub transpose: i8,
    /// Absolute peak of the last block (both channels).
    pub peak: f32,
}

impl Default for EngineSnapshot {
    fn default() -> Self {
        Self {
            playing: false,
            bpm: 0.0,
            multiplier: ClockMultiplier::UNITY,
            cpu_percent: 0.0,
            blocks_since_tick: 0,
            ticks: 0,
            primary_step: 0,
            secondary_step: 0,
            pitch_step: 0,
            primary_len: 0,
            secondary_len: 0,
            pitch_len: 0,
            primary_pattern: [false; MAX_STEPS],
            secondary_pattern: [false; MAX_STEPS],
            pitch_notes: [0; MAX_STEPS],
            amp_env: 0.0,
            filter_env: 0.0,
            filter_freq: 0.0,
            filter_q: 0.0,
            osc_freq: 0.0,
            waveform: Waveform::Off,
            key: 0,
            scale: Scale::default(),
            transpose: 0,
            peak: 0.0,
        }
    }
}

impl EngineSnapshot {
    pub fn primary_steps(&self) -> &[bool] {
        &self.primary_pattern[..self.primary_len as usize]
    }

    pub fn secondary_steps(&self) -> &[bool] {
        &self.secondary_pattern[..self.secondary_len as usize]
    }

    pub fn pitch_steps(&self) -> &[u8] {
        &self.pitch_notes[..self.pitch_len as usize]
    }

    /// Display name of a pitch step, e.g. `"C#4"`.
    pub fn step_label(&self, step: usize) -> String {
        let note = self.pitch_notes[step];
        format!("{}{}", note_name(note), note_octave(note))
    }

    pub fn key_name(&self) -> &'static str {
        note_name(self.key)
    }
}
