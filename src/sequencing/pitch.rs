use super::quantizer::{note_name, Quantizer, DEFAULT_NOTE, MAX_NOTE};
use super::scale::Scale;

/// Transpose range in semitones, either direction.
pub const MAX_TRANSPOSE: i8 = 12;

/// Fixed-length pitch pattern whose stored notes are always in-scale.
///
/// Each step keeps the raw note it was set to. The playable note is the raw
/// note shifted by the transpose and then quantized; it and its frequency are
/// cached per step so the audio context only ever reads an `f32`. Changing the
/// key, scale or transpose re-derives every step from its raw note.
#[derive(Debug, Clone)]
pub struct PitchSequencer {
    quantizer: Quantizer,
    transpose: i8,
    raw: Vec<u8>,
    notes: Vec<u8>,
    hertz: Vec<f32>,
    current: usize,
}

impl PitchSequencer {
    /// Create a sequencer with every step on C4.
    ///
    /// # Panics
    ///
    /// Panics if `steps` is zero.
    pub fn new(steps: usize) -> Self {
        Self::with_quantizer(steps, Quantizer::default())
    }

    /// # Panics
    ///
    /// Panics if `steps` is zero.
    pub fn with_quantizer(steps: usize, quantizer: Quantizer) -> Self {
        assert!(steps > 0, "a pitch sequencer needs at least one step");
        let mut seq = Self {
            quantizer,
            transpose: 0,
            raw: vec![DEFAULT_NOTE; steps],
            notes: vec![0; steps],
            hertz: vec![0.0; steps],
            current: 0,
        };
        seq.requantize();
        seq
    }

    #[inline]
    pub fn advance(&mut self) {
        self.current += 1;
        if self.current >= self.raw.len() {
            self.current = 0;
        }
    }

    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn set_current_step(&mut self, index: usize) {
        self.assert_index(index);
        self.current = index;
    }

    pub fn rewind_to_end(&mut self) {
        self.current = self.raw.len() - 1;
    }

    /// Store a raw note (clamped to 0..=87) on a step and quantize it.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn set_note(&mut self, index: usize, note: u8) {
        self.assert_index(index);
        self.raw[index] = note.min(MAX_NOTE);
        self.update_step(index);
    }

    /// Shift every step by `semitones` (clamped to ±12) before quantizing.
    pub fn set_transpose(&mut self, semitones: i8) {
        let semitones = semitones.clamp(-MAX_TRANSPOSE, MAX_TRANSPOSE);
        if semitones != self.transpose {
            self.transpose = semitones;
            self.requantize();
        }
    }

    pub fn set_key(&mut self, key: u8) {
        self.quantizer.set_key(key);
        self.requantize();
    }

    pub fn set_scale(&mut self, scale: Scale) {
        self.quantizer.set_scale(scale);
        self.requantize();
    }

    #[inline]
    pub fn current_hertz(&self) -> f32 {
        self.hertz[self.current]
    }

    pub fn current_note(&self) -> u8 {
        self.notes[self.current]
    }

    pub fn current_step(&self) -> usize {
        self.current
    }

    /// Quantized, transposed note of a step.
    pub fn note(&self, index: usize) -> u8 {
        self.assert_index(index);
        self.notes[index]
    }

    /// The note a step was set to, before transpose and quantization.
    pub fn raw_note(&self, index: usize) -> u8 {
        self.assert_index(index);
        self.raw[index]
    }

    pub fn hertz(&self, index: usize) -> f32 {
        self.assert_index(index);
        self.hertz[index]
    }

    pub fn step_name(&self, index: usize) -> &'static str {
        note_name(self.note(index))
    }

    pub fn notes(&self) -> &[u8] {
        &self.notes
    }

    pub fn quantizer(&self) -> &Quantizer {
        &self.quantizer
    }

    pub fn transpose(&self) -> i8 {
        self.transpose
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    fn requantize(&mut self) {
        for index in 0..self.raw.len() {
            self.update_step(index);
        }
    }

    fn update_step(&mut self, index: usize) {
        let shifted = (self.raw[index] as i16 + self.transpose as i16).max(0) as u8;
        let note = self.quantizer.quantize_note(shifted);
        self.notes[index] = note;
        self.hertz[index] = self.quantizer.note_to_hertz(note, false);
    }

    fn assert_index(&self, index: usize) {
        assert!(
            index < self.raw.len(),
            "step {index} out of range for a {}-step sequencer",
            self.raw.len()
        );
    }
}
