use super::scale::Scale;

/*
Note Numbering
==============

Notes are counted from the lowest key of an 88-key piano, so note 0 is A0
(MIDI 21) and note 87 is C8 (MIDI 108). Names follow the same origin:

    index  0  1  2  3  4  5  6  7  8  9  10 11
    name   A  A# B  C  C# D  D# E  F  F# G  G#

A key is one of those twelve indices; key 3 is C.

    hz = 440 · 2^((note + 21 - 69) / 12)

Quantization
------------
Walk upward from the requested note until (note - key) mod 12 lands on a
scale degree. The root is in every scale, so the walk takes at most eleven
steps and the result is never below the input.
*/

/// Highest raw note reachable from the panel (C8).
pub const MAX_NOTE: u8 = 87;
/// Default step pitch (C4).
pub const DEFAULT_NOTE: u8 = 39;
/// Key index of C.
pub const DEFAULT_KEY: u8 = 3;

const MIDI_OFFSET: f32 = 21.0;

const NOTE_NAMES: [&str; 12] = [
    "A", "A#", "B", "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#",
];

/// Letter name of a note or key index.
pub fn note_name(note: u8) -> &'static str {
    NOTE_NAMES[(note % 12) as usize]
}

/// Octave number in scientific pitch notation (C4 = note 39).
pub fn note_octave(note: u8) -> u8 {
    ((note as u16 + 9) / 12) as u8
}

/// Equal-tempered frequency of an unquantized note.
pub fn note_to_hz(note: u8) -> f32 {
    440.0 * 2.0f32.powf((note as f32 + MIDI_OFFSET - 69.0) / 12.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantizer {
    key: u8,
    scale: Scale,
}

impl Default for Quantizer {
    fn default() -> Self {
        Self::new(DEFAULT_KEY, Scale::default())
    }
}

impl Quantizer {
    pub fn new(key: u8, scale: Scale) -> Self {
        Self {
            key: key % 12,
            scale,
        }
    }

    /// Set the key (A-based index). Values past 11 wrap.
    pub fn set_key(&mut self, key: u8) {
        self.key = key % 12;
    }

    pub fn set_scale(&mut self, scale: Scale) {
        self.scale = scale;
    }

    pub fn key(&self) -> u8 {
        self.key
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// True if the note is a degree of the current key and scale.
    pub fn in_scale(&self, note: u8) -> bool {
        let semitone = (note as i16 - self.key as i16).rem_euclid(12) as u8;
        self.scale.degrees().contains(semitone)
    }

    /// Snap `note` up to the nearest note of the scale.
    ///
    /// Never lowers the note, except near `u8::MAX` where the result folds
    /// down by octaves to stay representable.
    pub fn quantize_note(&self, note: u8) -> u8 {
        let degrees = self.scale.degrees();
        let mut candidate = note as u16;
        for _ in 0..12 {
            let semitone = (candidate as i16 - self.key as i16).rem_euclid(12) as u8;
            if degrees.contains(semitone) {
                break;
            }
            candidate += 1;
        }
        while candidate > u8::MAX as u16 {
            candidate -= 12;
        }
        candidate as u8
    }

    /// Frequency of a note, optionally snapped to the scale first.
    pub fn note_to_hertz(&self, note: u8, quantize: bool) -> f32 {
        let note = if quantize {
            self.quantize_note(note)
        } else {
            note
        };
        note_to_hz(note)
    }

    pub fn note_to_name(&self, note: u8) -> &'static str {
        note_name(note)
    }
}
