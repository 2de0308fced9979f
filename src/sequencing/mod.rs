pub mod pitch;
pub mod quantizer;
pub mod scale;
pub mod trigger;

pub use pitch::PitchSequencer;
pub use quantizer::{note_name, note_octave, note_to_hz, Quantizer, DEFAULT_NOTE, MAX_NOTE};
pub use scale::{Scale, ScaleDegrees};
pub use trigger::TriggerSequencer;
