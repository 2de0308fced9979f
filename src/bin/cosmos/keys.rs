//! Computer keyboard stand-in for the hardware panel.
//!
//! ```text
//!   1 2 3 4 5 6 7 8   primary steps   (panel keys 8..=15)
//!   a s d f g h j k   secondary steps (panel keys 0..=7)
//!   Tab               cycle shift layer (none → shift 1 → shift 2)
//!   ← →  ↑ ↓  PgUp PgDn   select knob, nudge it
//!   Space             play / stop
//!   w m n b           waveform, scale, key, stop behavior
//!   q Esc             quit
//! ```
//!
//! Terminals do not report held modifier keys, so the shift switches latch.

use cosmos_dsp::{
    control::{scale_knob, ControlInputs, Layer, KNOB_COUNT},
    dsp::{filter, Waveform},
    engine::{ControlMessage, EngineConfig, StopBehavior},
    sequencing::{quantizer::DEFAULT_NOTE, Scale, MAX_NOTE},
};
use crossterm::event::KeyCode;

const STEP_ROW_A: [char; 8] = ['1', '2', '3', '4', '5', '6', '7', '8'];
const STEP_ROW_B: [char; 8] = ['a', 's', 'd', 'f', 'g', 'h', 'j', 'k'];
const FINE: f32 = 0.02;
const COARSE: f32 = 0.1;

pub enum KeyAction {
    Quit,
    Send(ControlMessage),
    Handled,
}

pub struct Keyboard {
    layer: Layer,
    selected: usize,
    // Knob positions per layer: main, shift 1, shift 2
    knobs: [[f32; KNOB_COUNT]; 3],
    pending: ControlInputs,
    waveform: Waveform,
    scale: Scale,
    key: u8,
    stop_behavior: StopBehavior,
}

impl Keyboard {
    pub fn new(config: &EngineConfig) -> Self {
        let stage = |seconds: f32| unscale(seconds, 0.001, 5.0);
        let cutoff = (config.filter_freq / filter::MIN_FREQ).ln()
            / (filter::MAX_FREQ / filter::MIN_FREQ).ln();

        let main = [
            0.5,
            stage(config.amp_envelope.attack),
            stage(config.amp_envelope.decay),
            cutoff.clamp(0.0, 1.0),
            unscale(config.filter_q, filter::MIN_Q, filter::MAX_Q),
            stage(config.filter_envelope.attack),
            stage(config.filter_envelope.decay),
            config.filter_envelope.scale.clamp(0.0, 1.0),
        ];
        let mut shift1 = [0.0; KNOB_COUNT];
        shift1[0] = unscale(config.bpm, 20.0, 220.9);
        shift1[1] = unscale(config.multiplier.index() as f32, 0.0, 10.9);
        let shift2 = [unscale(DEFAULT_NOTE as f32, 0.0, MAX_NOTE as f32 + 0.9); KNOB_COUNT];

        Self {
            layer: Layer::Main,
            selected: 0,
            knobs: [main, shift1, shift2],
            pending: ControlInputs::default(),
            waveform: config.waveform,
            scale: config.scale,
            key: config.key,
            stop_behavior: config.stop_behavior,
        }
    }

    pub fn handle(&mut self, code: KeyCode) -> KeyAction {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return KeyAction::Quit,
            KeyCode::Char(' ') => return KeyAction::Send(ControlMessage::ToggleTransport),
            KeyCode::Char('w') => {
                self.waveform = match self.waveform {
                    Waveform::Sine => Waveform::Triangle,
                    Waveform::Triangle => Waveform::Saw,
                    Waveform::Saw | Waveform::Off => Waveform::Sine,
                };
                return KeyAction::Send(ControlMessage::SetWaveform(self.waveform));
            }
            KeyCode::Char('m') => {
                self.scale = Scale::from_index((self.scale.index() + 1) % Scale::ALL.len() as u8);
                return KeyAction::Send(ControlMessage::SetScale(self.scale));
            }
            KeyCode::Char('n') => {
                self.key = (self.key + 1) % 12;
                return KeyAction::Send(ControlMessage::SetKey(self.key));
            }
            KeyCode::Char('b') => {
                self.stop_behavior = match self.stop_behavior {
                    StopBehavior::HoldTail => StopBehavior::Mute,
                    StopBehavior::Mute => StopBehavior::HoldTail,
                };
                return KeyAction::Send(ControlMessage::SetStopBehavior(self.stop_behavior));
            }
            KeyCode::Char(c) => {
                if let Some(i) = STEP_ROW_A.iter().position(|&k| k == c) {
                    self.pending.key_edges[8 + i] = true;
                } else if let Some(i) = STEP_ROW_B.iter().position(|&k| k == c) {
                    self.pending.key_edges[i] = true;
                }
            }
            KeyCode::Tab => {
                self.layer = match self.layer {
                    Layer::Main => Layer::Shift1,
                    Layer::Shift1 => Layer::Shift2,
                    Layer::Shift2 | Layer::Both => Layer::Main,
                };
            }
            KeyCode::Left => self.selected = (self.selected + KNOB_COUNT - 1) % KNOB_COUNT,
            KeyCode::Right => self.selected = (self.selected + 1) % KNOB_COUNT,
            KeyCode::Up => self.nudge(FINE),
            KeyCode::Down => self.nudge(-FINE),
            KeyCode::PageUp => self.nudge(COARSE),
            KeyCode::PageDown => self.nudge(-COARSE),
            _ => {}
        }
        KeyAction::Handled
    }

    /// Everything gathered since the last poll, as one panel reading.
    pub fn take_inputs(&mut self) -> ControlInputs {
        let mut inputs = std::mem::take(&mut self.pending);
        inputs.shift1 = self.layer == Layer::Shift1;
        inputs.shift2 = self.layer == Layer::Shift2;
        inputs
    }

    pub fn layer(&self) -> Layer {
        self.layer
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn knob_values(&self) -> &[f32; KNOB_COUNT] {
        &self.knobs[self.layer_slot()]
    }

    pub fn stop_behavior(&self) -> StopBehavior {
        self.stop_behavior
    }

    fn nudge(&mut self, amount: f32) {
        let slot = self.layer_slot();
        let value = &mut self.knobs[slot][self.selected];
        *value = scale_knob(*value + amount, 0.0, 1.0);
        self.pending.knobs[self.selected] = Some(*value);
    }

    fn layer_slot(&self) -> usize {
        match self.layer {
            Layer::Main | Layer::Both => 0,
            Layer::Shift1 => 1,
            Layer::Shift2 => 2,
        }
    }
}

fn unscale(value: f32, min: f32, max: f32) -> f32 {
    ((value - min) / (max - min)).clamp(0.0, 1.0)
}
