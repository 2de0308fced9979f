//! Front-panel mapping: turns raw key edges and knob positions into
//! [`ControlMessage`]s.
//!
//! The panel has 16 keys, 8 knobs and two shift switches. The shift switches
//! select which layer the knobs and keys address:
//!
//! | layer    | keys                                         | knobs                                   |
//! |----------|----------------------------------------------|-----------------------------------------|
//! | none     | 8..=15 toggle primary, 0..=7 toggle secondary | transpose, env 1 A/D, cutoff, Q, env 2 A/D/amount |
//! | shift 1  | key 8 toggles the transport                   | BPM, clock multiplier                   |
//! | shift 2  |                                              | note of pitch step 0..=7                |
//!
//! Holding both shifts does nothing. All of this runs in the control context.

use crate::{
    dsp::{filter, ClockMultiplier},
    engine::{ControlMessage, EngineConfig},
    sequencing::MAX_NOTE,
};

pub const KEY_COUNT: usize = 16;
pub const KNOB_COUNT: usize = 8;

/// First key of group A (the primary track row).
const GROUP_A: usize = 8;
const TRANSPORT_KEY: usize = 8;

const MIN_PANEL_BPM: f32 = 20.0;
const MAX_PANEL_BPM: f32 = 220.0;
const MIN_STAGE: f32 = 0.001;
const MAX_STAGE: f32 = 5.0;

/// One poll of the panel hardware.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlInputs {
    pub shift1: bool,
    pub shift2: bool,
    /// Rising edges since the previous poll.
    pub key_edges: [bool; KEY_COUNT],
    /// Normalized position (0..1) of each knob that moved since the previous poll.
    pub knobs: [Option<f32>; KNOB_COUNT],
    /// Tempo from an external clock, when one is present.
    pub external_bpm: Option<f32>,
}

impl ControlInputs {
    pub fn press(mut self, key: usize) -> Self {
        self.key_edges[key] = true;
        self
    }

    pub fn turn(mut self, knob: usize, value: f32) -> Self {
        self.knobs[knob] = Some(value);
        self
    }

    pub fn layer(&self) -> Layer {
        match (self.shift1, self.shift2) {
            (false, false) => Layer::Main,
            (true, false) => Layer::Shift1,
            (false, true) => Layer::Shift2,
            (true, true) => Layer::Both,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Main,
    Shift1,
    Shift2,
    Both,
}

impl Layer {
    /// Short name of what `knob` controls on this layer.
    pub fn knob_label(self, knob: usize) -> &'static str {
        match (self, knob) {
            (Layer::Main, 0) => "transpose",
            (Layer::Main, 1) => "amp atk",
            (Layer::Main, 2) => "amp dec",
            (Layer::Main, 3) => "cutoff",
            (Layer::Main, 4) => "reso",
            (Layer::Main, 5) => "flt atk",
            (Layer::Main, 6) => "flt dec",
            (Layer::Main, 7) => "flt amt",
            (Layer::Shift1, 0) => "bpm",
            (Layer::Shift1, 1) => "mult",
            (Layer::Shift2, 0..=7) => "note",
            _ => "",
        }
    }
}

/// Linear knob mapping from 0..1 onto `min..max`.
#[inline]
pub fn scale_knob(value: f32, min: f32, max: f32) -> f32 {
    min + value.clamp(0.0, 1.0) * (max - min)
}

/// Exponential cutoff mapping: 20 Hz at 0, 20 kHz at 1.
#[inline]
pub fn cutoff_knob(value: f32) -> f32 {
    let ratio = filter::MAX_FREQ / filter::MIN_FREQ;
    filter::MIN_FREQ * ratio.powf(value.clamp(0.0, 1.0))
}

/// Stateful translator from panel polls to control messages.
#[derive(Debug, Clone)]
pub struct Panel {
    primary_len: usize,
    secondary_len: usize,
    pitch_len: usize,
    last_external_bpm: Option<f32>,
}

impl Panel {
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_steps(
            config.primary_steps,
            config.secondary_steps,
            config.pitch_steps,
        )
    }

    /// Panel for tracks of the given lengths. Keys and knobs past a track's
    /// length are ignored.
    pub fn with_steps(primary: usize, secondary: usize, pitch: usize) -> Self {
        Self {
            primary_len: primary,
            secondary_len: secondary,
            pitch_len: pitch,
            last_external_bpm: None,
        }
    }

    /// Translate one poll, handing every resulting message to `emit`.
    pub fn tick(&mut self, inputs: &ControlInputs, mut emit: impl FnMut(ControlMessage)) {
        if inputs.external_bpm != self.last_external_bpm {
            if let Some(bpm) = inputs.external_bpm {
                emit(ControlMessage::SetBpm(bpm));
            }
            self.last_external_bpm = inputs.external_bpm;
        }

        let layer = inputs.layer();
        self.keys(layer, inputs, &mut emit);
        for (knob, value) in inputs.knobs.iter().enumerate() {
            if let Some(value) = *value {
                self.knob(layer, knob, value, inputs.external_bpm.is_some(), &mut emit);
            }
        }
    }

    fn keys(&self, layer: Layer, inputs: &ControlInputs, emit: &mut impl FnMut(ControlMessage)) {
        match layer {
            Layer::Shift1 => {
                if inputs.key_edges[TRANSPORT_KEY] {
                    log::debug!("panel: transport toggle");
                    emit(ControlMessage::ToggleTransport);
                }
            }
            Layer::Main => {
                for (key, &edge) in inputs.key_edges.iter().enumerate() {
                    if !edge {
                        continue;
                    }
                    if key >= GROUP_A {
                        let step = key - GROUP_A;
                        if step < self.primary_len {
                            emit(ControlMessage::TogglePrimaryStep(step as u8));
                        }
                    } else if key < self.secondary_len {
                        emit(ControlMessage::ToggleSecondaryStep(key as u8));
                    }
                }
            }
            Layer::Shift2 | Layer::Both => {}
        }
    }

    fn knob(
        &self,
        layer: Layer,
        knob: usize,
        value: f32,
        external_tempo: bool,
        emit: &mut impl FnMut(ControlMessage),
    ) {
        let message = match (layer, knob) {
            (Layer::Shift1, 0) if !external_tempo => Some(ControlMessage::SetBpm(
                scale_knob(value, MIN_PANEL_BPM, MAX_PANEL_BPM + 0.9).floor(),
            )),
            (Layer::Shift1, 1) => Some(ControlMessage::SetMultiplier(ClockMultiplier::from_index(
                scale_knob(value, 0.0, 10.9) as u8,
            ))),
            (Layer::Shift2, step) if step < self.pitch_len => Some(ControlMessage::SetNote {
                step: step as u8,
                note: scale_knob(value, 0.0, MAX_NOTE as f32 + 0.9) as u8,
            }),
            (Layer::Main, 0) => Some(ControlMessage::SetTranspose(
                scale_knob(value, -12.0, 12.0).round() as i8,
            )),
            (Layer::Main, 1) => Some(ControlMessage::SetAmpAttack(scale_knob(
                value, MIN_STAGE, MAX_STAGE,
            ))),
            (Layer::Main, 2) => Some(ControlMessage::SetAmpDecay(scale_knob(
                value, MIN_STAGE, MAX_STAGE,
            ))),
            (Layer::Main, 3) => Some(ControlMessage::SetFilterFreq(cutoff_knob(value))),
            (Layer::Main, 4) => Some(ControlMessage::SetFilterQ(scale_knob(
                value,
                filter::MIN_Q,
                filter::MAX_Q,
            ))),
            (Layer::Main, 5) => Some(ControlMessage::SetFilterEnvAttack(scale_knob(
                value, MIN_STAGE, MAX_STAGE,
            ))),
            (Layer::Main, 6) => Some(ControlMessage::SetFilterEnvDecay(scale_knob(
                value, MIN_STAGE, MAX_STAGE,
            ))),
            (Layer::Main, 7) => Some(ControlMessage::SetFilterEnvScale(value.clamp(0.0, 1.0))),
            _ => None,
        };

        if let Some(message) = message {
            emit(message);
        }
    }
}
