use std::collections::VecDeque;

#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use super::config::StopBehavior;
use crate::{
    dsp::{ClockMultiplier, Waveform},
    sequencing::Scale,
};

/// One parameter write from the control context.
///
/// Every variant carries a single scalar, so applying one message can never
/// leave the engine in a half-updated state.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ControlMessage {
    Start,
    Stop,
    ToggleTransport,

    SetBpm(f32),
    SetMultiplier(ClockMultiplier),

    TogglePrimaryStep(u8),
    ToggleSecondaryStep(u8),
    SetNote { step: u8, note: u8 },
    SetTranspose(i8),
    SetKey(u8),
    SetScale(Scale),

    SetWaveform(Waveform),

    SetAmpAttack(f32),
    SetAmpDecay(f32),
    SetFilterEnvAttack(f32),
    SetFilterEnvDecay(f32),
    SetFilterEnvScale(f32),
    SetFilterEnvDepth(f32),

    SetFilterFreq(f32),
    SetFilterQ(f32),

    SetStopBehavior(StopBehavior),
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<ControlMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<ControlMessage> {
    fn pop(&mut self) -> Option<ControlMessage> {
        Consumer::pop(self).ok()
    }
}

// Offline rendering and tests
impl MessageReceiver for VecDeque<ControlMessage> {
    fn pop(&mut self) -> Option<ControlMessage> {
        self.pop_front()
    }
}
