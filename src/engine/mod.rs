//! The instrument voice: one clock, three sequencer tracks and a mono synth
//! path rendered as a stereo pair.
//!
//! ```text
//!  clock ──tick──▶ primary ─┐             pitch ──hz──▶ oscillator ──▶ ×gain ──▶ filter L/R ──▶ out
//!                  secondary ─reset─▶ primary/pitch        ▲ amp                     ▲ cutoff offset
//!                                                       envelope 1              envelope 2 · depth
//! ```
//!
//! The engine is owned by one context at a time. In a live setup that is the
//! audio callback, and every parameter write arrives as a [`ControlMessage`]
//! drained at the top of each block (see [`crate::runtime`]). Nothing in the
//! per-sample path allocates, locks or logs.

pub mod config;
pub mod error;
pub mod message;
pub mod meter;
pub mod snapshot;

use std::{sync::Arc, time::Instant};

pub use config::{EngineConfig, EnvelopeConfig, StopBehavior};
pub use error::EngineError;
pub use message::{ControlMessage, MessageReceiver};
pub use meter::CpuMeter;
pub use snapshot::EngineSnapshot;

use crate::{
    dsp::{Clock, CoefficientTable, Envelope, Filter, FilterRealization, Oscillator},
    sequencing::{PitchSequencer, Quantizer, TriggerSequencer},
    MAX_STEPS,
};

/// Tempo range accepted from any source.
pub const MIN_BPM: f32 = 1.0;
pub const MAX_BPM: f32 = 999.0;

pub struct Engine {
    sample_rate: f32,
    output_gain: f32,
    filter_env_depth: f32,
    stop_behavior: StopBehavior,

    clock: Clock,
    primary: TriggerSequencer,
    secondary: TriggerSequencer,
    pitch: PitchSequencer,

    oscillator: Oscillator,
    filter_left: Filter,
    filter_right: Filter,
    amp_env: Envelope,
    filter_env: Envelope,

    playing: bool,
    ticks: u64,
    blocks_since_tick: u16,
    last_peak: f32,
    meter: CpuMeter,
}

impl Engine {
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let sample_rate = config.sample_rate;

        let (mut filter_left, mut filter_right) = match config.filter_realization {
            FilterRealization::Direct => (Filter::new(sample_rate), Filter::new(sample_rate)),
            FilterRealization::Table => {
                let table = Arc::new(CoefficientTable::new(sample_rate));
                (Filter::with_table(Arc::clone(&table)), Filter::with_table(table))
            }
        };
        for filter in [&mut filter_left, &mut filter_right] {
            filter.set_freq(config.filter_freq);
            filter.set_q(config.filter_q);
        }

        let mut clock = Clock::from_bpm(config.bpm.clamp(MIN_BPM, MAX_BPM), sample_rate);
        clock.set_multiplier(config.multiplier);

        let mut oscillator = Oscillator::new(sample_rate).with_waveform(config.waveform);
        oscillator.set_amp(0.0);

        let mut amp_env = Envelope::ad(
            config.amp_envelope.attack,
            config.amp_envelope.decay,
            sample_rate,
        );
        amp_env.set_scale(config.amp_envelope.scale);
        let mut filter_env = Envelope::ad(
            config.filter_envelope.attack,
            config.filter_envelope.decay,
            sample_rate,
        );
        filter_env.set_scale(config.filter_envelope.scale);

        let pitch = PitchSequencer::with_quantizer(
            config.pitch_steps,
            Quantizer::new(config.key, config.scale),
        );

        log::info!(
            "engine ready: {} Hz, {} BPM, steps {}/{}/{}, {:?} filter",
            sample_rate,
            clock.bpm(),
            config.primary_steps,
            config.secondary_steps,
            config.pitch_steps,
            config.filter_realization
        );

        Ok(Self {
            sample_rate,
            output_gain: config.output_gain,
            filter_env_depth: config.filter_env_depth,
            stop_behavior: config.stop_behavior,
            clock,
            primary: TriggerSequencer::new(config.primary_steps),
            secondary: TriggerSequencer::new(config.secondary_steps),
            pitch,
            oscillator,
            filter_left,
            filter_right,
            amp_env,
            filter_env,
            playing: false,
            ticks: 0,
            blocks_since_tick: 0,
            last_peak: 0.0,
            meter: CpuMeter::new(sample_rate),
        })
    }

    /// Start the transport so the very next sample ticks onto step 0 of every track.
    pub fn start(&mut self) {
        self.primary.rewind_to_end();
        self.secondary.rewind_to_end();
        self.pitch.rewind_to_end();
        self.clock.set_phase_to_end();
        self.blocks_since_tick = 0;
        self.playing = true;
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    pub fn toggle_transport(&mut self) {
        if self.playing {
            self.stop();
        } else {
            self.start();
        }
    }

    /// Apply one control message. Messages naming a step the track does not
    /// have are dropped.
    pub fn apply(&mut self, message: ControlMessage) {
        match message {
            ControlMessage::Start => self.start(),
            ControlMessage::Stop => self.stop(),
            ControlMessage::ToggleTransport => self.toggle_transport(),
            ControlMessage::SetBpm(bpm) => {
                if bpm.is_finite() {
                    self.clock.set_bpm(bpm.clamp(MIN_BPM, MAX_BPM));
                }
            }
            ControlMessage::SetMultiplier(multiplier) => self.clock.set_multiplier(multiplier),
            ControlMessage::TogglePrimaryStep(step) => {
                if (step as usize) < self.primary.len() {
                    self.primary.toggle_step(step as usize);
                }
            }
            ControlMessage::ToggleSecondaryStep(step) => {
                if (step as usize) < self.secondary.len() {
                    self.secondary.toggle_step(step as usize);
                }
            }
            ControlMessage::SetNote { step, note } => {
                if (step as usize) < self.pitch.len() {
                    self.pitch.set_note(step as usize, note);
                }
            }
            ControlMessage::SetTranspose(semitones) => self.pitch.set_transpose(semitones),
            ControlMessage::SetKey(key) => self.pitch.set_key(key),
            ControlMessage::SetScale(scale) => self.pitch.set_scale(scale),
            ControlMessage::SetWaveform(waveform) => self.oscillator.set_waveform(waveform),
            ControlMessage::SetAmpAttack(seconds) => self.amp_env.set_attack(seconds),
            ControlMessage::SetAmpDecay(seconds) => self.amp_env.set_decay(seconds),
            ControlMessage::SetFilterEnvAttack(seconds) => self.filter_env.set_attack(seconds),
            ControlMessage::SetFilterEnvDecay(seconds) => self.filter_env.set_decay(seconds),
            ControlMessage::SetFilterEnvScale(scale) => self.filter_env.set_scale(scale),
            ControlMessage::SetFilterEnvDepth(hz) => {
                if hz.is_finite() {
                    self.filter_env_depth = hz;
                }
            }
            ControlMessage::SetFilterFreq(hz) => {
                self.filter_left.set_freq(hz);
                self.filter_right.set_freq(hz);
            }
            ControlMessage::SetFilterQ(q) => {
                self.filter_left.set_q(q);
                self.filter_right.set_q(q);
            }
            ControlMessage::SetStopBehavior(behavior) => self.stop_behavior = behavior,
        }
    }

    /// Apply every pending message from `rx`.
    pub fn drain<R: MessageReceiver>(&mut self, rx: &mut R) {
        while let Some(message) = rx.pop() {
            self.apply(message);
        }
    }

    /// Render one stereo frame.
    #[inline]
    pub fn next_frame(&mut self) -> (f32, f32) {
        if !self.playing && self.stop_behavior == StopBehavior::Mute {
            return (0.0, 0.0);
        }

        if self.playing && self.clock.process() {
            self.on_tick();
        }

        let amp = self.amp_env.process();
        let sweep = self.filter_env.process();
        self.oscillator.set_amp(amp);
        let (left, right) = self.oscillator.process();

        let offset = sweep * self.filter_env_depth;
        self.filter_left.add_freq(offset);
        self.filter_right.add_freq(offset);

        (
            self.filter_left.process(left * self.output_gain),
            self.filter_right.process(right * self.output_gain),
        )
    }

    /// Render into separate channel buffers. Renders `min(left.len(), right.len())` frames.
    pub fn process_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        let started = Instant::now();
        let mut peak = 0.0f32;
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            (*l, *r) = self.next_frame();
            peak = peak.max(l.abs()).max(r.abs());
        }
        self.finish_block(started, left.len().min(right.len()), peak);
    }

    /// Render into an interleaved buffer with `channels` channels.
    ///
    /// Mono gets the average of both sides; channels past the second are left silent.
    pub fn process_interleaved(&mut self, out: &mut [f32], channels: usize) {
        if channels == 0 {
            return;
        }
        let started = Instant::now();
        let mut peak = 0.0f32;
        let mut frames = 0;
        for frame in out.chunks_exact_mut(channels) {
            let (l, r) = self.next_frame();
            peak = peak.max(l.abs()).max(r.abs());
            match frame {
                [mono] => *mono = 0.5 * (l + r),
                [left, right, rest @ ..] => {
                    *left = l;
                    *right = r;
                    rest.fill(0.0);
                }
                [] => {}
            }
            frames += 1;
        }
        self.finish_block(started, frames, peak);
    }

    fn finish_block(&mut self, started: Instant, frames: usize, peak: f32) {
        self.meter.record(started.elapsed(), frames);
        self.blocks_since_tick = self.blocks_since_tick.saturating_add(1);
        self.last_peak = peak;
    }

    fn on_tick(&mut self) {
        self.ticks += 1;
        self.blocks_since_tick = 0;

        self.primary.advance();
        self.secondary.advance();
        self.pitch.advance();

        // An active secondary step restarts the primary and pitch tracks.
        if self.secondary.is_current_step_active() {
            self.primary.set_current_step(0);
            self.pitch.set_current_step(0);
        }

        if self.primary.is_current_step_active() {
            self.amp_env.trigger();
            self.filter_env.trigger();
            self.oscillator.set_freq(self.pitch.current_hertz());
        }
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let mut snapshot = EngineSnapshot {
            playing: self.playing,
            bpm: self.clock.bpm(),
            multiplier: self.clock.multiplier(),
            cpu_percent: self.meter.percent(),
            blocks_since_tick: self.blocks_since_tick,
            ticks: self.ticks,
            primary_step: self.primary.current_step() as u8,
            secondary_step: self.secondary.current_step() as u8,
            pitch_step: self.pitch.current_step() as u8,
            primary_len: self.primary.len() as u8,
            secondary_len: self.secondary.len() as u8,
            pitch_len: self.pitch.len() as u8,
            amp_env: self.amp_env.level(),
            filter_env: self.filter_env.level(),
            filter_freq: self.filter_left.effective_freq(),
            filter_q: self.filter_left.q(),
            osc_freq: self.oscillator.frequency(),
            waveform: self.oscillator.waveform(),
            key: self.pitch.quantizer().key(),
            scale: self.pitch.quantizer().scale(),
            transpose: self.pitch.transpose(),
            peak: self.last_peak,
            ..EngineSnapshot::default()
        };
        copy_prefix(&mut snapshot.primary_pattern, self.primary.steps());
        copy_prefix(&mut snapshot.secondary_pattern, self.secondary.steps());
        copy_prefix(&mut snapshot.pitch_notes, self.pitch.notes());
        snapshot
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn stop_behavior(&self) -> StopBehavior {
        self.stop_behavior
    }

    pub fn filter_env_depth(&self) -> f32 {
        self.filter_env_depth
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn primary(&self) -> &TriggerSequencer {
        &self.primary
    }

    pub fn secondary(&self) -> &TriggerSequencer {
        &self.secondary
    }

    pub fn pitch(&self) -> &PitchSequencer {
        &self.pitch
    }

    pub fn oscillator(&self) -> &Oscillator {
        &self.oscillator
    }

    /// Left and right filters. Both always carry the same parameters.
    pub fn filters(&self) -> (&Filter, &Filter) {
        (&self.filter_left, &self.filter_right)
    }

    pub fn amp_envelope(&self) -> &Envelope {
        &self.amp_env
    }

    pub fn filter_envelope(&self) -> &Envelope {
        &self.filter_env
    }

    pub fn cpu_meter(&self) -> &CpuMeter {
        &self.meter
    }
}

fn copy_prefix<T: Copy>(dst: &mut [T; MAX_STEPS], src: &[T]) {
    let len = src.len().min(MAX_STEPS);
    dst[..len].copy_from_slice(&src[..len]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dsp::EnvelopeStage, sequencing::Scale};
    use std::collections::VecDeque;

    fn engine(config: EngineConfig) -> Engine {
        Engine::new(&config).unwrap()
    }

    #[test]
    fn rejects_invalid_config() {
        let config = EngineConfig::default().with_steps(8, 8, 0);
        assert!(matches!(
            Engine::new(&config),
            Err(EngineError::InvalidStepCount { steps: 0, .. })
        ));
    }

    #[test]
    fn start_parks_tracks_on_their_last_step() {
        let mut engine = engine(EngineConfig::default().with_steps(8, 3, 5));
        engine.start();
        assert!(engine.is_playing());
        assert_eq!(engine.primary().current_step(), 7);
        assert_eq!(engine.secondary().current_step(), 2);
        assert_eq!(engine.pitch().current_step(), 4);

        engine.next_frame();
        assert_eq!(engine.ticks(), 1);
        assert_eq!(engine.primary().current_step(), 0);
        assert_eq!(engine.secondary().current_step(), 0);
        assert_eq!(engine.pitch().current_step(), 0);
    }

    #[test]
    fn out_of_range_messages_are_dropped() {
        let mut engine = engine(EngineConfig::default().with_steps(4, 2, 4));
        let mut queue: VecDeque<ControlMessage> = [
            ControlMessage::TogglePrimaryStep(4),
            ControlMessage::ToggleSecondaryStep(2),
            ControlMessage::SetNote { step: 9, note: 10 },
            ControlMessage::TogglePrimaryStep(1),
        ]
        .into_iter()
        .collect();
        engine.drain(&mut queue);

        assert!(queue.is_empty());
        assert_eq!(engine.primary().steps(), &[false, true, false, false]);
        assert_eq!(engine.secondary().steps(), &[false, false]);
    }

    #[test]
    fn messages_reach_components() {
        let mut engine = engine(EngineConfig::default());
        for message in [
            ControlMessage::SetBpm(90.0),
            ControlMessage::SetScale(Scale::Chromatic),
            ControlMessage::SetNote { step: 2, note: 40 },
            ControlMessage::SetFilterFreq(5.0),
            ControlMessage::SetFilterQ(3.0),
            ControlMessage::SetAmpDecay(0.25),
            ControlMessage::SetBpm(f32::NAN),
        ] {
            engine.apply(message);
        }

        assert!((engine.clock().bpm() - 90.0).abs() < 1e-3);
        assert_eq!(engine.pitch().note(2), 40);
        let (left, right) = engine.filters();
        assert_eq!(left.freq(), 20.0);
        assert_eq!(right.q(), 3.0);
        assert_eq!(engine.amp_envelope().decay(), 0.25);
    }

    #[test]
    fn non_finite_messages_leave_audio_finite() {
        let mut engine = engine(EngineConfig::default().with_amp_envelope(0.005, 0.2));
        let mut queue: VecDeque<ControlMessage> = [
            ControlMessage::SetAmpAttack(f32::NAN),
            ControlMessage::SetAmpDecay(f32::NAN),
            ControlMessage::SetFilterEnvAttack(f32::INFINITY),
            ControlMessage::SetFilterEnvDecay(f32::NAN),
            ControlMessage::SetFilterEnvScale(f32::NAN),
            ControlMessage::SetFilterEnvDepth(f32::NAN),
            ControlMessage::SetFilterFreq(f32::NAN),
            ControlMessage::SetFilterQ(f32::NAN),
            ControlMessage::SetBpm(f32::NEG_INFINITY),
            ControlMessage::TogglePrimaryStep(0),
            ControlMessage::Start,
        ]
        .into_iter()
        .collect();
        engine.drain(&mut queue);

        assert_eq!(engine.amp_envelope().attack(), 0.005);
        assert_eq!(engine.amp_envelope().decay(), 0.2);
        assert!(engine.filters().0.q().is_finite());
        assert!(engine.filter_env_depth().is_finite());

        let mut left = vec![0.0; 4_096];
        let mut right = vec![0.0; 4_096];
        engine.process_block(&mut left, &mut right);
        assert!(left.iter().chain(&right).all(|s| s.is_finite()));
        assert!(left.iter().any(|&s| s != 0.0));
    }

    #[test]
    fn silent_until_a_step_fires() {
        let mut engine = engine(EngineConfig::default());
        engine.start();
        let mut left = vec![0.0; 512];
        let mut right = vec![0.0; 512];
        engine.process_block(&mut left, &mut right);
        assert!(left.iter().chain(&right).all(|&s| s == 0.0));
        assert_eq!(engine.amp_envelope().stage(), EnvelopeStage::Idle);
    }

    #[test]
    fn active_step_triggers_both_envelopes_and_retunes() {
        let mut engine = engine(EngineConfig::default().with_key(3, Scale::Chromatic));
        engine.apply(ControlMessage::TogglePrimaryStep(0));
        engine.apply(ControlMessage::SetNote { step: 0, note: 48 });
        engine.start();
        engine.next_frame();

        assert_eq!(engine.amp_envelope().stage(), EnvelopeStage::Attack);
        assert_eq!(engine.filter_envelope().stage(), EnvelopeStage::Attack);
        assert!((engine.oscillator().frequency() - 440.0).abs() < 1e-3);
    }

    #[test]
    fn mute_zeroes_output_while_stopped() {
        let mut engine = engine(
            EngineConfig::default()
                .with_amp_envelope(0.001, 5.0)
                .with_stop_behavior(StopBehavior::Mute),
        );
        engine.apply(ControlMessage::TogglePrimaryStep(0));
        engine.start();
        for _ in 0..64 {
            engine.next_frame();
        }
        engine.stop();
        for _ in 0..64 {
            assert_eq!(engine.next_frame(), (0.0, 0.0));
        }
    }

    #[test]
    fn hold_tail_lets_the_envelope_ring_out() {
        let mut engine = engine(EngineConfig::default().with_amp_envelope(0.001, 5.0));
        engine.apply(ControlMessage::TogglePrimaryStep(0));
        engine.start();
        for _ in 0..64 {
            engine.next_frame();
        }
        engine.stop();
        let ticks = engine.ticks();
        let energy: f32 = (0..2_048).map(|_| engine.next_frame().0.abs()).sum();
        assert!(energy > 0.0, "tail should keep sounding after stop");
        assert_eq!(engine.ticks(), ticks, "no ticks while stopped");
    }

    #[test]
    fn interleaved_handles_mono_and_extra_channels() {
        let mut engine = engine(EngineConfig::default().with_amp_envelope(0.001, 5.0));
        engine.apply(ControlMessage::TogglePrimaryStep(0));
        engine.start();

        let mut quad = vec![1.0; 4 * 128];
        engine.process_interleaved(&mut quad, 4);
        for frame in quad.chunks_exact(4) {
            assert_eq!(frame[2], 0.0);
            assert_eq!(frame[3], 0.0);
        }

        let mut mono = vec![0.0; 128];
        engine.process_interleaved(&mut mono, 1);
        assert!(mono.iter().any(|&s| s != 0.0));
    }

    #[test]
    fn snapshot_reflects_patterns() {
        let mut engine = engine(EngineConfig::default().with_steps(4, 2, 3));
        engine.apply(ControlMessage::TogglePrimaryStep(3));
        engine.apply(ControlMessage::ToggleSecondaryStep(1));
        let snapshot = engine.snapshot();

        assert_eq!(snapshot.primary_steps(), &[false, false, false, true]);
        assert_eq!(snapshot.secondary_steps(), &[false, true]);
        assert_eq!(snapshot.pitch_steps().len(), 3);
        assert_eq!(snapshot.step_label(0), "C4");
        assert_eq!(snapshot.key_name(), "C");
        assert!(!snapshot.playing);
        assert!((snapshot.bpm - 120.0).abs() < 1e-3);
    }

    #[test]
    fn blink_counter_counts_blocks_since_tick() {
        let mut engine = engine(EngineConfig::default());
        engine.start();
        let mut left = vec![0.0; 64];
        let mut right = vec![0.0; 64];
        // First block contains the start tick.
        engine.process_block(&mut left, &mut right);
        assert_eq!(engine.snapshot().blocks_since_tick, 1);
        engine.process_block(&mut left, &mut right);
        assert_eq!(engine.snapshot().blocks_since_tick, 2);
    }
}
