//! Audio stream setup and the control/UI loop.

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cosmos_dsp::{
    engine::{Engine, EngineConfig},
    runtime::{self, Controller},
};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use rtrb::Consumer;
use std::time::Duration;

use super::keys::{KeyAction, Keyboard};
use super::ui::{spectrum::SpectrumAnalyzer, Ui};

/// Control messages in flight between two audio callbacks.
const CONTROL_RING: usize = 256;
/// Scope/analyzer window (≈47 FPS @ 48 kHz)
const VIS_BLOCK_LEN: usize = 1024;
const SCOPE_RING_BLOCKS: usize = 16;
/// Control loop period; also paces redraws.
const CONTROL_PERIOD: Duration = Duration::from_millis(16);

pub fn run(terminal: &mut DefaultTerminal, mut config: EngineConfig) -> EyreResult<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let stream_config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    config.sample_rate = stream_config.sample_rate().0 as f32;
    let channels = stream_config.channels() as usize;
    log::info!(
        "output device: {} Hz, {} channels",
        config.sample_rate,
        channels
    );

    let engine = Engine::new(&config).wrap_err("failed to build engine")?;
    let (mut audio, controller, scope_rx) =
        runtime::channel_with_scope(engine, CONTROL_RING, VIS_BLOCK_LEN * SCOPE_RING_BLOCKS);

    let stream = device
        .build_output_stream(
            &stream_config.into(),
            move |data: &mut [f32], _| audio.process(data, channels),
            |err| log::error!("stream error: {err}"),
            None,
        )
        .wrap_err("failed to build output stream")?;
    stream.play().wrap_err("failed to start output stream")?;

    let mut session = Session {
        controller,
        scope_rx,
        keyboard: Keyboard::new(&config),
        scope: vec![0.0; VIS_BLOCK_LEN],
        spectrum: SpectrumAnalyzer::new(VIS_BLOCK_LEN, config.sample_rate),
        ui: Ui::new(config.sample_rate),
    };
    session.run(terminal)
}

struct Session {
    controller: Controller,
    scope_rx: Consumer<f32>,
    keyboard: Keyboard,
    scope: Vec<f32>,
    spectrum: SpectrumAnalyzer,
    ui: Ui,
}

impl Session {
    fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        loop {
            if event::poll(CONTROL_PERIOD)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        match self.keyboard.handle(key.code) {
                            KeyAction::Quit => break,
                            KeyAction::Send(message) => {
                                if let Err(err) = self.controller.send(message) {
                                    log::warn!("{err}: dropped {:?}", message);
                                }
                            }
                            KeyAction::Handled => {}
                        }
                    }
                }
            }

            let inputs = self.keyboard.take_inputs();
            self.controller.control_tick(&inputs);
            self.poll_scope();

            let snapshot = *self.controller.latest();
            terminal.draw(|frame| {
                self.ui.render(
                    frame,
                    &snapshot,
                    &self.keyboard,
                    &self.scope,
                    self.spectrum.data(),
                )
            })?;
        }

        log::info!(
            "quitting, {} control messages dropped",
            self.controller.dropped()
        );
        Ok(())
    }

    /// Keep the newest full window of scope samples and analyze it.
    fn poll_scope(&mut self) {
        let available = self.scope_rx.slots();
        if available < VIS_BLOCK_LEN {
            return;
        }
        // Skip stale windows so the display tracks the live signal.
        let stale = available - available % VIS_BLOCK_LEN - VIS_BLOCK_LEN;
        for _ in 0..stale {
            let _ = self.scope_rx.pop();
        }
        for sample in self.scope.iter_mut() {
            match self.scope_rx.pop() {
                Ok(s) => *sample = s,
                Err(_) => break,
            }
        }
        self.spectrum.update(&self.scope);
    }
}
