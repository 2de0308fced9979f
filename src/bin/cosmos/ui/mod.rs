//! TUI for cosmos
//!
//! Draws the engine snapshot as a front panel: transport line, the two step
//! rows with note names, the knob layer and the output scope/spectrum.

mod knobs;
pub mod spectrum;
mod steps;
mod transport;
mod waveform;

use cosmos_dsp::engine::EngineSnapshot;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use super::keys::Keyboard;

use knobs::render_knobs;
use spectrum::render_spectrum;
use steps::render_steps;
use transport::{render_transport, AudioStats};
use waveform::render_waveform;

pub struct Ui {
    sample_rate: f32,
}

impl Ui {
    pub fn new(sample_rate: f32) -> Self {
        Self { sample_rate }
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        snapshot: &EngineSnapshot,
        keyboard: &Keyboard,
        scope: &[f32],
        spectrum: &[(f64, f64)],
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Transport bar
                Constraint::Length(6), // Steps
                Constraint::Length(5), // Knobs
                Constraint::Min(8),    // Scope + spectrum
                Constraint::Length(1), // Help bar
            ])
            .split(frame.area());

        let stats = AudioStats::from_buffer(scope);
        render_transport(frame, chunks[0], snapshot, &stats, self.sample_rate);
        render_steps(frame, chunks[1], snapshot);
        render_knobs(frame, chunks[2], keyboard);

        let scope_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[3]);
        render_waveform(frame, scope_chunks[0], scope);
        render_spectrum(frame, scope_chunks[1], spectrum);

        let help = Paragraph::new(
            " [Space] Play/Stop  [1-8] Steps A  [a-k] Steps B  [Tab] Shift  [←→↑↓] Knobs  [w/m/n/b] Wave/Scale/Key/Stop  [Q] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[4]);
    }
}
