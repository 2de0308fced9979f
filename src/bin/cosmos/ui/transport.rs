//! Transport bar widget - play state, tempo, CPU load and audio stats

use cosmos_dsp::engine::EngineSnapshot;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Audio statistics for display
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

pub fn render_transport(
    frame: &mut Frame,
    area: Rect,
    snapshot: &EngineSnapshot,
    stats: &AudioStats,
    sample_rate: f32,
) {
    let block = Block::default().title(" cosmos ").borders(Borders::ALL);

    let play_symbol = if snapshot.playing { "▶" } else { "■" };
    let play_state_str = if snapshot.playing { "Playing" } else { "Stopped" };
    let cpu_color = if snapshot.cpu_percent > 80.0 {
        Color::Red
    } else {
        Color::DarkGray
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" BPM: {:.0}{}  ", snapshot.bpm, snapshot.multiplier.label()),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("{} {}  ", play_symbol, play_state_str),
            Style::default().fg(if snapshot.playing {
                Color::Green
            } else {
                Color::Yellow
            }),
        ),
        Span::styled(
            format!(
                "{} {}  {:+}st  {}  ",
                snapshot.key_name(),
                snapshot.scale.name(),
                snapshot.transpose,
                snapshot.waveform.name()
            ),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!(
                "cutoff {:.0}Hz  Q {:.2}  ",
                snapshot.filter_freq, snapshot.filter_q
            ),
            Style::default().fg(Color::LightBlue),
        ),
        Span::styled(
            format!("CPU {:.1}%  {:.1}kHz  ", snapshot.cpu_percent, sample_rate / 1000.0),
            Style::default().fg(cpu_color),
        ),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}", stats.peak, stats.rms),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}
