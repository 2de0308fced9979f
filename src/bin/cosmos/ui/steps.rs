//! Step rows - both trigger tracks with the playhead, plus pitch names

use cosmos_dsp::engine::EngineSnapshot;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Blocks after a tick during which the playhead cell stays lit.
const BLINK_BLOCKS: u16 = 8;

pub fn render_steps(frame: &mut Frame, area: Rect, snapshot: &EngineSnapshot) {
    let block = Block::default().title(" Steps ").borders(Borders::ALL);
    let blink = snapshot.playing && snapshot.blocks_since_tick < BLINK_BLOCKS;

    let lines = vec![
        step_row(
            "A",
            snapshot.primary_steps(),
            snapshot.primary_step as usize,
            snapshot.playing,
            blink,
        ),
        pitch_row(snapshot),
        step_row(
            "B",
            snapshot.secondary_steps(),
            snapshot.secondary_step as usize,
            snapshot.playing,
            blink,
        ),
        envelope_row(snapshot),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn step_row(label: &str, steps: &[bool], current: usize, playing: bool, blink: bool) -> Line<'static> {
    let mut spans = vec![Span::styled(
        format!(" {label}  "),
        Style::default().fg(Color::DarkGray),
    )];
    for (i, &active) in steps.iter().enumerate() {
        let glyph = if active { "▓▓▓▓" } else { "░░░░" };
        let mut style = Style::default().fg(if active { Color::Cyan } else { Color::DarkGray });
        if playing && i == current {
            style = style.fg(if blink { Color::Yellow } else { Color::White });
            style = style.add_modifier(Modifier::BOLD);
        }
        spans.push(Span::styled(glyph, style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

fn pitch_row(snapshot: &EngineSnapshot) -> Line<'static> {
    let mut spans = vec![Span::styled(" ♪  ", Style::default().fg(Color::DarkGray))];
    for i in 0..snapshot.pitch_len as usize {
        let playing_here = snapshot.playing && i == snapshot.pitch_step as usize;
        let text = if playing_here {
            format!("[{:<3}", snapshot.step_label(i))
        } else {
            format!(" {:<3}", snapshot.step_label(i))
        };
        let style = if playing_here {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(text, style));
    }
    Line::from(spans)
}

fn envelope_row(snapshot: &EngineSnapshot) -> Line<'static> {
    Line::from(vec![
        Span::styled(" env ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("amp {:<10} ", bar(snapshot.amp_env, 10)),
            Style::default().fg(Color::LightGreen),
        ),
        Span::styled(
            format!("flt {:<10} ", bar(snapshot.filter_env, 10)),
            Style::default().fg(Color::LightBlue),
        ),
        Span::styled(
            format!(" osc {:.1}Hz", snapshot.osc_freq),
            Style::default().fg(Color::DarkGray),
        ),
    ])
}

fn bar(level: f32, width: usize) -> String {
    let filled = (level.clamp(0.0, 1.0) * width as f32).round() as usize;
    "█".repeat(filled)
}
