//! Knob row - the eight knobs of the current shift layer

use cosmos_dsp::control::{Layer, KNOB_COUNT};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Gauge},
    Frame,
};

use crate::keys::Keyboard;

pub fn render_knobs(frame: &mut Frame, area: Rect, keyboard: &Keyboard) {
    let layer = keyboard.layer();
    let title = match layer {
        Layer::Main => " Knobs ",
        Layer::Shift1 => " Knobs [shift 1] ",
        Layer::Shift2 => " Knobs [shift 2] ",
        Layer::Both => " Knobs [shift 1+2] ",
    };
    let block = Block::default()
        .title(title)
        .title_bottom(format!(" stop: {:?} ", keyboard.stop_behavior()))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, KNOB_COUNT as u32); KNOB_COUNT])
        .split(inner);

    for (knob, (&value, cell)) in keyboard.knob_values().iter().zip(cells.iter()).enumerate() {
        let label = match layer {
            Layer::Shift2 => format!("note {}", knob + 1),
            _ => layer.knob_label(knob).to_string(),
        };
        let color = if knob == keyboard.selected() {
            Color::Yellow
        } else {
            Color::DarkGray
        };
        let gauge = Gauge::default()
            .block(Block::default().title(label))
            .gauge_style(Style::default().fg(color))
            .ratio(value.clamp(0.0, 1.0) as f64)
            .label(format!("{:.2}", value));
        frame.render_widget(gauge, *cell);
    }
}
