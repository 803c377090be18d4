//! Input/output level gauges

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Gauge},
    Frame,
};

/// Bottom of the gauge scale.
const FLOOR_DB: f32 = -60.0;

/// RMS to dBFS, floored so silence stays finite.
pub fn level_db(rms: f32) -> f32 {
    (20.0 * rms.max(1e-6).log10()).max(FLOOR_DB)
}

fn gauge_ratio(db: f32) -> f64 {
    ((db - FLOOR_DB) / -FLOOR_DB).clamp(0.0, 1.0) as f64
}

fn gauge_color(db: f32) -> Color {
    if db > -3.0 {
        Color::Red
    } else if db > -12.0 {
        Color::Yellow
    } else {
        Color::Green
    }
}

/// Render the smoothed input and output levels
pub fn render_meters(frame: &mut Frame, area: Rect, input_rms: f32, output_rms: f32, metering: bool) {
    let title = if metering { " Levels " } else { " Levels (paused) " };
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    for (row, (name, rms)) in [(0, ("in ", input_rms)), (2, ("out", output_rms))] {
        let db = level_db(rms);
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(gauge_color(db)))
            .ratio(gauge_ratio(db))
            .label(format!("{name} {db:>6.1} dB"));
        frame.render_widget(gauge, rows[row]);
    }
}
