//! Stage list widget - processing order, bypass state and parameters

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

use super::state::StageView;

/// Render the chain, one numbered row per stage
pub fn render_chain(frame: &mut Frame, area: Rect, stages: &[StageView]) {
    let block = Block::default().title(" Chain ").borders(Borders::ALL);

    let items: Vec<ListItem> = stages
        .iter()
        .enumerate()
        .map(|(i, stage)| {
            let (status, style) = if stage.inert {
                ("no IR", Style::default().fg(Color::Red))
            } else if stage.bypassed {
                ("bypassed", Style::default().fg(Color::DarkGray))
            } else {
                ("active", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!(" [{}] ", i + 1), Style::default().fg(Color::Cyan)),
                Span::styled(format!("{:<12}", stage.kind.name()), style),
                Span::styled(format!("{status:<10}"), style),
                Span::styled(
                    stage.config.map(|config| config.to_string()).unwrap_or_default(),
                    Style::default().fg(Color::Gray),
                ),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
