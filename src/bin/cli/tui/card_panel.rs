use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use super::app_state::{Mode, TuiState};

pub fn draw(f: &mut Frame, area: Rect, state: &TuiState) {
    let is_active = state.mode == Mode::Cards;

    let title = match state.selected_topic() {
        Some(topic) => format!(" {} {} ", topic.emoji, topic.name),
        None => " Cards ".to_string(),
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(if is_active {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        });

    if state.card_lines.is_empty() {
        let help_text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "  No cards for this topic yet.",
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "  Press s to ask the coach for a batch.",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        f.render_widget(Paragraph::new(help_text).block(block), area);
        return;
    }

    let text: Vec<Line> = state
        .card_lines
        .iter()
        .skip(state.card_scroll)
        .map(|line| {
            if line.starts_with("    [") {
                Line::from(Span::styled(line.clone(), Style::default().fg(Color::DarkGray)))
            } else if line.starts_with("    ") {
                Line::from(Span::styled(
                    line.clone(),
                    Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
                ))
            } else {
                Line::from(Span::styled(
                    line.clone(),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ))
            }
        })
        .collect();

    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}
