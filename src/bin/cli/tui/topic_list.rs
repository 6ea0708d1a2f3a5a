use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

use super::app_state::{Mode, TuiState};
use lumiere_lib::content::Category;

pub fn draw(f: &mut Frame, area: Rect, state: &TuiState) {
    let is_active = state.mode == Mode::Topics;

    let block = Block::default()
        .title(" Topics ")
        .borders(Borders::ALL)
        .border_style(if is_active {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        });

    let items: Vec<ListItem> = state
        .topics
        .iter()
        .enumerate()
        .map(|(i, topic)| {
            let count = state.card_counts.get(i).copied().unwrap_or(0);
            let cap = topic.kind.cap();
            let style = match topic.category {
                Category::Grammar => Style::default().fg(Color::Magenta),
                _ => Style::default().fg(Color::White),
            };
            let count_style = if count >= cap {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} {:<16}", topic.emoji, topic.name), style),
                Span::styled(format!("{:>3}/{}", count, cap), count_style),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(if is_active { Color::DarkGray } else { Color::Black })
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut list_state = ListState::default();
    list_state.select(Some(state.topic_selected));

    f.render_stateful_widget(list, area, &mut list_state);
}
