use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use super::app_state::{Mode, TuiState};

pub fn draw(f: &mut Frame, area: Rect, state: &TuiState) {
    // Show flash message if present
    if let Some(ref msg) = state.flash_message {
        let flash = Paragraph::new(format!(" {}", msg))
            .style(Style::default().bg(Color::Green).fg(Color::Black));
        f.render_widget(flash, area);
        return;
    }

    let hints = match state.mode {
        Mode::Topics => " j/k: navigate  Enter: cards  s: seed  d: dashboard  ?: help  q: quit ",
        Mode::Cards => " Esc: back  j/k: scroll  d/u: page  s: seed  q: quit ",
        Mode::Dashboard => " Esc: back  r: refresh  q: quit ",
    };
    let stars = format!("★ {} ", state.stars);

    let [hint_area, stars_area] = Layout::horizontal([
        Constraint::Min(1),
        Constraint::Length(stars.chars().count() as u16),
    ])
    .areas(area);

    f.render_widget(
        Paragraph::new(hints).style(Style::default().bg(Color::DarkGray).fg(Color::White)),
        hint_area,
    );
    f.render_widget(
        Paragraph::new(stars).style(Style::default().bg(Color::DarkGray).fg(Color::Yellow)),
        stars_area,
    );
}
