use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use super::app_state::{Mode, TuiState};
use super::{card_panel, dashboard_view, status_bar, topic_list};

const HELP_LINES: [&str; 9] = [
    " j/k, arrows   move / scroll",
    " gg / G        first / last topic",
    " Enter, l      open the topic's cards",
    " Esc, h        back to topics",
    " s             ask for more cards",
    " d             dashboard",
    " r             refresh dashboard",
    " ?             toggle this help",
    " q, Ctrl-C     quit",
];

pub fn draw(f: &mut Frame, state: &mut TuiState) {
    let size = f.area();

    // Main layout: content area + status bar
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(size);

    let main_area = outer[0];
    let status_area = outer[1];

    if state.mode == Mode::Dashboard {
        dashboard_view::draw(f, main_area, state);
    } else {
        // Horizontal split: topics (35%) | cards (65%)
        let panels = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(main_area);

        topic_list::draw(f, panels[0], state);
        card_panel::draw(f, panels[1], state);
    }

    status_bar::draw(f, status_area, state);

    if state.show_help {
        draw_help(f, main_area);
    }
}

fn draw_help(f: &mut Frame, area: Rect) {
    let width = 44.min(area.width);
    let height = (HELP_LINES.len() as u16 + 2).min(area.height);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };

    let lines: Vec<Line> = HELP_LINES.iter().map(|l| Line::from(*l)).collect();
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .title(" Keys ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        ),
        popup,
    );
}
