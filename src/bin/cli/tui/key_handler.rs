use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app_state::{Mode, TuiState};

pub fn handle_key(state: &mut TuiState, key: KeyEvent) {
    // Clear flash message on any keypress
    state.flash_message = None;

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.quit = true;
        return;
    }

    match state.mode {
        Mode::Topics => handle_topics_key(state, key),
        Mode::Cards => handle_cards_key(state, key),
        Mode::Dashboard => handle_dashboard_key(state, key),
    }
}

fn handle_topics_key(state: &mut TuiState, key: KeyEvent) {
    // Handle pending 'g' key
    if state.pending_key == Some('g') {
        state.pending_key = None;
        if key.code == KeyCode::Char('g') {
            state.topic_go_top();
            return;
        }
    }

    match key.code {
        KeyCode::Char('q') => state.quit = true,
        KeyCode::Char('j') | KeyCode::Down => state.topic_move_down(),
        KeyCode::Char('k') | KeyCode::Up => state.topic_move_up(),
        KeyCode::Char('l') | KeyCode::Right | KeyCode::Enter | KeyCode::Tab => {
            if !state.card_lines.is_empty() {
                state.mode = Mode::Cards;
            }
        }
        KeyCode::Char('g') => state.pending_key = Some('g'),
        KeyCode::Char('G') => state.topic_go_bottom(),
        KeyCode::Char('s') => state.seed_selected(),
        KeyCode::Char('d') => open_dashboard(state),
        KeyCode::Char('?') => state.show_help = !state.show_help,
        _ => {}
    }
}

fn handle_cards_key(state: &mut TuiState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => state.quit = true,
        KeyCode::Esc | KeyCode::Char('h') | KeyCode::Left | KeyCode::Tab => {
            state.mode = Mode::Topics;
        }
        KeyCode::Char('j') | KeyCode::Down => state.scroll_cards(1),
        KeyCode::Char('k') | KeyCode::Up => state.scroll_cards(-1),
        KeyCode::Char('d') | KeyCode::PageDown => state.scroll_cards(10),
        KeyCode::Char('u') | KeyCode::PageUp => state.scroll_cards(-10),
        KeyCode::Char('s') => state.seed_selected(),
        KeyCode::Char('?') => state.show_help = !state.show_help,
        _ => {}
    }
}

fn handle_dashboard_key(state: &mut TuiState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => state.quit = true,
        KeyCode::Esc | KeyCode::Char('d') => state.mode = Mode::Topics,
        KeyCode::Char('r') => {
            state.refresh_progress();
            state.flash_message = Some("Progress refreshed".to_string());
        }
        KeyCode::Char('?') => state.show_help = !state.show_help,
        _ => {}
    }
}

fn open_dashboard(state: &mut TuiState) {
    state.refresh_progress();
    state.mode = Mode::Dashboard;
}
