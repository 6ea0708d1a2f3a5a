use std::path::Path;

use anyhow::Result;
use chrono::Utc;

use crate::app::App;
use crate::render::terminal as renderer;
use lumiere_lib::content::{all_topics, Topic};
use lumiere_lib::progress::{summarize, DashboardSummary};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    Topics,
    Cards,
    Dashboard,
}

pub struct TuiState {
    pub app: App,
    pub mode: Mode,

    // Topic list state
    pub topics: Vec<&'static Topic>,
    pub card_counts: Vec<usize>,
    pub topic_selected: usize,

    // Card panel state
    pub card_lines: Vec<String>,
    pub card_scroll: usize,

    // Dashboard state
    pub stars: u32,
    pub summary: DashboardSummary,

    // Key state for multi-char sequences
    pub pending_key: Option<char>,

    pub flash_message: Option<String>,
    pub show_help: bool,
    pub quit: bool,
}

impl TuiState {
    pub fn new(app: App) -> Result<Self> {
        let topics: Vec<&'static Topic> = all_topics().iter().collect();
        let progress = app.ctx.progress.state();
        let mut state = Self {
            app,
            mode: Mode::Topics,
            card_counts: Vec::new(),
            topics,
            topic_selected: 0,
            card_lines: Vec::new(),
            card_scroll: 0,
            stars: progress.stars,
            summary: summarize(&progress.history, Utc::now().date_naive()),
            pending_key: None,
            flash_message: None,
            show_help: false,
            quit: false,
        };
        state.refresh_counts();
        state.load_cards();
        Ok(state)
    }

    pub fn open(config_path: Option<&Path>) -> Result<Self> {
        Self::new(App::new(config_path)?)
    }

    pub fn selected_topic(&self) -> Option<&'static Topic> {
        self.topics.get(self.topic_selected).copied()
    }

    pub fn refresh_counts(&mut self) {
        self.card_counts = self
            .topics
            .iter()
            .map(|topic| self.app.ctx.content.count(topic.id))
            .collect();
    }

    pub fn refresh_progress(&mut self) {
        let progress = self.app.ctx.progress.state();
        self.stars = progress.stars;
        self.summary = summarize(&progress.history, Utc::now().date_naive());
    }

    /// Render the selected topic's cards into panel lines
    pub fn load_cards(&mut self) {
        self.card_scroll = 0;
        self.card_lines.clear();
        let Some(topic) = self.selected_topic() else {
            return;
        };
        for item in self.app.ctx.content.load(topic.id) {
            self.card_lines
                .extend(renderer::render_card(&item, false).lines().map(str::to_string));
            self.card_lines.push(String::new());
        }
    }

    pub fn topic_move_down(&mut self) {
        if self.topic_selected + 1 < self.topics.len() {
            self.topic_selected += 1;
            self.load_cards();
        }
    }

    pub fn topic_move_up(&mut self) {
        if self.topic_selected > 0 {
            self.topic_selected -= 1;
            self.load_cards();
        }
    }

    pub fn topic_go_top(&mut self) {
        self.topic_selected = 0;
        self.load_cards();
    }

    pub fn topic_go_bottom(&mut self) {
        self.topic_selected = self.topics.len().saturating_sub(1);
        self.load_cards();
    }

    pub fn scroll_cards(&mut self, delta: isize) {
        let max = self.card_lines.len().saturating_sub(1);
        self.card_scroll = self.card_scroll.saturating_add_signed(delta).min(max);
    }

    /// Fetch another batch of cards for the selected topic. Blocks the UI
    /// until the model answers.
    pub fn seed_selected(&mut self) {
        let Some(topic) = self.selected_topic() else {
            return;
        };
        let before = self.card_counts.get(self.topic_selected).copied().unwrap_or(0);
        if before >= topic.kind.seed_threshold() {
            self.flash_message = Some(format!("{} already has a full deck", topic.name));
            return;
        }

        let seeder = self.app.ctx.seeder();
        let items = self.app.runtime.block_on(seeder.seed(topic));
        let added = items.len().saturating_sub(before);
        self.flash_message = Some(if added == 0 {
            format!("No new cards for {} (see log)", topic.name)
        } else {
            format!("Added {} cards to {}", added, topic.name)
        });

        self.refresh_counts();
        self.load_cards();
    }
}
