use ratatui::prelude::*;
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Gauge, Paragraph};

use super::app_state::TuiState;
use lumiere_lib::content::find_topic;

/// Topics shown with a mastery gauge
const MAX_GAUGES: usize = 8;

pub fn draw(f: &mut Frame, area: Rect, state: &TuiState) {
    let summary = &state.summary;

    let [header_area, body_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(5)]).areas(area);
    let [mastery_area, trend_area] =
        Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).areas(body_area);

    let categories: Vec<String> = summary
        .categories
        .iter()
        .map(|(category, points)| format!("{}: {}", category.label(), points))
        .collect();
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" ★ {} stars ", state.stars),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" {} activities  ", summary.activities)),
        Span::styled(categories.join("  "), Style::default().fg(Color::Cyan)),
    ]))
    .block(Block::default().borders(Borders::ALL).title(" Progress "));
    f.render_widget(header, header_area);

    draw_mastery(f, mastery_area, state);
    draw_trend(f, trend_area, state);
}

fn draw_mastery(f: &mut Frame, area: Rect, state: &TuiState) {
    let block = Block::default().borders(Borders::ALL).title(" Mastery ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    if state.summary.topics.is_empty() {
        let empty = Paragraph::new(" Play a quiz to start filling these bars.")
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(empty, inner);
        return;
    }

    let shown: Vec<_> = state.summary.topics.iter().take(MAX_GAUGES).collect();
    let rows = Layout::vertical(vec![Constraint::Length(1); shown.len()]).split(inner);
    for (row, mastery) in rows.iter().zip(shown) {
        let name = find_topic(&mastery.topic).map(|t| t.name).unwrap_or(&mastery.topic);
        let color = if mastery.mastery >= 100 { Color::Green } else { Color::Cyan };
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(color).bg(Color::Black))
            .percent(u16::from(mastery.mastery))
            .label(format!("{} {}%", name, mastery.mastery));
        f.render_widget(gauge, *row);
    }
}

fn draw_trend(f: &mut Frame, area: Rect, state: &TuiState) {
    let bars: Vec<Bar> = state
        .summary
        .trend
        .iter()
        .map(|day| {
            Bar::default()
                .value(u64::from(day.points))
                .label(Line::from(day.date.format("%a").to_string()))
        })
        .collect();

    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(" Last 7 days "))
        .data(BarGroup::default().bars(&bars))
        .bar_width(4)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));
    f.render_widget(chart, area);
}
