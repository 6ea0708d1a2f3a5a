use anyhow::Result;
use chrono::Utc;

use lumiere_lib::content::find_topic;
use lumiere_lib::progress::summarize;

use crate::app::App;
use crate::render::terminal::{mastery_bar, paint, Color};
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let state = app.ctx.progress.state();
    let summary = summarize(&state.history, Utc::now().date_naive());

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "stars": state.stars,
                "summary": summary,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            let stars = format!("★ {} stars from {} activities", state.stars, summary.activities);
            println!("{}", paint(&stars, Color::YELLOW, use_color));

            if summary.activities == 0 {
                println!();
                println!("  No activities yet. Try `lumiere-cli quiz animals`.");
                return Ok(());
            }

            println!();
            println!("{}", paint("Mastery", Color::BOLD, use_color));
            for mastery in &summary.topics {
                let name = find_topic(&mastery.topic).map(|t| t.name).unwrap_or(&mastery.topic);
                println!(
                    "  {:<18} {} {:>3}%",
                    name,
                    mastery_bar(mastery.mastery, 20, use_color),
                    mastery.mastery
                );
            }

            println!();
            println!("{}", paint("By category", Color::BOLD, use_color));
            for (category, points) in &summary.categories {
                println!("  {:<18} {:>5} pts", category.label(), points);
            }

            println!();
            println!("{}", paint("Last 7 days", Color::BOLD, use_color));
            let best = summary.trend.iter().map(|d| d.points).max().unwrap_or(0).max(1);
            for day in &summary.trend {
                let width = (day.points as usize * 20) / best as usize;
                println!(
                    "  {} {:<20} {}",
                    day.date.format("%a %d"),
                    paint(&"▇".repeat(width), Color::CYAN, use_color),
                    day.points
                );
            }
        }
    }

    Ok(())
}
