use anyhow::Result;

use crate::app::App;
use crate::render::terminal::{paint, Color};
use crate::OutputFormat;

pub fn run(app: &App, topic_name: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let topic = app.find_topic(topic_name)?;
    let seeder = app.ctx.seeder();

    let before = app.ctx.content.count(topic.id);
    let items = app.runtime.block_on(seeder.seed(topic));
    let added = items.len().saturating_sub(before);

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "topic": topic.id,
                "before": before,
                "added": added,
                "total": items.len(),
                "cap": topic.kind.cap(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if added == 0 {
                if items.len() >= topic.kind.seed_threshold() {
                    println!("{} already has a full deck ({} cards).", topic.name, items.len());
                } else {
                    println!(
                        "{}",
                        paint("No new cards this time. Try again later.", Color::YELLOW, use_color)
                    );
                }
            } else {
                let message = format!("Added {} cards to {} ({} total)", added, topic.name, items.len());
                println!("{}", paint(&message, Color::GREEN, use_color));
            }
        }
    }

    Ok(())
}
