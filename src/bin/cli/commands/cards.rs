use anyhow::Result;

use crate::app::App;
use crate::render::terminal::{paint, render_card, Color};
use crate::OutputFormat;

pub fn run(app: &App, topic_name: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let topic = app.find_topic(topic_name)?;
    let items = app.ctx.content.load(topic.id);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        OutputFormat::Plain => {
            let title = format!("{} {} ({} cards)", topic.emoji, topic.name, items.len());
            println!("{}", paint(&title, Color::BOLD, use_color));
            println!();

            if items.is_empty() {
                println!("  (no cards yet, run `lumiere-cli seed {}`)", topic.id);
                return Ok(());
            }
            for item in &items {
                println!("{}", render_card(item, use_color));
                println!();
            }
        }
    }

    Ok(())
}
