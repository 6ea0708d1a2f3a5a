use anyhow::Result;

use lumiere_lib::content::{topics_in, Category};

use crate::app::App;
use crate::render::terminal::{paint, Color};
use crate::OutputFormat;

const CATEGORIES: [Category; 2] = [Category::Vocabulary, Category::Grammar];

pub fn run(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = CATEGORIES
                .iter()
                .flat_map(|category| topics_in(*category))
                .map(|topic| {
                    serde_json::json!({
                        "id": topic.id,
                        "name": topic.name,
                        "category": topic.category,
                        "emoji": topic.emoji,
                        "cards": app.ctx.content.count(topic.id),
                        "cap": topic.kind.cap(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            for category in CATEGORIES {
                println!("{}", paint(category.label(), Color::BOLD, use_color));
                for topic in topics_in(category) {
                    let count = app.ctx.content.count(topic.id);
                    let cards = format!("{}/{} cards", count, topic.kind.cap());
                    println!(
                        "  {} {:<16} {:<18} {}",
                        topic.emoji,
                        topic.id,
                        topic.name,
                        paint(&cards, Color::GRAY, use_color)
                    );
                }
                println!();
            }
        }
    }

    Ok(())
}
