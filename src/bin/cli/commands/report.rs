use anyhow::{bail, Result};
use chrono::Utc;

use lumiere_lib::progress::{generate_report, summarize};

use crate::app::App;
use crate::render::terminal::{paint, wrap_lines, Color};
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let state = app.ctx.progress.state();
    let summary = summarize(&state.history, Utc::now().date_naive());
    if summary.activities == 0 {
        bail!("No activities recorded yet. Play a quiz or a speaking session first.");
    }

    let learner = app.ctx.config.learner_name.as_deref();
    let Some(report) = app
        .runtime
        .block_on(generate_report(app.ctx.client.as_ref(), &summary, learner))
    else {
        bail!("Could not write a report right now. Check your API key and try again.");
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Plain => {
            for line in wrap_lines(&report.summary, "", 78) {
                println!("{}", line);
            }
            let sections = [
                ("Strengths", &report.strengths, Color::GREEN),
                ("To work on", &report.focus_areas, Color::YELLOW),
                ("Try next", &report.next_steps, Color::CYAN),
            ];
            for (title, items, code) in sections {
                if items.is_empty() {
                    continue;
                }
                println!();
                println!("{}", paint(title, code, use_color));
                for item in items {
                    for (i, line) in wrap_lines(item, "    ", 74).into_iter().enumerate() {
                        if i == 0 {
                            println!("  • {}", line.trim_start());
                        } else {
                            println!("{}", line);
                        }
                    }
                }
            }
        }
    }

    Ok(())
}
