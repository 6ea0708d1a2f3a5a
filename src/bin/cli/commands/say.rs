use std::path::Path;

use anyhow::{Context, Result};

use lumiere_lib::narration::write_wav;

use crate::app::App;
use crate::render::terminal::{paint, Color};
use crate::OutputFormat;

pub fn run(
    app: &App,
    text: &str,
    out: Option<&Path>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let narrator = app.ctx.narrator();
    let clip = app
        .runtime
        .block_on(narrator.pronounce(text))
        .with_context(|| format!("Failed to pronounce '{}'", text))?;

    if let Some(path) = out {
        write_wav(&clip, path).with_context(|| format!("Failed to write {}", path.display()))?;
    }

    let seconds = clip.samples.len() as f64 / f64::from(clip.sample_rate.max(1));
    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "text": clip.text,
                "sampleRate": clip.sample_rate,
                "seconds": seconds,
                "path": out.map(|p| p.to_string_lossy().to_string()),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            let summary = format!("{} ({:.1}s at {} Hz)", clip.text, seconds, clip.sample_rate);
            println!("{}", paint(&summary, Color::GREEN, use_color));
            match out {
                Some(path) => println!("Saved to {}", path.display()),
                None => println!("{}", paint("Use --out <file.wav> to save the clip.", Color::GRAY, use_color)),
            }
        }
    }

    Ok(())
}
