use std::path::Path;

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use lumiere_lib::illustration::IllustrationError;

use crate::app::App;
use crate::render::terminal::{paint, Color};
use crate::OutputFormat;

pub fn run(
    app: &App,
    term: &str,
    hint: Option<&str>,
    out: Option<&Path>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let illustrator = app.ctx.illustrator();
    let image = match app.runtime.block_on(illustrator.illustrate(term, hint)) {
        Ok(image) => image,
        Err(IllustrationError::CredentialRequired) => {
            bail!("An API key is needed for pictures. Run `lumiere-cli credential set` first.")
        }
        Err(IllustrationError::CredentialInvalid(msg)) => {
            bail!("The API key was rejected ({}). Run `lumiere-cli credential set` to pick another.", msg)
        }
        Err(IllustrationError::QuotaExhausted(msg)) => {
            bail!("The picture quota is used up for now ({}). Try again later.", msg)
        }
        Err(e) => return Err(e).context(format!("Failed to illustrate '{}'", term)),
    };

    let bytes = STANDARD
        .decode(image.data_base64.as_bytes())
        .context("Cached image is not valid base64")?;
    if let Some(path) = out {
        std::fs::write(path, &bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "term": image.term,
                "mimeType": image.mime_type,
                "bytes": bytes.len(),
                "createdAt": image.created_at.to_rfc3339(),
                "path": out.map(|p| p.to_string_lossy().to_string()),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            let summary = format!("{} ({}, {} bytes)", image.term, image.mime_type, bytes.len());
            println!("{}", paint(&summary, Color::GREEN, use_color));
            match out {
                Some(path) => println!("Saved to {}", path.display()),
                None => println!("{}", paint("Use --out <file> to save the picture.", Color::GRAY, use_color)),
            }
        }
    }

    Ok(())
}
