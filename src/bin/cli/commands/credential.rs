use anyhow::{bail, Context, Result};

use lumiere_lib::credentials::CredentialProvider;

use crate::app::{read_line, App};
use crate::render::terminal::{paint, Color};
use crate::OutputFormat;

pub fn run_set(app: &App, key: Option<String>, format: &OutputFormat, use_color: bool) -> Result<()> {
    let key = match key {
        Some(key) => key,
        None => {
            eprint!("Gemini API key: ");
            read_line().unwrap_or_default()
        }
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("No key given");
    }

    app.ctx
        .credentials
        .store_key(key)
        .context("Failed to store API key")?;

    print_status(app, "API key saved.", format, use_color)
}

pub fn run_clear(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    app.ctx
        .credentials
        .clear()
        .context("Failed to clear API key")?;

    print_status(app, "Stored API key removed.", format, use_color)
}

pub fn run_status(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let message = if app.ctx.credentials.has_selected() {
        "An API key is selected."
    } else {
        "No API key selected. Run `lumiere-cli credential set`."
    };
    print_status(app, message, format, use_color)
}

fn print_status(app: &App, message: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let selected = app.ctx.credentials.has_selected();
    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({ "selected": selected });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            let code = if selected { Color::GREEN } else { Color::YELLOW };
            println!("{}", paint(message, code, use_color));
        }
    }
    Ok(())
}
