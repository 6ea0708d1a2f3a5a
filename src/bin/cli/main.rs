mod app;
mod commands;
mod render;
#[cfg(feature = "tui")]
mod tui;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "lumiere-cli", about = "Lumière French coach CLI and TUI", version)]
struct Cli {
    /// Config file (default: <config dir>/lumiere/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// List topics with cached card counts
    Topics,

    /// Show the cached cards of a topic
    Cards {
        /// Topic id or name (case-insensitive prefix match)
        topic: String,
    },

    /// Generate another batch of cards for a topic
    Seed {
        /// Topic id or name
        topic: String,
    },

    /// Play a five-question quiz on a topic
    Quiz {
        /// Topic id or name
        topic: String,
    },

    /// Fetch (or reuse) the illustration for a French word
    Illustrate {
        /// French word or phrase
        term: String,
        /// English meaning, to steer the picture
        #[arg(long)]
        hint: Option<String>,
        /// Write the image to this file
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Pronounce a French word or sentence
    Say {
        /// Text to pronounce
        text: String,
        /// Write the clip to this WAV file
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Start a live speaking session
    Speak {
        /// conversation, oral-quiz or pronunciation
        #[arg(long, default_value = "conversation")]
        mode: String,
        /// Practise the words of this topic
        #[arg(long)]
        topic: Option<String>,
        /// Use a WAV file instead of the microphone
        #[arg(long)]
        wav: Option<PathBuf>,
        /// Save the coach's replies to this WAV file
        #[arg(long)]
        record: Option<PathBuf>,
        /// Do not play the coach's replies
        #[arg(long)]
        mute: bool,
        /// Stop after this many seconds
        #[arg(long, default_value = "120")]
        seconds: u64,
    },

    /// Show stars, mastery per topic and the weekly trend
    Dashboard,

    /// Ask the coach for a progress report for parents
    Report,

    /// Manage the API key
    #[command(subcommand)]
    Credential(CredentialCommand),

    /// Launch interactive TUI
    #[cfg(feature = "tui")]
    Tui,
}

#[derive(Subcommand)]
enum CredentialCommand {
    /// Store an API key (prompts when omitted)
    Set {
        key: Option<String>,
    },

    /// Forget the stored API key
    Clear,

    /// Show whether a key is selected
    Status,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && std::io::stdout().is_terminal();
    let config = cli.config.as_deref();

    match cli.command {
        None => {
            // No subcommand → launch TUI
            #[cfg(feature = "tui")]
            {
                tui::run(config)?;
            }
            #[cfg(not(feature = "tui"))]
            {
                eprintln!("TUI not available (built without 'tui' feature). Use a subcommand.");
                eprintln!("Run with --help for usage.");
                std::process::exit(1);
            }
        }
        Some(Command::Topics) => {
            let app = app::App::new(config)?;
            commands::topics::run(&app, &cli.format, use_color)?;
        }
        Some(Command::Cards { topic }) => {
            let app = app::App::new(config)?;
            commands::cards::run(&app, &topic, &cli.format, use_color)?;
        }
        Some(Command::Seed { topic }) => {
            let app = app::App::new(config)?;
            commands::seed::run(&app, &topic, &cli.format, use_color)?;
        }
        Some(Command::Quiz { topic }) => {
            let app = app::App::new(config)?;
            commands::quiz::run(&app, &topic, &cli.format, use_color)?;
        }
        Some(Command::Illustrate { term, hint, out }) => {
            let app = app::App::new(config)?;
            commands::illustrate::run(
                &app,
                &term,
                hint.as_deref(),
                out.as_deref(),
                &cli.format,
                use_color,
            )?;
        }
        Some(Command::Say { text, out }) => {
            let app = app::App::new(config)?;
            commands::say::run(&app, &text, out.as_deref(), &cli.format, use_color)?;
        }
        Some(Command::Speak { mode, topic, wav, record, mute, seconds }) => {
            let app = app::App::new(config)?;
            let options = commands::speak::SpeakOptions {
                mode: mode.parse().map_err(anyhow::Error::msg)?,
                topic,
                wav,
                record,
                mute,
                seconds,
            };
            commands::speak::run(&app, options, &cli.format, use_color)?;
        }
        Some(Command::Dashboard) => {
            let app = app::App::new(config)?;
            commands::dashboard::run(&app, &cli.format, use_color)?;
        }
        Some(Command::Report) => {
            let app = app::App::new(config)?;
            commands::report::run(&app, &cli.format, use_color)?;
        }
        Some(Command::Credential(subcmd)) => {
            let app = app::App::new(config)?;
            match subcmd {
                CredentialCommand::Set { key } => {
                    commands::credential::run_set(&app, key, &cli.format, use_color)?;
                }
                CredentialCommand::Clear => {
                    commands::credential::run_clear(&app, &cli.format, use_color)?;
                }
                CredentialCommand::Status => {
                    commands::credential::run_status(&app, &cli.format, use_color)?;
                }
            }
        }
        #[cfg(feature = "tui")]
        Some(Command::Tui) => {
            tui::run(config)?;
        }
    }

    Ok(())
}
