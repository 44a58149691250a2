pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use docket_core::config::{AppConfig, LoadOptions, LogFormat};
use docket_core::Language;

#[derive(Debug, Parser)]
#[command(
    name = "docket",
    about = "Docket document wizard CLI",
    long_about = "Create purchase orders, quotations and sales agreements through the section-by-section wizard.",
    after_help = "Examples:\n  docket config\n  docket preview --kind po --input order.json\n  docket create --kind quotation --input quote.json --user ops"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a docket.toml config file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Run the wizard over a JSON input file and submit the document")]
    Create {
        #[arg(long, help = "Document kind: po, quotation or agreement")]
        kind: String,
        #[arg(long, help = "JSON file with a `sections` array")]
        input: PathBuf,
        #[arg(long, help = "Principal id the document is created for")]
        user: Option<String>,
    },
    #[command(about = "Render the document preview without submitting")]
    Preview {
        #[arg(long, help = "Document kind: po, quotation or agreement")]
        kind: String,
        #[arg(long, help = "JSON file with a `sections` array")]
        input: PathBuf,
        #[arg(long, help = "Preview language: en or ar")]
        language: Option<Language>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = LoadOptions { config_path: cli.config, ..LoadOptions::default() };

    init_logging(&logging_config(&options));

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run(&options) }
        }
        Command::Create { kind, input, user } => {
            commands::create::run(&options, &kind, &input, user.as_deref())
        }
        Command::Preview { kind, input, language } => {
            commands::preview::run(&options, &kind, &input, language)
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// The config logging is set up from. A config that fails to load falls back to
/// the defaults here; the subcommand itself still reports `config_validation`.
pub fn logging_config(options: &LoadOptions) -> AppConfig {
    AppConfig::load(options.clone()).unwrap_or_default()
}

/// Logs go to stderr so command payloads on stdout stay machine-readable.
pub fn init_logging(config: &AppConfig) {
    use tracing::Level;
    use LogFormat::*;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    match config.logging.format {
        Compact => builder.compact().init(),
        Pretty => builder.pretty().init(),
        Json => builder.json().init(),
    }
}
