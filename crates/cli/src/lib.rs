pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use wayfarer_core::{AppConfig, LoadOptions, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "wayfarer",
    about = "Wayfarer journey specification bot",
    long_about = "Chat with the slot-filling journey bot locally and inspect its configuration.",
    after_help = "Examples:\n  wayfarer chat\n  wayfarer --config wayfarer.toml config"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a wayfarer.toml configuration file")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Chat with the bot over stdin/stdout")]
    Chat,
    #[command(about = "Inspect effective configuration values with secrets redacted")]
    Config,
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(LoadOptions {
        config_path: cli.config.clone(),
        require_file: cli.config.is_some(),
    }) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("configuration error: {error}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config);

    let result = match cli.command {
        Command::Chat => commands::chat::run(&config).await,
        Command::Config => {
            println!("{}", commands::config::run(&config));
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(config: &AppConfig) {
    use tracing::Level;
    use LogFormat::*;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}
