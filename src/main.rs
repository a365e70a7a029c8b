use anyhow::{Context, Result};
use clap::Parser;
use std::{fs::OpenOptions, sync::Mutex};
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod config;
mod document;
mod tui;

use cli::Cli;
use config::Config;

#[tokio::main]
async fn main() {
    // Set up panic hook for graceful error recovery
    std::panic::set_hook(Box::new(|panic_info| {
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = crossterm::execute!(
            std::io::stdout(),
            crossterm::terminal::LeaveAlternateScreen,
            crossterm::event::DisableMouseCapture
        );
        error!("Application panicked: {}", panic_info);
        eprintln!("Application panicked: {}", panic_info);
        std::process::exit(1);
    }));

    // Load environment variables from .env file before reading MODAL_FORM_*
    let dotenv = dotenvy::dotenv();

    if let Err(e) = execute(dotenv.is_ok()).await {
        error!("Application error: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn execute(dotenv_loaded: bool) -> Result<()> {
    let cli = Cli::parse();
    let config = Config::init(cli.config.as_deref()).await?;

    init_logging(&config, cli.debug, cli.is_interactive())?;
    if !dotenv_loaded {
        debug!("No .env file found");
    }
    debug!(?config, "Configuration initialized");

    cli.execute(&config).await
}

/// Interactive mode logs to a file so the terminal stays clean; headless
/// commands log to stderr
fn init_logging(config: &Config, debug: bool, interactive: bool) -> Result<()> {
    let default_level = if debug { "modal_form=debug" } else { "modal_form=info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into());

    let (file_layer, stderr_layer) = if interactive {
        std::fs::create_dir_all(&config.data_dir).with_context(|| {
            format!("Failed to create data directory {}", config.data_dir.display())
        })?;
        let log_file = config.log_file();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .with_context(|| format!("Failed to open log file {}", log_file.display()))?;
        let layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(file));
        (Some(layer), None)
    } else {
        let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
        (None, Some(layer))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    Ok(())
}
