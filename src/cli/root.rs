use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use super::submit::SubmitCommand;
use crate::{config::Config, tui};

/// Application form in a modal dialog, for your terminal
#[derive(Parser)]
#[command(
    name = "modal-form",
    version,
    about = "Application form in a modal dialog, for your terminal",
    long_about = r#"Shows a scrollable page with a button that opens an application form in a modal dialog.
The dialog locks page scrolling, closes on Escape or a click on the backdrop, and returns
focus to the button when it closes.

Examples:
  modal-form                                                   # Start interactive mode
  modal-form submit --name 홍길동 --email hong@example.com --career 1
  modal-form --config ./modal-form.json                        # Use an explicit config file"#
)]
pub struct Cli {
    /// Configuration file to use instead of the default search path
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate and submit the form without the terminal UI
    Submit(SubmitCommand),
}

impl Cli {
    /// Whether this invocation takes over the terminal
    pub fn is_interactive(&self) -> bool {
        self.command.is_none()
    }

    pub async fn execute(self, config: &Config) -> Result<()> {
        match self.command {
            Some(Commands::Submit(submit)) => submit.execute(),
            None => {
                info!("Starting interactive mode");
                tui::run(config).await?;
                info!("Application finished");
                Ok(())
            }
        }
    }
}
