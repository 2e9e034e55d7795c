use anyhow::Result;
use clap::{Parser, Subcommand};

use super::commands;

/// Entry point for the `shai` command-line interface.
#[derive(Debug, Parser)]
#[command(
    name = "shai",
    about = "Turn plain-English requests into shell commands with a local Ollama model",
    version,
    long_about = None
)]
pub struct Cli {
    /// Optional subcommand (e.g., `config`)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Override the Ollama model
    #[arg(short = 'm', long = "model")]
    pub model: Option<String>,

    /// Override the Ollama server URL
    #[arg(long = "base-url")]
    pub base_url: Option<String>,

    /// Set request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Automatic re-queries allowed after failed commands in one turn
    #[arg(long = "max-retries")]
    pub max_retries: Option<u32>,

    /// Print plain text instead of coloured panels
    #[arg(long)]
    pub plain: bool,

    /// Enable debug logging on stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// First request: words typed after `shai`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub request: Vec<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the effective configuration as JSON.
    Config,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        commands::run(self).await
    }

    /// Trailing words joined into one request, if any were given.
    pub fn initial_request(&self) -> Option<String> {
        let request = self.request.join(" ").trim().to_owned();
        (!request.is_empty()).then_some(request)
    }
}
