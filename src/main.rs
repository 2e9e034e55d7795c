mod cli;
mod client;
mod config;
mod exec;
mod interpreter;
mod probe;
mod prompt;
mod session;
mod ui;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    cli::Cli::parse().run().await
}
