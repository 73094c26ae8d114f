mod cli;
mod client;
mod commands;
mod config;
mod observability;
mod output;
mod prompt;
mod settings;
mod signer;

use anyhow::Result;
use clap::Parser;

use cli::Cli;
use output::print_error;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    observability::init_tracing(&cli.log_level);
    commands::tag::run(&cli).await
}
