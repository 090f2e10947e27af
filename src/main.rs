mod cli;
mod commands;
mod mcp;
mod pdf;
mod selection;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Mcp => {
            mcp::run_server().await?;
        }
        Commands::Toc { path } => {
            commands::toc::run(&path)?;
        }
        Commands::Extract {
            path,
            selection,
            output,
        } => {
            commands::extract::run(&path, &selection, output.as_deref())?;
        }
        Commands::Report { path, output } => {
            commands::report::run(&path, output.as_deref())?;
        }
    }

    Ok(())
}
