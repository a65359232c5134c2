mod aggregate;
mod cli;
mod commands;
mod config;
mod error;
mod io;
mod parity;
mod pdf;
mod pipeline;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input_dir,
            output_dir,
            odd_name,
            even_name,
            include,
            json,
        } => {
            let options = commands::run::RunOptions {
                input_dir,
                output_dir,
                odd_name,
                even_name,
                include,
                json,
            };
            commands::run::run(options).await?;
        }
        Commands::Plan {
            input_dir,
            include,
            json,
        } => {
            commands::plan::run(input_dir, include.as_deref(), json).await?;
        }
    }

    Ok(())
}
