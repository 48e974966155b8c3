mod cli;

use anyhow::{Error, Result};
use clap::Parser;
use cli::{command, Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Download {
            kind,
            jobs,
            remap_to,
            quick,
            verbose,
            config,
        } => {
            if let Err(e) = command::download(kind, jobs, remap_to, quick, verbose, config).await {
                eprintln!("Error: {}", e);
            }
        }
    }

    Ok(())
}
