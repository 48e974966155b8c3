//! Command line interface.

pub mod command;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use loca::manifest::Kind;

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Archive mirroring tool for the downscaled climate datasets
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Mirror an archive locally, with optional regridding
    Download {
        /// Archive to mirror
        #[arg(value_enum)]
        kind: Kind,

        /// Number of concurrent transfers
        #[arg(long, default_value_t = 1)]
        jobs: usize,

        /// Grid description file; regrid downloaded files onto it with cdo
        #[arg(long)]
        remap_to: Option<PathBuf>,

        /// Skip the full QC check of existing files
        #[arg(long)]
        quick: bool,

        #[arg(short, long, action = clap::ArgAction::Count)]
        verbose: u8,

        /// Path to a roots config file (defaults to ~/.loca.toml)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Creates a spinner.
pub fn create_spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner().with_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));

    bar
}

/// Creates a progress bar.
pub fn create_progress_bar(size: u64, message: String) -> ProgressBar {
    ProgressBar::new(size).with_message(message).with_style(
        ProgressStyle::with_template("[{eta_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("##-"),
    )
}
