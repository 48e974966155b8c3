//! The `download` subcommand: mirror one archive kind, then optionally
//! regrid the targets.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::Result;
use futures::{stream, StreamExt};

use loca::config::Roots;
use loca::download::{maybe_download, Outcome};
use loca::manifest::{self, Kind, Transfer};
use loca::remap::{maybe_remap, DEFAULT_OPERATOR};

use crate::cli::{create_progress_bar, create_spinner};

pub async fn download(
    kind: Kind,
    jobs: usize,
    remap_to: Option<PathBuf>,
    quick: bool,
    verbose: u8,
    config: Option<PathBuf>,
) -> Result<()> {
    let spinner = create_spinner("Building manifest".to_string());
    let roots = Roots::load(config.as_deref())?;
    let transfers = manifest::build(kind, &roots);
    spinner.finish_with_message(format!("{} transfers", transfers.len()));

    if verbose > 0 {
        for t in &transfers {
            println!("{} --> {}", t.remote, t.target.display());
        }
        println!("{} files", transfers.len());
    }

    let failures = download_all(&transfers, jobs, quick).await;
    report_failures("FAILED TO DOWNLOAD:", &failures);

    if let Some(gridfile) = remap_to {
        let failures = remap_all(&transfers, &gridfile, jobs, quick).await;
        let failures: BTreeSet<String> = failures
            .into_iter()
            .map(|p| p.display().to_string())
            .collect();
        report_failures("FAILED TO REMAP:", &failures);
    }

    Ok(())
}

/// Runs the transfers over a bounded worker pool; returns the failed remotes.
async fn download_all(transfers: &[Transfer], jobs: usize, quick: bool) -> BTreeSet<String> {
    let client = reqwest::Client::new();
    let pb = create_progress_bar(transfers.len() as u64, "Downloading files".to_string());

    let outcomes: Vec<Outcome> = stream::iter(transfers)
        .map(|transfer| {
            let client = client.clone();
            let pb = pb.clone();
            async move {
                let outcome = maybe_download(&client, transfer, quick).await;
                pb.inc(1);
                outcome
            }
        })
        .buffer_unordered(jobs.max(1))
        .collect()
        .await;
    pb.finish_with_message("Downloads complete");

    outcomes
        .into_iter()
        .filter_map(|o| match o {
            Outcome::Failed(remote) => Some(remote),
            _ => None,
        })
        .collect()
}

/// Regrids every target over the same bounded pool; returns failed inputs.
async fn remap_all(
    transfers: &[Transfer],
    gridfile: &Path,
    jobs: usize,
    quick: bool,
) -> Vec<PathBuf> {
    let pb = create_progress_bar(transfers.len() as u64, "Regridding files".to_string());

    let failures: Vec<Option<PathBuf>> = stream::iter(transfers)
        .map(|transfer| {
            let pb = pb.clone();
            async move {
                let failure =
                    maybe_remap(&transfer.target, gridfile, quick, DEFAULT_OPERATOR).await;
                pb.inc(1);
                failure
            }
        })
        .buffer_unordered(jobs.max(1))
        .collect()
        .await;
    pb.finish_with_message("Regridding complete");

    failures.into_iter().flatten().collect()
}

fn report_failures(header: &str, failures: &BTreeSet<String>) {
    println!("{}", header);
    for failure in failures {
        println!("  {}", failure);
    }
    if failures.is_empty() {
        println!("  (none)");
    }
}
