//! Downloads archive files with a QC check and bounded retries.
//!
//! A target that already passes QC is never re-fetched. A fetch that fails,
//! or whose result fails QC, is retried up to [`MAX_TRIES`] times; empty
//! partial files are removed so a later run does not mistake them for data.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use futures::StreamExt;

use crate::error::Result;
use crate::manifest::Transfer;

pub const MAX_TRIES: usize = 5;

/// What became of one transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Target already passed QC.
    AlreadyDownloaded,
    Downloaded,
    /// All attempts exhausted; carries the remote URL for reporting.
    Failed(String),
}

/// Downloads one transfer unless its target already passes QC.
pub async fn maybe_download(client: &reqwest::Client, transfer: &Transfer, quick: bool) -> Outcome {
    if qc_passes(&transfer.target, quick) {
        return Outcome::AlreadyDownloaded;
    }

    for _ in 0..MAX_TRIES {
        match fetch(client, &transfer.remote, &transfer.target).await {
            Ok(()) if qc_passes(&transfer.target, quick) => return Outcome::Downloaded,
            Ok(()) | Err(_) => {
                let _ = remove_if_empty(&transfer.target);
            }
        }
    }
    Outcome::Failed(transfer.remote.clone())
}

/// True when the target looks like a previously completed download. Quick
/// mode only checks for a non-empty file; full mode opens it as netCDF and
/// walks the variables.
pub fn qc_passes(target: &Path, quick: bool) -> bool {
    let Ok(meta) = fs::metadata(target) else {
        return false;
    };
    if !meta.is_file() || meta.len() == 0 {
        return false;
    }
    if quick {
        return true;
    }

    match netcdf::open(target) {
        Ok(file) => file.variables().count() > 0,
        Err(_) => false,
    }
}

/// Streams `remote` into `target`, creating parent directories. An empty
/// result is removed and reported by the QC check on the caller's side.
async fn fetch(client: &reqwest::Client, remote: &str, target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }

    let response = client.get(remote).send().await?.error_for_status()?;

    let mut file = File::create(target)?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        file.write_all(&chunk?)?;
    }
    drop(file);

    remove_if_empty(target)?;
    Ok(())
}

/// Removes a zero-length partial file if one was left behind.
pub fn remove_if_empty(target: &Path) -> Result<()> {
    if let Ok(meta) = fs::metadata(target) {
        if meta.len() == 0 {
            fs::remove_file(target)?;
        }
    }
    Ok(())
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn should_fail_qc_for_missing_or_empty_file() {
        let dir = TempDir::new().unwrap();
        assert!(!qc_passes(&dir.path().join("absent.nc"), true));

        let empty = dir.path().join("empty.nc");
        fs::write(&empty, b"").unwrap();
        assert!(!qc_passes(&empty, true));
    }

    #[test]
    fn should_pass_quick_qc_for_any_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("partial.nc");
        fs::write(&path, b"not actually netcdf").unwrap();
        assert!(qc_passes(&path, true));
        // Full QC sees through it.
        assert!(!qc_passes(&path, false));
    }

    #[test]
    fn should_pass_full_qc_for_valid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("good.nc");
        {
            let mut file = netcdf::create(&path).unwrap();
            file.add_dimension("time", 1).unwrap();
            let mut var = file.add_variable::<f64>("pr", &["time"]).unwrap();
            var.put_values(&[1.0], ..).unwrap();
        }
        assert!(qc_passes(&path, false));
    }

    #[test]
    fn should_remove_empty_partials_only() {
        let dir = TempDir::new().unwrap();

        let empty = dir.path().join("empty.nc");
        fs::write(&empty, b"").unwrap();
        remove_if_empty(&empty).unwrap();
        assert!(!empty.exists());

        let full = dir.path().join("full.nc");
        fs::write(&full, b"data").unwrap();
        remove_if_empty(&full).unwrap();
        assert!(full.exists());
    }

    #[tokio::test]
    async fn should_skip_target_that_passes_qc() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("done.nc");
        fs::write(&target, b"data").unwrap();

        let client = reqwest::Client::new();
        let transfer = Transfer {
            // Unroutable; reaching the network here would fail the test.
            remote: "http://127.0.0.1:1/unreachable.nc".to_string(),
            target,
        };

        let outcome = maybe_download(&client, &transfer, true).await;
        assert_eq!(outcome, Outcome::AlreadyDownloaded);
    }

    #[tokio::test]
    async fn should_report_failure_after_retries() {
        let dir = TempDir::new().unwrap();
        let client = reqwest::Client::new();
        let transfer = Transfer {
            remote: "http://127.0.0.1:1/unreachable.nc".to_string(),
            target: dir.path().join("never.nc"),
        };

        let outcome = maybe_download(&client, &transfer, true).await;
        assert_eq!(outcome, Outcome::Failed(transfer.remote.clone()));
        assert!(!transfer.target.exists());
    }
}
