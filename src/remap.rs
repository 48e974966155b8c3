//! Regrids downloaded files with the external `cdo` tool.
//!
//! Regridding is conservative remapping (`remapcon`) onto a grid description
//! file. Output lands in an `8th` tree mirroring the `16th` input layout.

use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::download::qc_passes;

pub const DEFAULT_OPERATOR: &str = "remapcon";

/// Output path for a regridded file: the `16th` path component becomes
/// `8th`; files without one get an `8th` directory next to them.
pub fn remap_output_path(infile: &Path) -> PathBuf {
    let components: Vec<&str> = infile
        .iter()
        .map(|c| c.to_str().unwrap_or_default())
        .collect();

    if components.contains(&"16th") {
        components
            .iter()
            .map(|c| if *c == "16th" { "8th" } else { *c })
            .collect()
    } else {
        let dir = infile.parent().unwrap_or_else(|| Path::new("."));
        let name = infile.file_name().unwrap_or_default();
        dir.join("8th").join(name)
    }
}

/// Regrids one file unless its output already passes QC. Returns the input
/// path on failure for aggregate reporting.
pub async fn maybe_remap(
    infile: &Path,
    gridfile: &Path,
    quick: bool,
    operator: &str,
) -> Option<PathBuf> {
    let outfile = remap_output_path(infile);
    if qc_passes(&outfile, quick) {
        return None;
    }

    if let Some(parent) = outfile.parent() {
        if std::fs::create_dir_all(parent).is_err() {
            return Some(infile.to_path_buf());
        }
    }

    let status = Command::new("cdo")
        .arg(format!("{},{}", operator, gridfile.display()))
        .arg(infile)
        .arg(&outfile)
        .status()
        .await;

    match status {
        Ok(s) if s.success() && qc_passes(&outfile, quick) => None,
        _ => Some(infile.to_path_buf()),
    }
}

// -- Tests -------------------------------------------------------------------
