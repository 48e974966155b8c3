//! BCSD loaders.
//!
//! BCSD trees are flat: `<root>/<model>_<scenario>_<ens>/*.nc` with
//! lower-case model names, and the historical period lives inside the rcp85
//! tree, so historical loads read rcp85 directories filtered to 1950-2005.
//! BCSD is the only family with native monthly files.

use std::path::{Path, PathBuf};

use crate::config::Roots;
use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::reader;
use crate::schema;

use super::{load_models, nc_files_under, Scenario};

pub fn load_daily_meteorology(
    roots: &Roots,
    scen: Scenario,
    models: Option<&[String]>,
) -> Result<Dataset> {
    let mut ds = load_root(&roots.bcsd_met, scen, models)?;
    ds.rename(schema::BCSD_MET);
    ds.derive_t_mean();
    Ok(ds)
}

pub fn load_monthly_meteorology(
    roots: &Roots,
    scen: Scenario,
    models: Option<&[String]>,
) -> Result<Dataset> {
    let mut ds = load_root(&roots.bcsd_met_mon, scen, models)?;
    ds.rename(schema::BCSD_MET);
    ds.derive_t_mean();
    Ok(ds)
}

pub fn load_daily_hydrology(
    roots: &Roots,
    scen: Scenario,
    models: Option<&[String]>,
) -> Result<Dataset> {
    let mut ds = load_root(&roots.bcsd_vic, scen, models)?;
    ds.rename(schema::BCSD_HYDRO);
    ds.derive_total_runoff();
    Ok(ds)
}

pub fn load_monthly_hydrology(
    roots: &Roots,
    scen: Scenario,
    models: Option<&[String]>,
) -> Result<Dataset> {
    let mut ds = load_root(&roots.bcsd_vic_mon, scen, models)?;
    ds.rename(schema::BCSD_HYDRO_MON);
    ds.derive_total_runoff();
    Ok(ds)
}

/// Loads one BCSD root for `scen`, joining models along the `gcm` axis.
fn load_root(root: &Path, scen: Scenario, models: Option<&[String]>) -> Result<Dataset> {
    // bcsd put historical in the rcp dataset
    let dir_scen = if scen.is_historical() {
        "rcp85"
    } else {
        scen.as_str()
    };

    let models = match models {
        Some(m) => m.to_vec(),
        None => discover_bcsd_models(root, dir_scen)?,
    };

    load_models(&models, |model| {
        let prefix = format!("{}_{}_", model.to_lowercase(), dir_scen);
        let mut files = Vec::new();
        for entry in root.read_dir()? {
            let path = entry?.path();
            let name = path.file_name().unwrap_or_default().to_string_lossy();
            if path.is_dir() && name.starts_with(&prefix) {
                files.extend(nc_files_under(&path)?);
            }
        }

        let files = filter_by_years(files, scen.valid_years());
        if files.is_empty() {
            return Err(Error::NoFiles(root.join(format!("{}*", prefix))));
        }
        reader::open_many(&files)
    })
}

/// Model names parsed from `<model>_<scen>_<ens>` directories, deduplicated
/// and sorted.
fn discover_bcsd_models(root: &Path, dir_scen: &str) -> Result<Vec<String>> {
    let mut models = Vec::new();
    for entry in root.read_dir()? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let name = path.file_name().unwrap_or_default().to_string_lossy().to_string();
        if let Some((model, scen, _ens)) = parse_model_dir(&name) {
            if scen == dir_scen && !models.contains(&model) {
                models.push(model);
            }
        }
    }
    models.sort();
    Ok(models)
}

fn parse_model_dir(name: &str) -> Option<(String, String, String)> {
    let mut parts = name.split('_');
    let model = parts.next()?.to_string();
    let scen = parts.next()?.to_string();
    let ens = parts.next()?.to_string();
    if parts.next().is_some() || model.is_empty() {
        return None;
    }
    Some((model, scen, ens))
}

/// Keeps files whose name mentions a year inside the valid range.
fn filter_by_years(files: Vec<PathBuf>, years: std::ops::RangeInclusive<i32>) -> Vec<PathBuf> {
    let years: Vec<String> = years.map(|y| y.to_string()).collect();
    files
        .into_iter()
        .filter(|f| {
            let name = f.file_name().unwrap_or_default().to_string_lossy();
            years.iter().any(|y| name.contains(y.as_str()))
        })
        .collect()
}

// -- Tests -------------------------------------------------------------------
