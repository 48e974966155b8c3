//! Data catalog: loader functions per source family.
//!
//! Each loader resolves files by the family's directory convention, opens
//! them through [`crate::reader`], applies the family's rename table and
//! derivations, and (for multi-model families) joins the per-model datasets
//! along the `gcm` axis. Models that fail to load are skipped with a warning
//! so one bad tree does not abort the whole collection.

pub mod bcsd;
pub mod livneh;
pub mod loca;
pub mod maurer;

use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use crate::config::Roots;
use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::reader;

pub const DEFAULT_MON_HYDRO_VARS: &[&str] = &["ET", "total_runoff"];
pub const DEFAULT_DAY_HYDRO_VARS: &[&str] = &["total_runoff"];

/// Default spatial resolution of the LOCA and Livneh archives.
pub const DEFAULT_RESOLUTION: &str = "16th";

/// Named datasets keyed by family (`loca`, `bcsd`, `livneh`, `maurer`).
pub type Collection = BTreeMap<String, Dataset>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    Historical,
    Rcp45,
    Rcp85,
}

impl Scenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Historical => "historical",
            Scenario::Rcp45 => "rcp45",
            Scenario::Rcp85 => "rcp85",
        }
    }

    pub fn is_historical(&self) -> bool {
        matches!(self, Scenario::Historical)
    }

    /// Years covered by the scenario's files.
    pub fn valid_years(&self) -> RangeInclusive<i32> {
        if self.is_historical() {
            1950..=2005
        } else {
            2006..=2100
        }
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Loads the monthly historical hydrology collection (LOCA, BCSD, Livneh,
/// Maurer), restricted to `variables`.
pub fn load_monthly_historical_hydro_datasets(
    roots: &Roots,
    models: Option<&[String]>,
    variables: &[&str],
) -> Result<Collection> {
    let mut data = load_monthly_cmip_hydro_datasets(roots, Scenario::Historical, models, &[])?;
    data.insert(
        "livneh".to_string(),
        livneh::load_monthly_hydrology(roots, DEFAULT_RESOLUTION)?,
    );
    data.insert("maurer".to_string(), maurer::load_monthly_hydrology(roots)?);

    select_all(data, variables)
}

/// Loads the daily historical hydrology collection, restricted to
/// `variables`. Daily Maurer hydrology does not exist and is omitted.
pub fn load_daily_historical_hydro_datasets(
    roots: &Roots,
    models: Option<&[String]>,
    variables: &[&str],
) -> Result<Collection> {
    let mut data = load_daily_cmip_hydro_datasets(roots, Scenario::Historical, models)?;
    data.insert(
        "livneh".to_string(),
        livneh::load_daily_hydrology(roots, DEFAULT_RESOLUTION)?,
    );

    select_all(data, variables)
}

/// Loads the monthly historical meteorology collection.
pub fn load_monthly_historical_met_datasets(
    roots: &Roots,
    models: Option<&[String]>,
) -> Result<Collection> {
    let mut data = load_monthly_cmip_met_datasets(roots, Scenario::Historical, models)?;
    data.insert(
        "livneh".to_string(),
        livneh::load_monthly_meteorology(roots, DEFAULT_RESOLUTION)?,
    );
    data.insert(
        "maurer".to_string(),
        maurer::load_monthly_meteorology(roots)?,
    );

    Ok(data)
}

/// Loads the monthly CMIP meteorology collection (LOCA and BCSD).
pub fn load_monthly_cmip_met_datasets(
    roots: &Roots,
    scen: Scenario,
    models: Option<&[String]>,
) -> Result<Collection> {
    let mut data = Collection::new();
    data.insert(
        "loca".to_string(),
        loca::load_monthly_meteorology(roots, scen, models, DEFAULT_RESOLUTION)?,
    );
    data.insert(
        "bcsd".to_string(),
        bcsd::load_monthly_meteorology(roots, scen, models)?,
    );
    Ok(data)
}

/// Loads the monthly CMIP hydrology collection, restricted to `variables`.
pub fn load_monthly_cmip_hydro_datasets(
    roots: &Roots,
    scen: Scenario,
    models: Option<&[String]>,
    variables: &[&str],
) -> Result<Collection> {
    let mut data = Collection::new();
    data.insert(
        "loca".to_string(),
        loca::load_monthly_hydrology(roots, scen, models)?,
    );
    data.insert(
        "bcsd".to_string(),
        bcsd::load_monthly_hydrology(roots, scen, models)?,
    );
    select_all(data, variables)
}

/// Loads the daily CMIP meteorology collection.
pub fn load_daily_cmip_met_datasets(
    roots: &Roots,
    scen: Scenario,
    models: Option<&[String]>,
) -> Result<Collection> {
    let mut data = Collection::new();
    data.insert(
        "loca".to_string(),
        loca::load_daily_meteorology(roots, scen, models, DEFAULT_RESOLUTION)?,
    );
    data.insert(
        "bcsd".to_string(),
        bcsd::load_daily_meteorology(roots, scen, models)?,
    );
    Ok(data)
}

/// Loads the daily CMIP hydrology collection.
pub fn load_daily_cmip_hydro_datasets(
    roots: &Roots,
    scen: Scenario,
    models: Option<&[String]>,
) -> Result<Collection> {
    let mut data = Collection::new();
    data.insert(
        "loca".to_string(),
        loca::load_daily_hydrology(roots, scen, models)?,
    );
    data.insert(
        "bcsd".to_string(),
        bcsd::load_daily_hydrology(roots, scen, models)?,
    );
    Ok(data)
}

/// Restricts every dataset in the collection to `variables`; an empty list
/// keeps everything.
fn select_all(data: Collection, variables: &[&str]) -> Result<Collection> {
    if variables.is_empty() {
        return Ok(data);
    }
    data.into_iter()
        .map(|(k, ds)| Ok((k, ds.select(variables)?)))
        .collect()
}

/// Lists model directories under `root`, excluding `exclude`, sorted.
pub(crate) fn discover_models(root: &Path, exclude: &[&str]) -> Result<Vec<String>> {
    let mut models = Vec::new();
    for entry in root.read_dir()? {
        let entry = entry?;
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if !exclude.contains(&name.as_str()) {
            models.push(name);
        }
    }
    models.sort();
    Ok(models)
}

/// Collects `.nc` files under `dir`, recursively, sorted by path.
pub(crate) fn nc_files_under(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk(dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in dir.read_dir()? {
        let path = entry?.path();
        if path.is_dir() {
            walk(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == "nc") {
            files.push(path);
        }
    }
    Ok(())
}

/// Opens every `.nc` file under `dir` as one dataset.
pub(crate) fn open_dir(dir: &Path) -> Result<Dataset> {
    let files = nc_files_under(dir)?;
    if files.is_empty() {
        return Err(Error::NoFiles(dir.to_path_buf()));
    }
    reader::open_many(&files)
}

/// Loads each model with `load` and joins the survivors along the `gcm`
/// axis. Failures are warned about and skipped; the result holds exactly the
/// models that loaded, in sorted order.
pub(crate) fn load_models<F>(models: &[String], mut load: F) -> Result<Dataset>
where
    F: FnMut(&str) -> Result<Dataset>,
{
    let mut parts = Vec::with_capacity(models.len());
    for model in models {
        match load(model) {
            Ok(ds) => parts.push((model.clone(), ds)),
            Err(e) => eprintln!("Warning: skipping model `{}`: {}", model, e),
        }
    }
    Dataset::concat_models(parts)
}

// -- Tests -------------------------------------------------------------------
