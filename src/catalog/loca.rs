//! LOCA loaders: daily meteorology and VIC hydrology per climate model.

use crate::config::Roots;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::resample;
use crate::schema;

use super::{discover_models, load_models, open_dir, Scenario};

/// Livneh observational trees that live alongside the LOCA VIC output.
const LIVNEH_DIRS: &[&str] = &["Livneh_L14_CONUS", "Livneh_L14"];

/// Loads daily VIC hydrology for `scen`, one dataset per model joined along
/// the `gcm` axis. Models are discovered from the filesystem when not given.
pub fn load_daily_hydrology(
    roots: &Roots,
    scen: Scenario,
    models: Option<&[String]>,
) -> Result<Dataset> {
    let models = match models {
        Some(m) => m.to_vec(),
        None => discover_models(&roots.loca_vic, LIVNEH_DIRS)?,
    };

    let mut ds = load_models(&models, |model| {
        let dir = roots
            .loca_vic
            .join(model)
            .join(format!("vic_output.{}.netcdf", scen));
        open_dir(&dir)
    })?;

    ds.derive_total_runoff();
    Ok(ds)
}

pub fn load_monthly_hydrology(
    roots: &Roots,
    scen: Scenario,
    models: Option<&[String]>,
) -> Result<Dataset> {
    let ds = load_daily_hydrology(roots, scen, models)?;
    resample::resample_daily_to_monthly(&ds)
}

/// Loads daily meteorology for `scen` at `resolution`, joined along the
/// `gcm` axis, renamed to the canonical schema.
pub fn load_daily_meteorology(
    roots: &Roots,
    scen: Scenario,
    models: Option<&[String]>,
    resolution: &str,
) -> Result<Dataset> {
    let models = match models {
        Some(m) => m.to_vec(),
        None => discover_models(&roots.loca_met, &[])?,
    };

    let mut ds = load_models(&models, |model| {
        // <root>/<model>/<resolution>/<scen>/ holds <ens>/<var>/*.nc below.
        let dir = roots
            .loca_met
            .join(model)
            .join(resolution)
            .join(scen.as_str());
        open_dir(&dir)
    })?;

    ds.rename(schema::LOCA_MET);
    ds.derive_t_mean();
    Ok(ds)
}

pub fn load_monthly_meteorology(
    roots: &Roots,
    scen: Scenario,
    models: Option<&[String]>,
    resolution: &str,
) -> Result<Dataset> {
    let ds = load_daily_meteorology(roots, scen, models, resolution)?;
    resample::resample_daily_to_monthly(&ds)
}

// -- Tests -------------------------------------------------------------------
