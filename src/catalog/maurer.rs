//! Maurer loaders: single-member observational forcing and monthly VIC runs.

use crate::config::Roots;
use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::resample;
use crate::schema;

use super::open_dir;

/// Loads the monthly Maurer VIC hydrology (the files are already monthly).
pub fn load_monthly_hydrology(roots: &Roots) -> Result<Dataset> {
    let mut ds = open_dir(&roots.maurer_vic)?;
    ds.rename(schema::MAURER_HYDRO);
    ds.derive_total_runoff();
    Ok(ds)
}

/// Daily Maurer VIC output was never produced as netCDF.
pub fn load_daily_hydrology(_roots: &Roots) -> Result<Dataset> {
    Err(Error::Unsupported(
        "daily Maurer hydrology: netCDF files do not exist".to_string(),
    ))
}

/// Loads daily Maurer meteorology from the per-variable subdirectories.
///
/// A couple of files carry 0-360 longitudes; they are mapped onto
/// [-180, 180] to line up with the rest of the archive.
pub fn load_daily_meteorology(roots: &Roots) -> Result<Dataset> {
    let mut ds = open_dir(&roots.maurer_met)?;
    ds.normalize_lon();
    ds.rename(schema::MAURER_MET);
    ds.derive_t_mean();
    Ok(ds)
}

pub fn load_monthly_meteorology(roots: &Roots) -> Result<Dataset> {
    let ds = load_daily_meteorology(roots)?;
    resample::resample_daily_to_monthly(&ds)
}

// -- Tests -------------------------------------------------------------------
