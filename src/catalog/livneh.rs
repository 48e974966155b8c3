//! Livneh loaders: observational forcing and the VIC run driven by it.

use std::path::{Path, PathBuf};

use crate::config::Roots;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::resample;
use crate::schema;

use super::{open_dir, DEFAULT_RESOLUTION};

/// The native-resolution files sit at the root; regridded copies live in a
/// per-resolution subdirectory.
fn resolved(root: &Path, resolution: &str) -> PathBuf {
    if resolution == DEFAULT_RESOLUTION {
        root.to_path_buf()
    } else {
        root.join(resolution)
    }
}

pub fn load_daily_meteorology(roots: &Roots, resolution: &str) -> Result<Dataset> {
    let mut ds = open_dir(&resolved(&roots.livneh_met, resolution))?;
    ds.rename(schema::LIVNEH_MET);
    ds.derive_t_mean();
    Ok(ds)
}

pub fn load_monthly_meteorology(roots: &Roots, resolution: &str) -> Result<Dataset> {
    let mut ds = load_daily_meteorology(roots, resolution)?;
    // The monthly forcing files do not always list in time order.
    ds.sort_by_time();
    resample::resample_daily_to_monthly(&ds)
}

pub fn load_daily_hydrology(roots: &Roots, resolution: &str) -> Result<Dataset> {
    let mut ds = open_dir(&resolved(&roots.livneh_vic, resolution))?;
    ds.derive_total_runoff();
    Ok(ds)
}

pub fn load_monthly_hydrology(roots: &Roots, resolution: &str) -> Result<Dataset> {
    let ds = load_daily_hydrology(roots, resolution)?;
    resample::resample_daily_to_monthly(&ds)
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn should_resolve_resolution_paths() {
        let root = Path::new("/data/livneh");
        assert_eq!(resolved(root, "16th"), PathBuf::from("/data/livneh"));
        assert_eq!(resolved(root, "8th"), PathBuf::from("/data/livneh/8th"));
    }

    #[test]
    fn should_load_met_at_alternate_resolution() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("8th")).unwrap();
        write_met_file(&dir.path().join("8th/livneh.195001.nc"));

        let roots = Roots {
            livneh_met: dir.path().to_path_buf(),
            ..Roots::default()
        };

        // Nothing at the root, so the native resolution fails...
        assert!(load_daily_meteorology(&roots, "16th").is_err());

        // ...while the regridded subdirectory loads and normalizes.
        let ds = load_daily_meteorology(&roots, "8th").unwrap();
        assert!(ds.contains("pcp"));
        assert!(ds.contains("t_min"));
        assert!(ds.contains("t_mean"));
        assert!(!ds.contains("Prec"));
    }

    fn write_met_file(path: &Path) {
        let mut file = netcdf::create(path).unwrap();
        file.add_dimension("Time", 1).unwrap();
        file.add_dimension("Lat", 1).unwrap();
        file.add_dimension("Lon", 1).unwrap();

        let mut time = file.add_variable::<f64>("Time", &["Time"]).unwrap();
        time.put_values(&[0.0], ..).unwrap();
        time.put_attribute("units", "days since 1950-01-01").unwrap();

        let mut lat = file.add_variable::<f64>("Lat", &["Lat"]).unwrap();
        lat.put_values(&[40.0], ..).unwrap();
        let mut lon = file.add_variable::<f64>("Lon", &["Lon"]).unwrap();
        lon.put_values(&[-120.0], ..).unwrap();

        for name in ["Prec", "Tmin", "Tmax"] {
            let mut var = file
                .add_variable::<f64>(name, &["Time", "Lat", "Lon"])
                .unwrap();
            var.put_values(&[1.0], ..).unwrap();
        }
    }
}
