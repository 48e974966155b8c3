//! Reads netCDF files into [`Dataset`]s.
//!
//! Handles the per-source coordinate vocabulary (`time`/`Time`,
//! `lat`/`Lat`/`latitude`, ...), CF time decoding, fill values, and unit
//! conversion. A collection of files belonging to one model is opened as a
//! single dataset concatenated along time.

use std::path::{Path, PathBuf};

use ndarray::{ArrayD, IxDyn};

use crate::calendar::{self, Calendar};
use crate::dataset::{Coords, Dataset};
use crate::error::{Error, Result};
use crate::schema;

/// Opens one netCDF file as a [`Dataset`].
///
/// Every variable dimensioned `[time, lat, lon]` is loaded; coordinate and
/// bound variables are not. Variables that cannot be read as numeric grids
/// are skipped with a warning rather than failing the file.
pub fn open_dataset(path: &Path) -> Result<Dataset> {
    let file = netcdf::open(path)?;

    let time_var = find_variable(&file, schema::TIME_ALIASES)
        .ok_or_else(|| Error::MissingCoordinate("time".to_string()))?;
    let time_name = time_var.name().to_string();

    let units = str_attr(&time_var, "units")
        .ok_or_else(|| Error::TimeDecode(format!("{}: no time units", path.display())))?;
    let cal = str_attr(&time_var, "calendar")
        .and_then(|a| Calendar::from_attr(&a))
        .unwrap_or_default();
    let offsets = time_var.get_values::<f64, _>(..)?;
    let time = calendar::decode_time(&units, cal, &offsets)?;

    let (lat_name, lat) = coord_values(&file, schema::LAT_ALIASES)
        .ok_or_else(|| Error::MissingCoordinate("lat".to_string()))?;
    let (lon_name, lon) = coord_values(&file, schema::LON_ALIASES)
        .ok_or_else(|| Error::MissingCoordinate("lon".to_string()))?;

    let shape = [time.len(), lat.len(), lon.len()];
    let mut ds = Dataset::new(Coords::new(time, lat, lon, cal));

    for var in file.variables() {
        let name = var.name().to_string();
        if schema::is_bounds(&name)
            || name == time_name
            || name == lat_name
            || name == lon_name
        {
            continue;
        }

        let dims: Vec<String> = var.dimensions().iter().map(|d| d.name().to_string()).collect();
        if dims != [time_name.clone(), lat_name.clone(), lon_name.clone()] {
            continue;
        }

        let values = match var.get_values::<f64, _>(..) {
            Ok(values) => values,
            Err(e) => {
                eprintln!(
                    "Warning: skipping `{}` in {}: {}",
                    name,
                    path.display(),
                    e
                );
                continue;
            }
        };

        let mut data = ArrayD::from_shape_vec(IxDyn(&shape), values).map_err(|_| {
            Error::ShapeMismatch {
                name: name.clone(),
                expected: shape.to_vec(),
                got: vec![var.len()],
            }
        })?;

        if let Some(fill) = fill_value(&var) {
            data.mapv_inplace(|v| if v == fill { f64::NAN } else { v });
        }
        convert_units(str_attr(&var, "units").as_deref(), &mut data);

        ds.insert(name, data)?;
    }

    Ok(ds)
}

/// Opens a set of files belonging to one model as a single dataset.
///
/// The archives store one variable per file, so files covering the same
/// period are merged into one record set first; the merged periods are then
/// concatenated along time in ascending order.
pub fn open_many(paths: &[PathBuf]) -> Result<Dataset> {
    let mut periods: Vec<Dataset> = Vec::new();
    for path in paths {
        let ds = open_dataset(path)?;
        if let Some(period) = periods.iter_mut().find(|p| p.coords == ds.coords) {
            period.merge(ds)?;
        } else {
            periods.push(ds);
        }
    }
    Dataset::concat_time(periods)
}

/// Converts to the canonical units in place, keyed off the `units` attribute:
/// Kelvin to Celsius, `kg m-2 s-1` fluxes to mm/day.
pub fn convert_units(units: Option<&str>, data: &mut ArrayD<f64>) {
    let Some(units) = units else { return };
    match units.trim() {
        "K" | "Kelvin" | "degK" => data.mapv_inplace(|v| v - 273.15),
        "kg m-2 s-1" | "kg/m2/s" | "kg m^-2 s^-1" | "mm/s" => {
            data.mapv_inplace(|v| v * 86400.0)
        }
        _ => {}
    }
}

fn find_variable<'f>(
    file: &'f netcdf::File,
    aliases: &[&str],
) -> Option<netcdf::Variable<'f>> {
    aliases.iter().find_map(|alias| file.variable(alias))
}

fn coord_values(file: &netcdf::File, aliases: &[&str]) -> Option<(String, Vec<f64>)> {
    let var = find_variable(file, aliases)?;
    let values = var.get_values::<f64, _>(..).ok()?;
    Some((var.name().to_string(), values))
}

fn str_attr(var: &netcdf::Variable, name: &str) -> Option<String> {
    match var.attribute_value(name) {
        Some(Ok(netcdf::AttributeValue::Str(s))) => Some(s),
        _ => None,
    }
}

fn fill_value(var: &netcdf::Variable) -> Option<f64> {
    ["_FillValue", "missing_value"]
        .iter()
        .find_map(|name| match var.attribute_value(name) {
            Some(Ok(netcdf::AttributeValue::Double(v))) => Some(v),
            Some(Ok(netcdf::AttributeValue::Float(v))) => Some(v as f64),
            Some(Ok(netcdf::AttributeValue::Int(v))) => Some(v as f64),
            Some(Ok(netcdf::AttributeValue::Short(v))) => Some(v as f64),
            _ => None,
        })
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use tempfile::TempDir;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Writes a small LOCA-flavoured file: pr in flux units with a fill
    /// value, tasmin in Kelvin, a noleap time axis, and a bounds variable.
    fn write_fixture(path: &Path, time_offsets: &[f64]) {
        let mut file = netcdf::create(path).unwrap();
        file.add_dimension("time", time_offsets.len()).unwrap();
        file.add_dimension("lat", 2).unwrap();
        file.add_dimension("lon", 2).unwrap();
        file.add_dimension("bnds", 2).unwrap();

        let mut time = file.add_variable::<f64>("time", &["time"]).unwrap();
        time.put_values(time_offsets, ..).unwrap();
        time.put_attribute("units", "days since 1950-01-01").unwrap();
        time.put_attribute("calendar", "noleap").unwrap();

        let mut lat = file.add_variable::<f64>("lat", &["lat"]).unwrap();
        lat.put_values(&[40.0, 41.0], ..).unwrap();
        let mut lon = file.add_variable::<f64>("lon", &["lon"]).unwrap();
        lon.put_values(&[-120.0, -119.0], ..).unwrap();

        let n = time_offsets.len() * 4;
        let mut pr = file
            .add_variable::<f64>("pr", &["time", "lat", "lon"])
            .unwrap();
        let mut pr_values = vec![2.0 / 86400.0; n];
        pr_values[0] = -9999.0;
        pr.put_attribute("units", "kg m-2 s-1").unwrap();
        // netCDF requires _FillValue to be defined before any data is written.
        pr.put_attribute("_FillValue", -9999.0).unwrap();
        pr.put_values(&pr_values, ..).unwrap();

        let mut tasmin = file
            .add_variable::<f64>("tasmin", &["time", "lat", "lon"])
            .unwrap();
        tasmin.put_values(&vec![273.15; n], ..).unwrap();
        tasmin.put_attribute("units", "K").unwrap();

        let mut bnds = file
            .add_variable::<f64>("time_bnds", &["time", "bnds"])
            .unwrap();
        bnds.put_values(&vec![0.0; time_offsets.len() * 2], ..).unwrap();
    }

    #[test]
    fn should_read_file_with_conversions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pr.1950.nc");
        write_fixture(&path, &[0.0, 1.0, 2.0]);

        let ds = open_dataset(&path).unwrap();

        assert_eq!(ds.coords.time.len(), 3);
        assert_eq!(ds.coords.time[0], date(1950, 1, 1));
        assert_eq!(ds.coords.calendar, Calendar::Noleap);
        assert_eq!(ds.coords.lat, vec![40.0, 41.0]);
        assert_eq!(ds.var_names(), vec!["pr", "tasmin"]);

        // Flux conversion and fill value handling.
        let pr = ds.get("pr").unwrap();
        assert!(pr[[0, 0, 0]].is_nan());
        assert!((pr[[1, 0, 0]] - 2.0).abs() < 1e-9);

        // Kelvin to Celsius.
        let tasmin = ds.get("tasmin").unwrap();
        assert!(tasmin[[0, 0, 0]].abs() < 1e-9);
    }

    #[test]
    fn should_concat_files_along_time() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("pr.1950.nc");
        let second = dir.path().join("pr.1951.nc");
        write_fixture(&first, &[0.0, 1.0]);
        write_fixture(&second, &[365.0, 366.0]);

        // Deliberately out of order; open_many sorts by first timestamp.
        let ds = open_many(&[second, first]).unwrap();

        assert_eq!(ds.coords.time.len(), 4);
        assert_eq!(ds.coords.time[0], date(1950, 1, 1));
        assert_eq!(ds.coords.time[2], date(1951, 1, 1));
        assert_eq!(ds.get("pr").unwrap().shape(), &[4, 2, 2]);
    }

    /// Writes a single-variable file the way the archives publish them.
    fn write_var_file(path: &Path, name: &str, time_offsets: &[f64], value: f64) {
        let mut file = netcdf::create(path).unwrap();
        file.add_dimension("time", time_offsets.len()).unwrap();
        file.add_dimension("lat", 1).unwrap();
        file.add_dimension("lon", 1).unwrap();

        let mut time = file.add_variable::<f64>("time", &["time"]).unwrap();
        time.put_values(time_offsets, ..).unwrap();
        time.put_attribute("units", "days since 1950-01-01").unwrap();

        let mut lat = file.add_variable::<f64>("lat", &["lat"]).unwrap();
        lat.put_values(&[40.0], ..).unwrap();
        let mut lon = file.add_variable::<f64>("lon", &["lon"]).unwrap();
        lon.put_values(&[-120.0], ..).unwrap();

        let mut var = file
            .add_variable::<f64>(name, &["time", "lat", "lon"])
            .unwrap();
        var.put_values(&vec![value; time_offsets.len()], ..).unwrap();
    }

    #[test]
    fn should_merge_per_variable_files() {
        let dir = TempDir::new().unwrap();
        let mut paths = Vec::new();
        for (year, offsets) in [(1950, [0.0, 1.0]), (1951, [365.0, 366.0])] {
            for (var, value) in [("pr", 2.0), ("tasmin", 10.0)] {
                let path = dir.path().join(format!("{}.{}.nc", var, year));
                write_var_file(&path, var, &offsets, value);
                paths.push(path);
            }
        }

        let ds = open_many(&paths).unwrap();

        assert_eq!(ds.var_names(), vec!["pr", "tasmin"]);
        assert_eq!(ds.coords.time.len(), 4);
        assert_eq!(ds.coords.time[2], date(1951, 1, 1));
        assert_eq!(ds.get("pr").unwrap()[[3, 0, 0]], 2.0);
        assert_eq!(ds.get("tasmin").unwrap()[[0, 0, 0]], 10.0);
    }

    #[test]
    fn should_reject_conflicting_files_for_one_period() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("pr.1950.nc");
        let b = dir.path().join("pr.1950.v2.nc");
        write_var_file(&a, "pr", &[0.0, 1.0], 1.0);
        write_var_file(&b, "pr", &[0.0, 1.0], 2.0);

        assert!(matches!(
            open_many(&[a, b]).unwrap_err(),
            crate::Error::DuplicateVariable(_)
        ));
    }

    #[test]
    fn should_error_on_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(open_dataset(&dir.path().join("absent.nc")).is_err());
    }

    #[test]
    fn should_convert_kelvin() {
        let mut data = ArrayD::from_elem(IxDyn(&[1]), 300.0);
        convert_units(Some("K"), &mut data);
        assert!((data[[0]] - 26.85).abs() < 1e-9);
    }

    #[test]
    fn should_convert_flux() {
        let mut data = ArrayD::from_elem(IxDyn(&[1]), 1.0);
        convert_units(Some("kg m-2 s-1"), &mut data);
        assert_eq!(data[[0]], 86400.0);
    }

    #[test]
    fn should_leave_unknown_units() {
        let mut data = ArrayD::from_elem(IxDyn(&[1]), 5.0);
        convert_units(Some("mm"), &mut data);
        convert_units(None, &mut data);
        assert_eq!(data[[0]], 5.0);
    }
}
