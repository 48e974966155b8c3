//! Analysis utilities over harmonized datasets.

use chrono::{Datelike, NaiveDate};
use ndarray::{ArrayD, Axis, IxDyn, Zip};

use crate::dataset::{Coords, Dataset};
use crate::error::{Error, Result};

/// Annual means of monthly data, weighted by days-per-month.
///
/// Weights come from the dataset calendar, so February carries 29 days in
/// standard-calendar leap years and 28 on the noleap calendar. A constant
/// series averages to that constant. Output timestamps are year starts.
pub fn weighted_annual_mean(ds: &Dataset) -> Result<Dataset> {
    let axis = Axis(ds.coords.time_axis());
    let cal = ds.coords.calendar;

    let mut years: Vec<(i32, Vec<usize>)> = Vec::new();
    for (i, t) in ds.coords.time.iter().enumerate() {
        if let Some((_, indices)) = years.iter_mut().find(|(y, _)| *y == t.year()) {
            indices.push(i);
        } else {
            years.push((t.year(), vec![i]));
        }
    }

    let time: Vec<NaiveDate> = years
        .iter()
        .map(|(y, _)| NaiveDate::from_ymd_opt(*y, 1, 1).unwrap())
        .collect();
    let mut coords = Coords::new(
        time,
        ds.coords.lat.clone(),
        ds.coords.lon.clone(),
        cal,
    );
    coords.gcm = ds.coords.gcm.clone();

    let weights: Vec<f64> = ds
        .coords
        .time
        .iter()
        .map(|t| cal.days_in_month(t.year(), t.month()) as f64)
        .collect();

    let mut out = Dataset::new(coords);
    let out_shape = out.coords.var_shape();

    for (name, data) in ds.iter_vars() {
        let mut reduced = ArrayD::zeros(IxDyn(&out_shape));
        for (yi, (_, indices)) in years.iter().enumerate() {
            let template = data.index_axis(axis, indices[0]);
            let mut wsum: ArrayD<f64> = ArrayD::zeros(template.raw_dim());
            let mut wtotal: ArrayD<f64> = ArrayD::zeros(template.raw_dim());

            for &i in indices {
                let slice = data.index_axis(axis, i);
                let w = weights[i];
                Zip::from(&mut wsum)
                    .and(&mut wtotal)
                    .and(&slice)
                    .for_each(|s, t, &v| {
                        if !v.is_nan() {
                            *s += v * w;
                            *t += w;
                        }
                    });
            }

            let lane = &wsum / &wtotal;
            reduced.index_axis_mut(axis, yi).assign(&lane);
        }
        out.insert(name, reduced)?;
    }

    Ok(out)
}

/// Change signal between a historical and a projection mean; percent change
/// relative to the historical mean when `pct` is set.
pub fn calc_change(hist: &Dataset, proj: &Dataset, pct: bool) -> Result<Dataset> {
    let mut out = Dataset::new(proj.coords.clone());
    for (name, proj_data) in proj.iter_vars() {
        let hist_data = hist
            .get(name)
            .ok_or_else(|| Error::MissingVariable(name.to_string()))?;
        if hist_data.shape() != proj_data.shape() {
            return Err(Error::ShapeMismatch {
                name: name.to_string(),
                expected: proj_data.shape().to_vec(),
                got: hist_data.shape().to_vec(),
            });
        }

        let diff = proj_data - hist_data;
        let change = if pct { 100.0 * &diff / hist_data } else { diff };
        out.insert(name, change)?;
    }
    Ok(out)
}

// -- Tests -------------------------------------------------------------------
