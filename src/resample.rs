//! Temporal aggregation: daily series to monthly.
//!
//! Flux-like variables (precipitation, runoff, ET) are summed within each
//! calendar month; state-like variables (temperature, SWE) are averaged.
//! Missing values are skipped: an all-missing month sums to zero and
//! averages to NaN, matching the conventions of the source archives.

use chrono::{Datelike, NaiveDate};
use ndarray::{ArrayD, Axis, IxDyn, Zip};

use crate::dataset::{Coords, Dataset};
use crate::error::Result;
use crate::schema::{var_kind, VarKind};

/// Resamples daily data to monthly; reducer chosen per variable class.
/// Output timestamps are month starts.
pub fn resample_daily_to_monthly(ds: &Dataset) -> Result<Dataset> {
    resample_monthly_with(ds, |name| var_kind(name))
}

/// Resamples already-monthly (or otherwise sub-monthly) data to monthly
/// means for every variable.
pub fn resample_monthly(ds: &Dataset) -> Result<Dataset> {
    resample_monthly_with(ds, |_| VarKind::State)
}

fn resample_monthly_with<F>(ds: &Dataset, kind_of: F) -> Result<Dataset>
where
    F: Fn(&str) -> VarKind,
{
    let groups = month_groups(&ds.coords.time);
    let axis = Axis(ds.coords.time_axis());

    let time: Vec<NaiveDate> = groups.iter().map(|(start, _)| *start).collect();
    let mut coords = Coords::new(
        time,
        ds.coords.lat.clone(),
        ds.coords.lon.clone(),
        ds.coords.calendar,
    );
    coords.gcm = ds.coords.gcm.clone();

    let mut out = Dataset::new(coords);
    let out_shape = out.coords.var_shape();

    for (name, data) in ds.iter_vars() {
        let mut reduced = ArrayD::zeros(IxDyn(&out_shape));
        for (gi, (_, indices)) in groups.iter().enumerate() {
            let (sum, count) = masked_sum(data, axis, indices);
            let lane = match kind_of(name) {
                VarKind::Flux => sum,
                // 0/0 yields NaN for an all-missing month.
                VarKind::State => &sum / &count,
            };
            reduced.index_axis_mut(axis, gi).assign(&lane);
        }
        out.insert(name, reduced)?;
    }

    Ok(out)
}

/// Sum and count of non-missing values over the selected time indices.
fn masked_sum(data: &ArrayD<f64>, axis: Axis, indices: &[usize]) -> (ArrayD<f64>, ArrayD<f64>) {
    let template = data.index_axis(axis, indices[0]);
    let mut sum = ArrayD::zeros(template.raw_dim());
    let mut count = ArrayD::zeros(template.raw_dim());

    for &i in indices {
        let slice = data.index_axis(axis, i);
        Zip::from(&mut sum)
            .and(&mut count)
            .and(&slice)
            .for_each(|s, c, &v| {
                if !v.is_nan() {
                    *s += v;
                    *c += 1.0;
                }
            });
    }
    (sum, count)
}

/// Groups time indices by calendar month, in order of first appearance.
fn month_groups(times: &[NaiveDate]) -> Vec<(NaiveDate, Vec<usize>)> {
    let mut groups: Vec<(NaiveDate, Vec<usize>)> = Vec::new();
    for (i, t) in times.iter().enumerate() {
        let start = NaiveDate::from_ymd_opt(t.year(), t.month(), 1).unwrap();
        if let Some((_, indices)) = groups.iter_mut().find(|(s, _)| *s == start) {
            indices.push(i);
        } else {
            groups.push((start, vec![i]));
        }
    }
    groups
}

// -- Tests -------------------------------------------------------------------
