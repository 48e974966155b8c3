//! Labeled gridded dataset model.
//!
//! A [`Dataset`] is a collection of variables on shared coordinates. Every
//! variable is dimensioned `[time, lat, lon]`, or `[gcm, time, lat, lon]`
//! once per-model datasets have been joined along the synthetic model axis.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use ndarray::{concatenate, stack, ArrayD, ArrayViewD, Axis};

use crate::calendar::Calendar;
use crate::error::{Error, Result};

/// Shared coordinates of a [`Dataset`].
#[derive(Debug, Clone, PartialEq)]
pub struct Coords {
    pub time: Vec<NaiveDate>,
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
    /// Model names along the synthetic `gcm` axis, once concatenated.
    pub gcm: Option<Vec<String>>,
    pub calendar: Calendar,
}

impl Coords {
    pub fn new(time: Vec<NaiveDate>, lat: Vec<f64>, lon: Vec<f64>, calendar: Calendar) -> Self {
        Coords {
            time,
            lat,
            lon,
            gcm: None,
            calendar,
        }
    }

    /// Expected shape of every variable on these coordinates.
    pub fn var_shape(&self) -> Vec<usize> {
        let mut shape = Vec::with_capacity(4);
        if let Some(gcm) = &self.gcm {
            shape.push(gcm.len());
        }
        shape.extend([self.time.len(), self.lat.len(), self.lon.len()]);
        shape
    }

    /// Index of the time axis (0, or 1 behind the model axis).
    pub fn time_axis(&self) -> usize {
        usize::from(self.gcm.is_some())
    }
}

#[derive(Debug, Clone)]
pub struct Dataset {
    pub coords: Coords,
    vars: BTreeMap<String, ArrayD<f64>>,
}

impl Dataset {
    pub fn new(coords: Coords) -> Self {
        Dataset {
            coords,
            vars: BTreeMap::new(),
        }
    }

    /// Adds a variable, enforcing the coordinate shape.
    pub fn insert(&mut self, name: impl Into<String>, data: ArrayD<f64>) -> Result<()> {
        let name = name.into();
        let expected = self.coords.var_shape();
        if data.shape() != expected.as_slice() {
            return Err(Error::ShapeMismatch {
                name,
                expected,
                got: data.shape().to_vec(),
            });
        }
        self.vars.insert(name, data);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ArrayD<f64>> {
        self.vars.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Variable names, in sorted order.
    pub fn var_names(&self) -> Vec<&str> {
        self.vars.keys().map(String::as_str).collect()
    }

    pub fn iter_vars(&self) -> impl Iterator<Item = (&str, &ArrayD<f64>)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Renames variables per a `(from, to)` table; absent names are ignored.
    pub fn rename(&mut self, table: &[(&str, &str)]) {
        for (from, to) in table {
            if let Some(data) = self.vars.remove(*from) {
                self.vars.insert(to.to_string(), data);
            }
        }
    }

    pub fn drop_vars(&mut self, names: &[&str]) {
        for name in names {
            self.vars.remove(*name);
        }
    }

    /// Returns a dataset holding only the named variables.
    pub fn select(&self, names: &[&str]) -> Result<Dataset> {
        let mut out = Dataset::new(self.coords.clone());
        for name in names {
            let data = self
                .vars
                .get(*name)
                .ok_or_else(|| Error::MissingVariable(name.to_string()))?;
            out.vars.insert(name.to_string(), data.clone());
        }
        Ok(out)
    }

    /// Derives `t_mean = (t_min + t_max) / 2` when not already present.
    pub fn derive_t_mean(&mut self) {
        if self.contains("t_mean") {
            return;
        }
        if let (Some(tmin), Some(tmax)) = (self.vars.get("t_min"), self.vars.get("t_max")) {
            let t_mean = (tmin + tmax) / 2.0;
            self.vars.insert("t_mean".to_string(), t_mean);
        }
    }

    /// Derives `total_runoff = runoff + baseflow` when not already present.
    pub fn derive_total_runoff(&mut self) {
        if self.contains("total_runoff") {
            return;
        }
        if let (Some(runoff), Some(baseflow)) = (self.vars.get("runoff"), self.vars.get("baseflow"))
        {
            let total = runoff + baseflow;
            self.vars.insert("total_runoff".to_string(), total);
        }
    }

    /// Maps longitudes from [0, 360) onto [-180, 180].
    pub fn normalize_lon(&mut self) {
        for lon in &mut self.coords.lon {
            if *lon > 180.0 {
                *lon -= 360.0;
            }
        }
    }

    /// Reorders records so the time coordinate ascends.
    pub fn sort_by_time(&mut self) {
        let mut order: Vec<usize> = (0..self.coords.time.len()).collect();
        order.sort_by_key(|&i| self.coords.time[i]);
        if order.iter().enumerate().all(|(i, &o)| i == o) {
            return;
        }

        let axis = Axis(self.coords.time_axis());
        self.coords.time = order.iter().map(|&i| self.coords.time[i]).collect();
        for data in self.vars.values_mut() {
            *data = data.select(axis, &order);
        }
    }

    /// Absorbs the variables of another dataset on identical coordinates.
    ///
    /// The archives store one variable per file, so a model's files for one
    /// period are merged this way before periods are joined along time. The
    /// same variable arriving from two files is a conflict.
    pub fn merge(&mut self, other: Dataset) -> Result<()> {
        if other.coords != self.coords {
            return Err(Error::CoordinateMismatch(
                "cannot merge datasets with different coordinates".to_string(),
            ));
        }
        for (name, data) in other.vars {
            if self.vars.contains_key(&name) {
                return Err(Error::DuplicateVariable(name));
            }
            self.vars.insert(name, data);
        }
        Ok(())
    }

    /// Joins per-model datasets along a new `gcm` axis, in sorted model-name
    /// order. Coordinates must match exactly; only variables present in every
    /// model are kept.
    pub fn concat_models(parts: Vec<(String, Dataset)>) -> Result<Dataset> {
        let mut parts = parts;
        parts.sort_by(|a, b| a.0.cmp(&b.0));

        let first = match parts.first() {
            Some((_, ds)) => ds,
            None => return Err(Error::EmptyConcat),
        };

        let mut coords = first.coords.clone();
        for (name, ds) in &parts {
            if ds.coords.gcm.is_some() {
                return Err(Error::CoordinateMismatch(format!(
                    "model `{}` already has a gcm axis",
                    name
                )));
            }
            if ds.coords != first.coords {
                return Err(Error::CoordinateMismatch(format!(
                    "model `{}` coordinates differ from `{}`",
                    name, parts[0].0
                )));
            }
        }
        coords.gcm = Some(parts.iter().map(|(name, _)| name.clone()).collect());

        // Variables present in every model.
        let mut names: Vec<String> = first.vars.keys().cloned().collect();
        names.retain(|n| parts.iter().all(|(_, ds)| ds.contains(n)));

        let mut out = Dataset::new(coords);
        for name in names {
            let views: Vec<ArrayViewD<f64>> =
                parts.iter().map(|(_, ds)| ds.vars[&name].view()).collect();
            let stacked = stack(Axis(0), &views)
                .map_err(|e| Error::CoordinateMismatch(format!("stacking `{}`: {}", name, e)))?;
            out.insert(name, stacked)?;
        }
        Ok(out)
    }

    /// Concatenates datasets along time, ordered by their first timestamp.
    /// All parts must share lat/lon coordinates, calendar and variable set.
    pub fn concat_time(parts: Vec<Dataset>) -> Result<Dataset> {
        let mut parts = parts;
        parts.retain(|ds| !ds.coords.time.is_empty());
        parts.sort_by_key(|ds| ds.coords.time[0]);

        let first = match parts.first() {
            Some(ds) => ds,
            None => return Err(Error::EmptyConcat),
        };

        let names: Vec<String> = first.vars.keys().cloned().collect();
        for ds in &parts {
            if ds.coords.gcm.is_some() {
                return Err(Error::CoordinateMismatch(
                    "cannot concatenate along time across a gcm axis".to_string(),
                ));
            }
            if ds.coords.lat != first.coords.lat
                || ds.coords.lon != first.coords.lon
                || ds.coords.calendar != first.coords.calendar
            {
                return Err(Error::CoordinateMismatch(
                    "lat/lon coordinates differ between files".to_string(),
                ));
            }
            for name in &names {
                if !ds.contains(name) {
                    return Err(Error::MissingVariable(name.clone()));
                }
            }
        }

        let time: Vec<NaiveDate> = parts
            .iter()
            .flat_map(|ds| ds.coords.time.iter().copied())
            .collect();
        let coords = Coords::new(
            time,
            first.coords.lat.clone(),
            first.coords.lon.clone(),
            first.coords.calendar,
        );

        let mut out = Dataset::new(coords);
        for name in names {
            let views: Vec<ArrayViewD<f64>> =
                parts.iter().map(|ds| ds.vars[&name].view()).collect();
            let joined = concatenate(Axis(0), &views)
                .map_err(|e| Error::CoordinateMismatch(format!("joining `{}`: {}", name, e)))?;
            out.insert(name, joined)?;
        }
        Ok(out)
    }
}

// -- Tests -------------------------------------------------------------------
