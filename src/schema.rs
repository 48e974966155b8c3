//! Canonical variable schema and per-source rename tables.
//!
//! Each source family stores the same physical quantities under its own
//! names. Loaders apply these tables so every dataset presents one canonical
//! vocabulary: `pcp`, `t_min`, `t_max`, `t_mean` for meteorology and `ET`,
//! `SWE`, `runoff`, `baseflow`, `total_runoff` for hydrology.

/// Coordinate aliases accepted when reading files, keyed by canonical name.
pub const TIME_ALIASES: &[&str] = &["time", "Time"];
pub const LAT_ALIASES: &[&str] = &["lat", "Lat", "latitude"];
pub const LON_ALIASES: &[&str] = &["lon", "Lon", "longitude"];

/// Auxiliary bound variables, never loaded.
pub const BOUND_SUFFIX: &str = "_bnds";

// Meteorology renames.
pub const LOCA_MET: &[(&str, &str)] = &[("pr", "pcp"), ("tasmin", "t_min"), ("tasmax", "t_max")];
pub const BCSD_MET: &[(&str, &str)] = &[("pr", "pcp"), ("tasmin", "t_min"), ("tasmax", "t_max")];
pub const MAURER_MET: &[(&str, &str)] = &[
    ("pr", "pcp"),
    ("tasmin", "t_min"),
    ("tasmax", "t_max"),
    ("tas", "t_mean"),
];
pub const LIVNEH_MET: &[(&str, &str)] = &[("Prec", "pcp"), ("Tmin", "t_min"), ("Tmax", "t_max")];

// Hydrology renames. LOCA and Livneh VIC output is already canonical.
pub const BCSD_HYDRO: &[(&str, &str)] = &[("total runoff", "total_runoff")];
pub const BCSD_HYDRO_MON: &[(&str, &str)] = &[("et", "ET"), ("swe", "SWE")];
pub const MAURER_HYDRO: &[(&str, &str)] =
    &[("et", "ET"), ("swe", "SWE"), ("surface_runoff", "runoff")];

/// How a variable aggregates in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// Accumulated over the period; aggregated by summation.
    Flux,
    /// Instantaneous; aggregated by averaging.
    State,
}

/// Classifies a canonical variable name.
pub fn var_kind(name: &str) -> VarKind {
    match name {
        "pcp" | "ET" | "runoff" | "baseflow" | "total_runoff" => VarKind::Flux,
        _ => VarKind::State,
    }
}

/// True for auxiliary bound variables like `time_bnds` or `latitude_bnds`.
pub fn is_bounds(name: &str) -> bool {
    name.ends_with(BOUND_SUFFIX)
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn normalize(names: &[&str], table: &[(&str, &str)]) -> BTreeSet<String> {
        let mut out: BTreeSet<String> = names
            .iter()
            .map(|n| {
                table
                    .iter()
                    .find(|(from, _)| from == n)
                    .map(|(_, to)| to.to_string())
                    .unwrap_or_else(|| n.to_string())
            })
            .collect();

        // Loaders derive t_mean from t_min/t_max when absent.
        if out.contains("t_min") && out.contains("t_max") {
            out.insert("t_mean".to_string());
        }
        out
    }

    #[test]
    fn should_produce_identical_met_name_sets() {
        let loca = normalize(&["pr", "tasmin", "tasmax"], LOCA_MET);
        let bcsd = normalize(&["pr", "tasmin", "tasmax"], BCSD_MET);
        let maurer = normalize(&["pr", "tasmin", "tasmax", "tas"], MAURER_MET);
        let livneh = normalize(&["Prec", "Tmin", "Tmax"], LIVNEH_MET);

        assert_eq!(loca, bcsd);
        assert_eq!(loca, maurer);
        assert_eq!(loca, livneh);
        assert!(loca.contains("pcp"));
        assert!(loca.contains("t_mean"));
    }

    #[test]
    fn should_normalise_hydro_names() {
        let maurer = normalize(&["et", "swe", "surface_runoff"], MAURER_HYDRO);
        assert!(maurer.contains("ET"));
        assert!(maurer.contains("SWE"));
        assert!(maurer.contains("runoff"));

        let bcsd = normalize(&["total runoff"], BCSD_HYDRO);
        assert!(bcsd.contains("total_runoff"));
    }

    #[test]
    fn should_classify_variables() {
        for flux in ["pcp", "ET", "runoff", "baseflow", "total_runoff"] {
            assert_eq!(var_kind(flux), VarKind::Flux);
        }
        for state in ["t_min", "t_max", "t_mean", "SWE"] {
            assert_eq!(var_kind(state), VarKind::State);
        }
    }

    #[test]
    fn should_detect_bounds() {
        assert!(is_bounds("time_bnds"));
        assert!(is_bounds("latitude_bnds"));
        assert!(!is_bounds("pcp"));
    }
}
