//! Download manifests: remote URL to local target, per archive kind.
//!
//! The archive layout is fixed, so manifests are generated from the model,
//! scenario and variable tables rather than listed remotely.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::ValueEnum;

use crate::catalog::Scenario;
use crate::config::Roots;

const MET_ROOT: &str = "dcp/archive/cmip5/loca/LOCA_2016-04-02";
const VIC_ROOT: &str = "dcp/archive/cmip5/loca/LOCA_VIC_dpierce_2017-02-28";
const LIVNEH_MET_ROOT: &str = "dcp/archive/cmip5/loca/livneh2014.1_16deg/netcdf/daily";

/// Hydrology variables published per VIC run.
const VIC_VARIABLES: &[&str] = &[
    "runoff",
    "baseflow",
    "SWE",
    "ET",
    "windspeed",
    "shortwave_in",
];

const MET_VARIABLES: &[&str] = &["pr", "tasmin", "tasmax"];

const SCENARIOS: &[Scenario] = &[Scenario::Historical, Scenario::Rcp45, Scenario::Rcp85];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Kind {
    /// LOCA daily meteorology
    Met,
    /// LOCA VIC hydrology output
    Vic,
    /// Livneh forcing data
    Livneh,
    /// Livneh-driven VIC output
    LivnehVic,
}

/// One file transfer: where it lives remotely and where it lands locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub remote: String,
    pub target: PathBuf,
}

/// Builds the transfer list for an archive kind.
pub fn build(kind: Kind, roots: &Roots) -> Vec<Transfer> {
    match kind {
        Kind::Met => met_manifest(roots),
        Kind::Vic => vic_manifest(roots),
        Kind::Livneh => livneh_manifest(roots),
        Kind::LivnehVic => livneh_vic_manifest(roots),
    }
}

/// Ensemble member per model and scenario. A handful of models publish a
/// different member for the projection scenarios.
fn met_ensembles(scen: Scenario) -> BTreeMap<&'static str, &'static str> {
    let mut members: BTreeMap<&str, &str> = BTreeMap::new();
    for model in met_models() {
        members.insert(model, "r1i1p1");
    }
    members.insert("CCSM4", "r6i1p1");
    members.insert("GISS-E2-H", "r6i1p1");
    members.insert("GISS-E2-R", "r6i1p1");

    match scen {
        Scenario::Historical => {}
        Scenario::Rcp45 => {
            members.insert("GISS-E2-H", "r6i1p3");
            members.insert("EC-EARTH", "r8i1p1");
        }
        Scenario::Rcp85 => {
            members.insert("EC-EARTH", "r2i1p1");
            members.insert("GISS-E2-H", "r2i1p1");
            members.insert("GISS-E2-R", "r2i1p1");
        }
    }
    members
}

fn met_models() -> &'static [&'static str] {
    &[
        "ACCESS1-0",
        "ACCESS1-3",
        "CCSM4",
        "CESM1-BGC",
        "CESM1-CAM5",
        "CMCC-CM",
        "CMCC-CMS",
        "CNRM-CM5",
        "CSIRO-Mk3-6-0",
        "CanESM2",
        "EC-EARTH",
        "FGOALS-g2",
        "GFDL-CM3",
        "GFDL-ESM2G",
        "GFDL-ESM2M",
        "GISS-E2-H",
        "GISS-E2-R",
        "HadGEM2-AO",
        "HadGEM2-CC",
        "HadGEM2-ES",
        "IPSL-CM5A-LR",
        "IPSL-CM5A-MR",
        "MIROC-ESM",
        "MIROC-ESM-CHEM",
        "MIROC5",
        "MPI-ESM-LR",
        "MPI-ESM-MR",
        "MRI-CGCM3",
        "NorESM1-M",
        "bcc-csm1-1",
        "bcc-csm1-1-m",
        "inmcm4",
    ]
}

/// One `YYYY0101-YYYY1231` range per year of the scenario.
fn drange_list(scen: Scenario) -> Vec<String> {
    scen.valid_years()
        .map(|y| format!("{:04}0101-{:04}1231", y, y))
        .collect()
}

fn year_list(scen: Scenario) -> Vec<String> {
    scen.valid_years().map(|y| format!("{:04}", y)).collect()
}

fn met_manifest(roots: &Roots) -> Vec<Transfer> {
    let mut transfers = Vec::new();

    for &scen in SCENARIOS {
        let members = met_ensembles(scen);
        for (model, ens) in members {
            for var in MET_VARIABLES {
                for drange in drange_list(scen) {
                    let fname = format!(
                        "{var}_day_{model}_{scen}_{ens}_{drange}.LOCA_2016-04-02.16th.nc"
                    );
                    let rel = format!("{model}/16th/{scen}/{ens}/{var}/{fname}");
                    transfers.push(Transfer {
                        remote: format!("{}/{}/{}", roots.archive_url, MET_ROOT, rel),
                        target: roots.loca_met.join(rel),
                    });
                }
            }
        }
    }
    transfers
}

fn vic_manifest(roots: &Roots) -> Vec<Transfer> {
    let mut transfers = Vec::new();

    for &scen in SCENARIOS {
        for model in met_models() {
            for var in VIC_VARIABLES {
                for year in year_list(scen) {
                    let fname = format!("{var}.{year}.v0.nc");
                    let rel = format!("{model}/vic_output.{scen}.netcdf/{fname}");
                    transfers.push(Transfer {
                        remote: format!("{}/{}/{}", roots.archive_url, VIC_ROOT, rel),
                        target: roots.loca_vic.join(rel),
                    });
                }
            }
        }
    }
    transfers
}

fn livneh_manifest(roots: &Roots) -> Vec<Transfer> {
    let mut transfers = Vec::new();

    for year in 1950..=2013 {
        for month in 1..=12 {
            let fname = format!("livneh_NAmerExt_15Oct2014.{:04}{:02}.nc", year, month);
            transfers.push(Transfer {
                remote: format!("{}/{}/{}", roots.archive_url, LIVNEH_MET_ROOT, fname),
                target: roots.livneh_met.join(fname),
            });
        }
    }
    transfers
}

fn livneh_vic_manifest(roots: &Roots) -> Vec<Transfer> {
    let mut transfers = Vec::new();

    // The Livneh-driven runs sit next to the per-model VIC output. Targets
    // land beside the model trees, so derive the parent of the CONUS root.
    let vic_target = roots
        .livneh_vic
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| roots.livneh_vic.clone());

    for dset in ["Livneh_L14", "Livneh_L14_CONUS"] {
        for year in year_list(Scenario::Historical) {
            for var in VIC_VARIABLES {
                let fname = format!("{var}.{year}.v0.nc");
                let rel = format!("{dset}/{fname}");
                transfers.push(Transfer {
                    remote: format!("{}/{}/{}", roots.archive_url, VIC_ROOT, rel),
                    target: vic_target.join(rel),
                });
            }
        }
    }
    transfers
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_met_manifest() {
        let roots = Roots::default();
        let transfers = met_manifest(&roots);

        // 32 models x 3 variables x (56 + 95 + 95) years.
        assert_eq!(transfers.len(), 32 * 3 * 246);

        let sample = format!(
            "{}/{}/CCSM4/16th/historical/r6i1p1/pr/pr_day_CCSM4_historical_r6i1p1_19500101-19501231.LOCA_2016-04-02.16th.nc",
            roots.archive_url, MET_ROOT
        );
        assert!(transfers.iter().any(|t| t.remote == sample));
    }

    #[test]
    fn should_override_projection_ensembles() {
        let hist = met_ensembles(Scenario::Historical);
        assert_eq!(hist["EC-EARTH"], "r1i1p1");
        assert_eq!(hist["CCSM4"], "r6i1p1");

        let rcp45 = met_ensembles(Scenario::Rcp45);
        assert_eq!(rcp45["EC-EARTH"], "r8i1p1");
        assert_eq!(rcp45["GISS-E2-H"], "r6i1p3");

        let rcp85 = met_ensembles(Scenario::Rcp85);
        assert_eq!(rcp85["GISS-E2-R"], "r2i1p1");
    }

    #[test]
    fn should_build_vic_manifest() {
        let roots = Roots::default();
        let transfers = vic_manifest(&roots);
        assert_eq!(transfers.len(), 32 * 6 * 246);

        let t = transfers
            .iter()
            .find(|t| t.remote.ends_with("MIROC5/vic_output.rcp85.netcdf/SWE.2100.v0.nc"))
            .unwrap();
        assert!(t.target.ends_with("MIROC5/vic_output.rcp85.netcdf/SWE.2100.v0.nc"));
    }

    #[test]
    fn should_build_livneh_manifest() {
        let roots = Roots::default();
        let transfers = livneh_manifest(&roots);

        // 1950-2013, twelve months each.
        assert_eq!(transfers.len(), 64 * 12);
        assert!(transfers[0]
            .remote
            .ends_with("livneh_NAmerExt_15Oct2014.195001.nc"));
    }

    #[test]
    fn should_build_livneh_vic_manifest() {
        let roots = Roots::default();
        let transfers = livneh_vic_manifest(&roots);

        // Two datasets x 56 years x 6 variables.
        assert_eq!(transfers.len(), 2 * 56 * 6);
        assert!(transfers
            .iter()
            .any(|t| t.remote.ends_with("Livneh_L14_CONUS/ET.2005.v0.nc")));
    }

    #[test]
    fn should_format_dranges() {
        let dranges = drange_list(Scenario::Historical);
        assert_eq!(dranges.len(), 56);
        assert_eq!(dranges[0], "19500101-19501231");
        assert_eq!(dranges[55], "20050101-20051231");
    }
}
