//! Root directories for each data source family.
//!
//! Defaults point at the shared-filesystem layout the archives were mirrored
//! to; any of them can be overridden from a TOML file (`~/.loca.toml`, or a
//! path given on the command line).

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Roots {
    /// LOCA daily meteorology, `<model>/<resolution>/<scenario>/<ens>/<var>/*.nc`.
    pub loca_met: PathBuf,
    /// LOCA VIC output, `<model>/vic_output.<scenario>.netcdf/*.nc`.
    pub loca_vic: PathBuf,
    /// BCSD daily forcing, `<model>_<scenario>_<ens>/*.nc`.
    pub bcsd_met: PathBuf,
    /// BCSD daily VIC output.
    pub bcsd_vic: PathBuf,
    /// BCSD monthly forcing.
    pub bcsd_met_mon: PathBuf,
    /// BCSD monthly VIC output.
    pub bcsd_vic_mon: PathBuf,
    /// Maurer daily meteorology, `<var>/*.nc`.
    pub maurer_met: PathBuf,
    /// Maurer monthly VIC output, flat `*.nc`.
    pub maurer_vic: PathBuf,
    /// Livneh daily meteorology.
    pub livneh_met: PathBuf,
    /// Livneh VIC output.
    pub livneh_vic: PathBuf,
    /// Base URL of the public archive the download command mirrors.
    pub archive_url: String,
}

impl Default for Roots {
    fn default() -> Self {
        Roots {
            loca_met: "/glade2/scratch2/jhamman/LOCA_daily/met_data".into(),
            loca_vic: "/glade/scratch/jhamman/LOCA_daily_VIC/vic_output".into(),
            bcsd_met: "/glade/scratch/jhamman/reruns/BCSD_daily_forc_nc".into(),
            bcsd_vic: "/glade/scratch/jhamman/reruns/BCSD_daily_VIC_nc".into(),
            bcsd_met_mon: "/glade/scratch/jhamman/reruns/BCSD_mon_forc_nc".into(),
            bcsd_vic_mon: "/glade/scratch/jhamman/reruns/BCSD_mon_VIC_nc".into(),
            maurer_met: "/glade/p/ral/RHAP/jhamman/inputdata/metdata/maurer".into(),
            maurer_vic: "/glade/scratch/jhamman/reruns/historical_mon_VIC".into(),
            livneh_met: "/glade2/scratch2/jhamman/GARD_inputs/livneh2014.1_16deg".into(),
            livneh_vic: "/glade2/scratch2/jhamman/LOCA_daily_VIC/vic_output/Livneh_L14_CONUS"
                .into(),
            archive_url: "https://gdo-dcp.ucllnl.org/pub".into(),
        }
    }
}

impl Roots {
    /// Loads roots from `path` when given, from `~/.loca.toml` when that
    /// exists, and falls back to the defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Roots> {
        match path {
            Some(p) => Self::from_file(p),
            None => match default_config_path() {
                Some(p) if p.is_file() => Self::from_file(&p),
                _ => Ok(Roots::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Roots> {
        let text = fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".loca.toml"))
}

// -- Tests -------------------------------------------------------------------
