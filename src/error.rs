//! Library error type.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("netCDF error: {0}")]
    Netcdf(#[from] netcdf::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("no files to open: {0}")]
    NoFiles(PathBuf),

    #[error("missing variable `{0}`")]
    MissingVariable(String),

    #[error("variable `{0}` appears in more than one file for the same period")]
    DuplicateVariable(String),

    #[error("missing coordinate `{0}`")]
    MissingCoordinate(String),

    #[error("coordinate mismatch: {0}")]
    CoordinateMismatch(String),

    #[error("no datasets to concatenate")]
    EmptyConcat,

    #[error("shape mismatch for `{name}`: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        name: String,
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("cannot decode time axis: {0}")]
    TimeDecode(String),

    #[error("not supported: {0}")]
    Unsupported(String),
}
