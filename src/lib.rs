//! Loaders and download tooling for LOCA/BCSD downscaled climate data.
//!
//! The library half of this crate harmonizes gridded netCDF archives from
//! four source families (LOCA, BCSD, Maurer, Livneh) into a common
//! [`Dataset`](dataset::Dataset) model: canonical variable names, a shared
//! coordinate vocabulary, and a synthetic `gcm` axis for multi-model
//! collections. The binary half mirrors the public archives locally.

pub mod analysis;
pub mod calendar;
pub mod catalog;
pub mod config;
pub mod dataset;
pub mod download;
pub mod error;
pub mod manifest;
pub mod reader;
pub mod remap;
pub mod resample;
pub mod schema;

pub use dataset::Dataset;
pub use error::{Error, Result};
