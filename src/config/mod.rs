// src/config/mod.rs

//! Configuration loading and validation.
//!
//! - TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate host / run type references (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_from_str};
pub use model::{
    Config, CtdData, FerryData, FvcomRuns, HostConfig, ManagerSection, Observations, RawConfig,
    RunSection, RunTypeConfig, StartupWorker, WaveForecasts,
};
