// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{Config, RawConfig};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfig`.
///
/// This only performs TOML deserialization; it does **not** check host or
/// run type references. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    load_from_str(&contents)
}

pub fn load_from_str(contents: &str) -> Result<RawConfig> {
    Ok(toml::from_str(contents)?)
}

/// Load a configuration file from path and validate it.
///
/// Missing required sections and dangling host references are startup
/// errors, never per-message ones.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Config> {
    let raw = load_from_path(&path)?;
    Config::try_from(raw)
}
