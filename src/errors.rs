// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

use crate::message::ParseMessageError;
use crate::next_workers::DecisionError;

#[derive(Error, Debug)]
pub enum NowcastError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Bad message: {0}")]
    Message(#[from] ParseMessageError),

    #[error(transparent)]
    Decision(#[from] DecisionError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, NowcastError>;
