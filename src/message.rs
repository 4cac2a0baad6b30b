// src/message.rs

//! Completion messages sent by workers to the manager.
//!
//! On the wire a message is one JSON object:
//!
//! ```json
//! {"source": "watch_NEMO", "type": "success nowcast",
//!  "payload": {"nowcast": {"host": "west.cloud", "run date": "2018-01-20"}}}
//! ```
//!
//! The `type` string is parsed once into a [`MsgType`] so decision code never
//! splits strings by position.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;

use crate::worker::WorkerName;

#[derive(Error, Debug)]
pub enum ParseMessageError {
    #[error("empty message type")]
    Empty,

    #[error("message type '{0}' must start with crash, failure or success")]
    UnknownOutcome(String),

    #[error("message type '{0}' has qualifiers but crash takes none")]
    QualifiedCrash(String),

    #[error("message type '{0}' has more than 4 tokens")]
    TooManyTokens(String),

    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),
}

/// Qualifiers that follow the outcome word.
///
/// The `run_type` slot is the first qualifier; for some workers it carries a
/// forecast cycle (`06`), a station (`SCVIP`) or a page type instead of a
/// model run type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MsgDetail {
    pub model: Option<String>,
    pub run_type: Option<String>,
    pub stage: Option<String>,
}

impl MsgDetail {
    pub fn run_type(run_type: impl Into<String>) -> Self {
        Self {
            run_type: Some(run_type.into()),
            ..Self::default()
        }
    }

    pub fn staged(run_type: impl Into<String>, stage: impl Into<String>) -> Self {
        Self {
            run_type: Some(run_type.into()),
            stage: Some(stage.into()),
            ..Self::default()
        }
    }

    pub fn model_staged(
        model: impl Into<String>,
        run_type: impl Into<String>,
        stage: impl Into<String>,
    ) -> Self {
        Self {
            model: Some(model.into()),
            run_type: Some(run_type.into()),
            stage: Some(stage.into()),
        }
    }

    fn from_tokens(tokens: &[&str], raw: &str) -> Result<Self, ParseMessageError> {
        let owned = |s: &str| Some(s.to_string());
        match tokens {
            [] => Ok(Self::default()),
            [run_type] => Ok(Self {
                run_type: owned(run_type),
                ..Self::default()
            }),
            [run_type, stage] => Ok(Self {
                run_type: owned(run_type),
                stage: owned(stage),
                ..Self::default()
            }),
            [model, run_type, stage] => Ok(Self {
                model: owned(model),
                run_type: owned(run_type),
                stage: owned(stage),
            }),
            _ => Err(ParseMessageError::TooManyTokens(raw.to_string())),
        }
    }
}

impl fmt::Display for MsgDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in [&self.model, &self.run_type, &self.stage]
            .into_iter()
            .flatten()
        {
            write!(f, " {part}")?;
        }
        Ok(())
    }
}

/// Structured message type: `crash`, `failure [...]` or `success [...]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub enum MsgType {
    Crash,
    Failure(MsgDetail),
    Success(MsgDetail),
}

impl MsgType {
    pub fn success(run_type: impl Into<String>) -> Self {
        MsgType::Success(MsgDetail::run_type(run_type))
    }

    pub fn failure(run_type: impl Into<String>) -> Self {
        MsgType::Failure(MsgDetail::run_type(run_type))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, MsgType::Success(_))
    }

    pub fn detail(&self) -> Option<&MsgDetail> {
        match self {
            MsgType::Crash => None,
            MsgType::Failure(d) | MsgType::Success(d) => Some(d),
        }
    }

    pub fn run_type(&self) -> Option<&str> {
        self.detail().and_then(|d| d.run_type.as_deref())
    }

    pub fn stage(&self) -> Option<&str> {
        self.detail().and_then(|d| d.stage.as_deref())
    }

    pub fn model(&self) -> Option<&str> {
        self.detail().and_then(|d| d.model.as_deref())
    }
}

impl FromStr for MsgType {
    type Err = ParseMessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        let Some((outcome, rest)) = tokens.split_first() else {
            return Err(ParseMessageError::Empty);
        };
        match *outcome {
            "crash" if rest.is_empty() => Ok(MsgType::Crash),
            "crash" => Err(ParseMessageError::QualifiedCrash(s.to_string())),
            "failure" => Ok(MsgType::Failure(MsgDetail::from_tokens(rest, s)?)),
            "success" => Ok(MsgType::Success(MsgDetail::from_tokens(rest, s)?)),
            _ => Err(ParseMessageError::UnknownOutcome(s.to_string())),
        }
    }
}

impl fmt::Display for MsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MsgType::Crash => write!(f, "crash"),
            MsgType::Failure(d) => write!(f, "failure{d}"),
            MsgType::Success(d) => write!(f, "success{d}"),
        }
    }
}

/// A worker's completion notice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub source: WorkerName,
    #[serde(rename = "type")]
    pub msg_type: MsgType,
    #[serde(default)]
    pub payload: Value,
}

impl Message {
    pub fn new(source: WorkerName, msg_type: MsgType) -> Self {
        Self {
            source,
            msg_type,
            payload: Value::Null,
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    /// Parse one JSON line as emitted by a worker.
    pub fn from_json_line(line: &str) -> Result<Self, ParseMessageError> {
        Ok(serde_json::from_str(line.trim())?)
    }
}
