use std::path::PathBuf;

use thiserror::Error;

use crate::model::{LaneId, TaskId};

/// Errors raised by the lane-packing engine and task operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("task {0} not found")]
    UnknownTask(TaskId),

    #[error("lane {0} not found")]
    UnknownLane(LaneId),

    #[error("tasks {first} and {second} overlap in slot {slot} of lane {lane}")]
    InvariantViolation {
        lane: LaneId,
        slot: u32,
        first: TaskId,
        second: TaskId,
    },
}

/// Errors raised while loading or saving user settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no configuration directory available on this platform")]
    NoConfigDir,

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
