//! Replay errors.

use palmgrab_core::ConfigError;
use thiserror::Error;

/// Errors raised while loading or replaying a session.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid session JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid controller config: {0}")]
    Config(#[from] ConfigError),
    #[error("Frame {frame} references unknown object \"{name}\"")]
    UnknownObject { frame: usize, name: String },
    #[error("Object \"{name}\" is invalid: {reason}")]
    InvalidObject { name: String, reason: String },
    #[error("Frame {frame} is invalid: {reason}")]
    InvalidFrame { frame: usize, reason: String },
}

/// Result type for replay operations.
pub type ReplayResult<T> = Result<T, ReplayError>;
