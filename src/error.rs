//! Error types shared across the crate.
//!
//! # Design Decisions
//! - One enum, one variant per failure kind, so the HTTP layer can map
//!   each kind to a status code without string matching
//! - Validation failures carry the check command's output verbatim plus
//!   the rendered input that was checked; callers surface both

use thiserror::Error;

/// Outcome of a failed external check command.
///
/// `output` is the combined stdout+stderr of the command; `input` is the
/// rendered candidate document that was handed to it via `FILE`.
#[derive(Debug, Clone)]
pub struct ExecError {
    pub output: String,
    pub input: String,
}

impl std::fmt::Display for ExecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "check command failed: {}", self.output.trim_end())
    }
}

impl std::error::Error for ExecError {}

/// Error kinds produced by the configuration engine.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Malformed JSON in the store document or a request body.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An edit's target path did not resolve to the expected node type.
    #[error("path {0}: not found or wrong node type")]
    Path(String),

    /// The external check command rejected the rendered candidate.
    #[error(transparent)]
    Validation(ExecError),

    /// Unrecognized or unreachable config store backend.
    #[error("config store: {0}")]
    Backend(String),

    /// The check or reload command could not be spawned at all.
    #[error("exec: {0}")]
    Exec(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
