//! Error types for nix-builder

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while evaluating a deployment
#[derive(Error, Debug)]
pub enum NixError {
    /// Evaluator executable not found
    #[error("nix-build is not installed or not in PATH")]
    NixNotFound,

    /// Evaluator exited unsuccessfully
    #[error("nix-build failed (exit code {}): {stderr}", .code.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    NixCommandFailed {
        /// Exit code, `None` when the process was killed by a signal
        code: Option<i32>,
        /// Captured stderr
        stderr: String,
    },

    /// Evaluator did not finish in time
    #[error("nix-build timed out after {secs} seconds")]
    Timeout { secs: u64 },

    /// Arguments could not be serialized to JSON
    #[error("failed to serialize evaluation arguments: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Arguments have the wrong shape
    #[error("invalid evaluation arguments: {0}")]
    InvalidArgs(String),

    /// The deployment rejected the result path
    #[error("failed to load spec from {}: {reason}", .path.display())]
    SpecLoad { path: PathBuf, reason: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl NixError {
    /// Whether the error came from running the evaluator process
    pub fn is_subprocess(&self) -> bool {
        matches!(
            self,
            NixError::NixNotFound | NixError::NixCommandFailed { .. } | NixError::Timeout { .. }
        )
    }
}
