//! Types for the batch orchestrator.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a whole batch.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Root directory does not exist.
    #[error("root not found: {path}")]
    RootNotFound { path: PathBuf },

    /// Root exists but is not a directory.
    #[error("root is not a directory: {path}")]
    RootNotDirectory { path: PathBuf },

    /// Root could not be inspected or resolved.
    #[error("failed to access root {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The discovery task died before returning.
    #[error("discovery task failed: {0}")]
    Discovery(#[from] tokio::task::JoinError),
}
