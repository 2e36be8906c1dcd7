//! Error types for the ledger module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while persisting the ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Writing the ledger file failed.
    #[error("Failed to write ledger {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Encoding the ledger entries failed.
    #[error("Failed to encode ledger: {0}")]
    Serialize(#[from] serde_json::Error),
}
