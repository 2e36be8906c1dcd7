//! Batch orchestration.
//!
//! The orchestrator turns a root directory into one batch of jobs:
//! - **Discovery**: blocking walk of the tree, run off the async workers
//! - **Dispatch**: one job per MP3/FLAC file, fed to the worker pool
//! - **Completion**: waits for every job, then reports the counts

mod runner;
mod types;

pub use runner::Orchestrator;
pub use types::OrchestratorError;
