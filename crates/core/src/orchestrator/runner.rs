//! Batch orchestrator implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::converter::Converter;
use crate::discovery::discover_tasks;
use crate::dispatcher::{Batch, BatchReport, Job, PoolStatus, WorkerPool};

use super::types::OrchestratorError;

/// Drives one batch run from a root directory to a [`BatchReport`].
pub struct Orchestrator<C: Converter + 'static> {
    pool: WorkerPool<C>,
}

impl<C: Converter + 'static> Orchestrator<C> {
    /// Create a new orchestrator over a started pool.
    pub fn new(pool: WorkerPool<C>) -> Self {
        Self { pool }
    }

    /// Re-encodes every MP3 and FLAC file under `root` at `quality` kbps.
    ///
    /// Returns once every discovered job has completed. Only problems with
    /// the root itself are errors; per-file failures land in the report.
    pub async fn run(&self, root: &Path, quality: &str) -> Result<BatchReport, OrchestratorError> {
        let root = Self::resolve_root(root).await?;
        info!(root = %root.display(), quality, "Starting batch");

        let walk_root = root.clone();
        let tasks = tokio::task::spawn_blocking(move || discover_tasks(&walk_root)).await?;
        debug!(eligible = tasks.len(), "Discovered media files");

        let batch = Batch::new(tasks.len());
        let jobs = tasks
            .into_iter()
            .map(|task| Job::new(task, quality, Arc::clone(&batch)))
            .collect();

        let feeder = self.pool.dispatch(jobs);
        batch.wait().await;
        if let Err(e) = feeder.await {
            warn!(error = %e, "Feeder task ended abnormally");
        }

        let report = batch.report();
        info!(
            root = %root.display(),
            total = report.total(),
            converted = report.converted(),
            skipped = report.skipped(),
            failed = report.failed(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Batch finished"
        );
        Ok(report)
    }

    /// Current status of the underlying pool.
    pub fn status(&self) -> PoolStatus {
        self.pool.status()
    }

    /// Shuts down the worker pool.
    pub async fn shutdown(self) {
        self.pool.shutdown().await;
    }

    async fn resolve_root(root: &Path) -> Result<PathBuf, OrchestratorError> {
        let metadata = match tokio::fs::metadata(root).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(OrchestratorError::RootNotFound {
                    path: root.to_path_buf(),
                })
            }
            Err(source) => {
                return Err(OrchestratorError::Io {
                    path: root.to_path_buf(),
                    source,
                })
            }
        };

        if !metadata.is_dir() {
            return Err(OrchestratorError::RootNotDirectory {
                path: root.to_path_buf(),
            });
        }

        std::path::absolute(root).map_err(|source| OrchestratorError::Io {
            path: root.to_path_buf(),
            source,
        })
    }
}
