//! Types for the dispatcher module.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// How a single job ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum JobOutcome {
    /// File was re-encoded and recorded in the ledger.
    Converted { duration_ms: u64 },
    /// File was already in the ledger; nothing ran.
    Skipped,
    /// Quality parsing or the conversion failed; the file stays unrecorded.
    Failed { error: String },
    /// The job panicked; caught at the worker boundary.
    Panicked { message: String },
}

impl JobOutcome {
    /// Label used for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Converted { .. } => "converted",
            Self::Skipped => "skipped",
            Self::Failed { .. } => "failed",
            Self::Panicked { .. } => "panicked",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. } | Self::Panicked { .. })
    }
}

/// Result of one job within a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: JobOutcome,
}

/// Aggregate result of a whole batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Per-job results in completion order.
    pub reports: Vec<JobReport>,
    /// Wall-clock time from batch creation to the last completion.
    #[serde(serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.reports.len()
    }

    pub fn converted(&self) -> usize {
        self.count(|o| matches!(o, JobOutcome::Converted { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, JobOutcome::Skipped))
    }

    /// Failed and panicked jobs.
    pub fn failed(&self) -> usize {
        self.count(JobOutcome::is_failure)
    }

    /// Iterates over the jobs that did not succeed.
    pub fn failures(&self) -> impl Iterator<Item = &JobReport> {
        self.reports.iter().filter(|r| r.outcome.is_failure())
    }

    fn count(&self, pred: impl Fn(&JobOutcome) -> bool) -> usize {
        self.reports.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// Snapshot of the worker pool counters.
#[derive(Debug, Clone, Serialize)]
pub struct PoolStatus {
    /// Number of workers in the pool.
    pub workers: usize,
    /// Jobs currently executing.
    pub active_jobs: usize,
    /// Jobs converted since the pool started.
    pub total_processed: u64,
    /// Jobs skipped because they were already in the ledger.
    pub total_skipped: u64,
    /// Jobs that failed or panicked.
    pub total_failed: u64,
}
