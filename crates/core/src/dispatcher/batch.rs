//! Batch completion tracking.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::Notify;
use tracing::warn;

use super::types::{BatchReport, JobReport};

/// Counts down the jobs of one batch and collects their reports.
///
/// Every job in the batch calls [`Batch::complete`] exactly once, whatever
/// its outcome; [`Batch::wait`] resolves when the count reaches zero.
#[derive(Debug)]
pub struct Batch {
    total: usize,
    remaining: AtomicUsize,
    done: Notify,
    reports: Mutex<Vec<JobReport>>,
    started: Instant,
}

impl Batch {
    /// Creates a batch expecting `total` completions.
    pub fn new(total: usize) -> Arc<Self> {
        Arc::new(Self {
            total,
            remaining: AtomicUsize::new(total),
            done: Notify::new(),
            reports: Mutex::new(Vec::with_capacity(total)),
            started: Instant::now(),
        })
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Jobs that have not completed yet.
    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }

    /// Marks one job as finished.
    pub fn complete(&self, report: JobReport) {
        let path = report.path.clone();
        self.reports
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(report);

        match self
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
        {
            Ok(1) => self.done.notify_waiters(),
            Ok(_) => {}
            Err(_) => warn!(path = %path.display(), "Completion reported for a finished batch"),
        }
    }

    /// Waits until every job in the batch has completed.
    pub async fn wait(&self) {
        loop {
            // Registered before the check so a completion in between is not missed.
            let notified = self.done.notified();
            if self.remaining() == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Snapshot of the reports collected so far.
    pub fn report(&self) -> BatchReport {
        BatchReport {
            reports: self
                .reports
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .clone(),
            elapsed: self.started.elapsed(),
        }
    }
}
