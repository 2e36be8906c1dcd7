//! Fixed-size worker pool.

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::config::PoolConfig;
use super::job::{parse_quality, Job, JobError};
use super::types::{JobOutcome, JobReport, PoolStatus};
use crate::converter::{ConversionRequest, Converter};
use crate::ledger::CompletionLedger;
use crate::metrics;

/// Tracks statistics for the pool.
#[derive(Default)]
struct PoolStats {
    active: AtomicU64,
    total_processed: AtomicU64,
    total_skipped: AtomicU64,
    total_failed: AtomicU64,
}

impl PoolStats {
    fn record(&self, outcome: &JobOutcome) {
        let counter = match outcome {
            JobOutcome::Converted { .. } => &self.total_processed,
            JobOutcome::Skipped => &self.total_skipped,
            JobOutcome::Failed { .. } | JobOutcome::Panicked { .. } => &self.total_failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn to_status(&self, workers: usize) -> PoolStatus {
        PoolStatus {
            workers,
            active_jobs: self.active.load(Ordering::Relaxed) as usize,
            total_processed: self.total_processed.load(Ordering::Relaxed),
            total_skipped: self.total_skipped.load(Ordering::Relaxed),
            total_failed: self.total_failed.load(Ordering::Relaxed),
        }
    }
}

/// State shared by every worker.
struct WorkerContext<C: Converter> {
    converter: Arc<C>,
    ledger: Arc<CompletionLedger>,
    stats: PoolStats,
}

impl<C: Converter> WorkerContext<C> {
    /// Ledger check, conversion, and recording for one job.
    async fn execute(&self, job: &Job) -> JobOutcome {
        let start = Instant::now();
        let path = job.task().path();

        if self.ledger.contains(path).await {
            info!(path = %path.display(), "Skipping, already processed");
            return JobOutcome::Skipped;
        }

        match self.convert(job).await {
            Ok(()) => {
                if let Err(e) = self.ledger.record(path).await {
                    metrics::LEDGER_WRITE_FAILURES.inc();
                    warn!(path = %path.display(), error = %e, "Converted but failed to persist ledger");
                }

                let elapsed = start.elapsed();
                metrics::CONVERSION_DURATION.observe(elapsed.as_secs_f64());
                info!(path = %path.display(), elapsed_ms = elapsed.as_millis() as u64, "Done");
                JobOutcome::Converted {
                    duration_ms: elapsed.as_millis() as u64,
                }
            }
            Err(e) => {
                let retryable = matches!(&e, JobError::Convert(c) if c.is_retryable());
                error!(path = %path.display(), error = %e, retryable, "Job failed");
                JobOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    async fn convert(&self, job: &Job) -> Result<(), JobError> {
        let bitrate_kbps = parse_quality(job.quality())?;
        let request = ConversionRequest::new(job.task(), bitrate_kbps);
        self.converter.convert(&request).await?;
        Ok(())
    }
}

/// A fixed set of long-lived workers draining one shared job queue.
///
/// Each worker runs one job at a time, so at most `workers` conversions are
/// in flight. Jobs are not retried, timed out, or cancelled once picked up.
pub struct WorkerPool<C: Converter> {
    config: PoolConfig,
    sender: mpsc::Sender<Job>,
    context: Arc<WorkerContext<C>>,
    workers: Vec<JoinHandle<()>>,
}

impl<C: Converter + 'static> WorkerPool<C> {
    /// Spawns the workers. Must be called within a tokio runtime.
    pub fn start(config: PoolConfig, converter: Arc<C>, ledger: Arc<CompletionLedger>) -> Self {
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let receiver = Arc::new(Mutex::new(receiver));
        let context = Arc::new(WorkerContext {
            converter,
            ledger,
            stats: PoolStats::default(),
        });

        let workers = (0..config.workers)
            .map(|id| {
                tokio::spawn(Self::worker_loop(
                    id,
                    Arc::clone(&receiver),
                    Arc::clone(&context),
                ))
            })
            .collect();

        info!(
            workers = config.workers,
            converter = context.converter.name(),
            "Worker pool started"
        );

        Self {
            config,
            sender,
            context,
            workers,
        }
    }

    /// Feeds `jobs` into the queue from a separate task.
    ///
    /// The queue is minimally buffered, so the feeder advances at the pace
    /// the workers take jobs.
    pub fn dispatch(&self, jobs: Vec<Job>) -> JoinHandle<()> {
        tokio::spawn(feed(self.sender.clone(), jobs))
    }

    /// Returns the current pool status.
    pub fn status(&self) -> PoolStatus {
        self.context.stats.to_status(self.config.workers)
    }

    pub fn ledger(&self) -> &Arc<CompletionLedger> {
        &self.context.ledger
    }

    /// Closes the queue and waits for the workers to drain it.
    pub async fn shutdown(self) {
        drop(self.sender);
        for handle in self.workers {
            if let Err(e) = handle.await {
                error!(error = %e, "Worker task ended abnormally");
            }
        }
        info!("Worker pool stopped");
    }

    async fn worker_loop(
        id: usize,
        receiver: Arc<Mutex<mpsc::Receiver<Job>>>,
        context: Arc<WorkerContext<C>>,
    ) {
        loop {
            let job = receiver.lock().await.recv().await;
            let Some(job) = job else {
                debug!(worker = id, "Job queue closed, worker exiting");
                break;
            };

            context.stats.active.fetch_add(1, Ordering::Relaxed);
            let outcome = match AssertUnwindSafe(context.execute(&job)).catch_unwind().await {
                Ok(outcome) => outcome,
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    error!(
                        worker = id,
                        path = %job.task().path().display(),
                        panic = %message,
                        "Job panicked"
                    );
                    JobOutcome::Panicked { message }
                }
            };
            context.stats.active.fetch_sub(1, Ordering::Relaxed);

            context.stats.record(&outcome);
            metrics::JOBS_TOTAL
                .with_label_values(&[outcome.label()])
                .inc();

            job.batch().complete(JobReport {
                path: job.task().path().to_path_buf(),
                outcome,
            });
        }
    }
}

async fn feed(sender: mpsc::Sender<Job>, jobs: Vec<Job>) {
    for job in jobs {
        if let Err(mpsc::error::SendError(job)) = sender.send(job).await {
            // Nobody will run it, but the batch still has to finish.
            job.batch().complete(JobReport {
                path: job.task().path().to_path_buf(),
                outcome: JobOutcome::Failed {
                    error: "Worker pool is shut down".to_string(),
                },
            });
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
