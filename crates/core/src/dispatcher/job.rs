//! Jobs submitted to the worker pool.

use std::sync::Arc;
use thiserror::Error;

use super::batch::Batch;
use crate::converter::ConverterError;
use crate::discovery::FileTask;

/// Errors that end a job without recording its file.
#[derive(Debug, Error)]
pub enum JobError {
    /// The quality parameter is not a positive integer.
    #[error("Invalid quality '{value}': expected a positive integer bitrate in kbps")]
    InvalidQuality { value: String },

    /// The converter reported a failure.
    #[error(transparent)]
    Convert(#[from] ConverterError),
}

/// Parses the raw quality parameter into a bitrate in kbps.
pub fn parse_quality(value: &str) -> Result<u32, JobError> {
    match value.trim().parse::<u32>() {
        Ok(kbps) if kbps > 0 => Ok(kbps),
        _ => Err(JobError::InvalidQuality {
            value: value.to_string(),
        }),
    }
}

/// One file's worth of work, bound to the batch it belongs to.
#[derive(Debug, Clone)]
pub struct Job {
    task: FileTask,
    quality: String,
    batch: Arc<Batch>,
}

impl Job {
    pub fn new(task: FileTask, quality: impl Into<String>, batch: Arc<Batch>) -> Self {
        Self {
            task,
            quality: quality.into(),
            batch,
        }
    }

    pub fn task(&self) -> &FileTask {
        &self.task
    }

    /// Raw quality parameter; parsed when the job runs.
    pub fn quality(&self) -> &str {
        &self.quality
    }

    pub fn batch(&self) -> &Arc<Batch> {
        &self.batch
    }
}
