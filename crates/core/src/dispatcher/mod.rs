//! Bounded-concurrency job dispatch.
//!
//! A [`WorkerPool`] owns a fixed number of workers that pull [`Job`]s from a
//! shared queue. Each job checks the completion ledger, converts the file
//! when needed and reports its [`JobOutcome`] to the [`Batch`] it belongs to.

mod batch;
mod config;
mod job;
mod pool;
mod types;

pub use batch::Batch;
pub use config::PoolConfig;
pub use job::{parse_quality, Job, JobError};
pub use pool::WorkerPool;
pub use types::{BatchReport, JobOutcome, JobReport, PoolStatus};
