pub mod config;
pub mod converter;
pub mod discovery;
pub mod dispatcher;
pub mod ledger;
pub mod metrics;
pub mod orchestrator;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, load_config_or_default, validate_config, Config,
    ConfigError, LedgerConfig, MetricsConfig,
};
pub use converter::{Converter, ConverterError, FfmpegConverter};
pub use discovery::{discover, FileTask, MediaType};
pub use dispatcher::{BatchReport, JobOutcome, PoolConfig, WorkerPool};
pub use ledger::{CompletionLedger, LedgerError};
pub use orchestrator::{Orchestrator, OrchestratorError};
