use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reencode_core::{
    load_config, load_config_or_default, metrics, validate_config, CompletionLedger, Config,
    Converter, FfmpegConverter, Orchestrator, WorkerPool,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Bitrate used when no quality argument is given.
const DEFAULT_QUALITY: &str = "128";

/// Config file read when `REENCODE_CONFIG` is not set.
const DEFAULT_CONFIG_FILE: &str = "reencode.toml";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    init_logging();

    let (root, quality) = parse_args(std::env::args().skip(1))?;
    info!(version = VERSION, root = %root.display(), quality = %quality, "reencode starting");

    let config = load()?;
    validate_config(&config).context("Configuration validation failed")?;
    info!(
        workers = config.pool.workers,
        ledger = %config.ledger.path.display(),
        ffmpeg = %config.converter.ffmpeg_path.display(),
        "Configuration loaded"
    );

    let ledger = Arc::new(CompletionLedger::load(&config.ledger.path).await);
    info!(entries = ledger.len().await, "Completion ledger ready");

    let converter = Arc::new(FfmpegConverter::new(config.converter.clone()));
    // Every job will fail on its own if this is real, so carry on.
    if let Err(e) = converter.validate().await {
        warn!(error = %e, "Converter validation failed");
    }

    let pool = WorkerPool::start(config.pool.clone(), converter, ledger);
    let orchestrator = Orchestrator::new(pool);

    let report = orchestrator
        .run(&root, &quality)
        .await
        .with_context(|| format!("Batch over {} failed", root.display()))?;

    for failure in report.failures() {
        warn!(path = %failure.path.display(), outcome = ?failure.outcome, "Not re-encoded");
    }

    orchestrator.shutdown().await;

    if let Some(textfile) = &config.metrics.textfile {
        write_metrics(textfile).await;
    }

    info!(
        converted = report.converted(),
        skipped = report.skipped(),
        failed = report.failed(),
        "reencode finished"
    );
    Ok(())
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());

    let json = std::env::var("REENCODE_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Returns the root directory and raw quality string.
fn parse_args(mut args: impl Iterator<Item = String>) -> Result<(PathBuf, String)> {
    let Some(root) = args.next() else {
        bail!("usage: reencode <root> [quality]");
    };
    let quality = args.next().unwrap_or_else(|| DEFAULT_QUALITY.to_string());
    if let Some(extra) = args.next() {
        warn!(argument = %extra, "Ignoring extra arguments");
    }
    Ok((PathBuf::from(root), quality))
}

/// An explicit `REENCODE_CONFIG` must exist; the default file is optional.
fn load() -> Result<Config> {
    match std::env::var("REENCODE_CONFIG") {
        Ok(path) => {
            let path = PathBuf::from(path);
            info!("Loading configuration from {:?}", path);
            load_config(&path).with_context(|| format!("Failed to load config from {:?}", path))
        }
        Err(_) => {
            let path = Path::new(DEFAULT_CONFIG_FILE);
            load_config_or_default(path)
                .with_context(|| format!("Failed to load config from {:?}", path))
        }
    }
}

async fn write_metrics(path: &Path) {
    let text = match metrics::encode_metrics() {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "Failed to encode metrics");
            return;
        }
    };
    match tokio::fs::write(path, text).await {
        Ok(()) => info!(path = %path.display(), "Metrics written"),
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to write metrics"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn test_parse_args_defaults_quality() {
        let (root, quality) = parse_args(args(&["/music"])).unwrap();
        assert_eq!(root, PathBuf::from("/music"));
        assert_eq!(quality, "128");
    }

    #[test]
    fn test_parse_args_explicit_quality() {
        let (_, quality) = parse_args(args(&["/music", "96"])).unwrap();
        assert_eq!(quality, "96");
    }

    #[test]
    fn test_parse_args_missing_root() {
        let err = parse_args(args(&[])).unwrap_err();
        assert!(err.to_string().contains("usage"));
    }
}
