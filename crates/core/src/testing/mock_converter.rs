//! Mock converter for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::converter::{ConversionRequest, ConversionResult, Converter, ConverterError, MediaInfo};

/// A recorded conversion request for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedConversion {
    /// The request that was submitted.
    pub request: ConversionRequest,
    /// Whether the conversion succeeded.
    pub success: bool,
}

/// Decrements the in-flight counter even when the conversion panics.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Mock implementation of the Converter trait.
///
/// Provides controllable behavior for testing:
/// - Track conversion requests for assertions
/// - Fail or panic on chosen paths
/// - Control probe results
/// - Measure how many conversions ran at once
///
/// Clones share state, so a clone handed to a pool can be inspected from the
/// test.
///
/// # Example
///
/// ```rust,ignore
/// use reencode_core::testing::MockConverter;
///
/// let converter = MockConverter::new();
/// converter.fail_path("/music/broken.mp3").await;
///
/// // Run a batch...
///
/// assert_eq!(converter.conversion_count().await, 3);
/// assert!(converter.peak_concurrency() <= 2);
/// ```
#[derive(Debug, Clone)]
pub struct MockConverter {
    conversions: Arc<RwLock<Vec<RecordedConversion>>>,
    probe_results: Arc<RwLock<HashMap<PathBuf, MediaInfo>>>,
    /// Paths whose conversion always fails.
    failing_paths: Arc<RwLock<HashSet<PathBuf>>>,
    /// Paths whose conversion panics.
    panicking_paths: Arc<RwLock<HashSet<PathBuf>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<ConverterError>>>,
    /// Simulated conversion duration in milliseconds.
    conversion_duration_ms: Arc<RwLock<u64>>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

impl Default for MockConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConverter {
    /// Create a new mock converter.
    pub fn new() -> Self {
        Self {
            conversions: Arc::new(RwLock::new(Vec::new())),
            probe_results: Arc::new(RwLock::new(HashMap::new())),
            failing_paths: Arc::new(RwLock::new(HashSet::new())),
            panicking_paths: Arc::new(RwLock::new(HashSet::new())),
            next_error: Arc::new(RwLock::new(None)),
            conversion_duration_ms: Arc::new(RwLock::new(5)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get all recorded conversions.
    pub async fn recorded_conversions(&self) -> Vec<RecordedConversion> {
        self.conversions.read().await.clone()
    }

    /// Get the number of conversions attempted.
    pub async fn conversion_count(&self) -> usize {
        self.conversions.read().await.len()
    }

    /// Set a probe result for a specific path.
    pub async fn set_probe_result(&self, path: impl AsRef<Path>, info: MediaInfo) {
        self.probe_results
            .write()
            .await
            .insert(path.as_ref().to_path_buf(), info);
    }

    /// Make every conversion of `path` fail.
    pub async fn fail_path(&self, path: impl AsRef<Path>) {
        self.failing_paths
            .write()
            .await
            .insert(path.as_ref().to_path_buf());
    }

    /// Make every conversion of `path` panic.
    pub async fn panic_on_path(&self, path: impl AsRef<Path>) {
        self.panicking_paths
            .write()
            .await
            .insert(path.as_ref().to_path_buf());
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: ConverterError) {
        *self.next_error.write().await = Some(error);
    }

    /// Set the simulated conversion duration.
    pub async fn set_conversion_duration(&self, duration: Duration) {
        *self.conversion_duration_ms.write().await = duration.as_millis() as u64;
    }

    /// Highest number of conversions that ran at the same time.
    pub fn peak_concurrency(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn take_error(&self) -> Option<ConverterError> {
        self.next_error.write().await.take()
    }

    async fn record(&self, request: &ConversionRequest, success: bool) {
        self.conversions.write().await.push(RecordedConversion {
            request: request.clone(),
            success,
        });
    }
}

#[async_trait]
impl Converter for MockConverter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn probe(&self, path: &Path) -> Result<MediaInfo, ConverterError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        if let Some(info) = self.probe_results.read().await.get(path) {
            return Ok(info.clone());
        }

        Ok(MediaInfo {
            path: path.to_path_buf(),
            audio_codec: None,
            audio_bitrate_kbps: Some(320),
        })
    }

    async fn convert(&self, request: &ConversionRequest) -> Result<ConversionResult, ConverterError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        let duration_ms = *self.conversion_duration_ms.read().await;
        if duration_ms > 0 {
            tokio::time::sleep(Duration::from_millis(duration_ms)).await;
        }

        if self.panicking_paths.read().await.contains(&request.input_path) {
            self.record(request, false).await;
            panic!("mock converter panicked on {}", request.input_path.display());
        }

        if let Some(err) = self.take_error().await {
            self.record(request, false).await;
            return Err(err);
        }

        if self.failing_paths.read().await.contains(&request.input_path) {
            self.record(request, false).await;
            return Err(ConverterError::conversion_failed(
                format!("mock failure for {}", request.input_path.display()),
                None,
            ));
        }

        self.record(request, true).await;

        Ok(ConversionResult {
            output_path: request.input_path.clone(),
            output_size_bytes: 4 * 1024 * 1024,
            duration_ms,
            media_type: request.media_type,
            bitrate_kbps: request.bitrate_kbps,
        })
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        Ok(())
    }
}
