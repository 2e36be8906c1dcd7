//! Error types for the converter module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during conversion.
#[derive(Debug, Error)]
pub enum ConverterError {
    /// FFmpeg binary not found.
    #[error("FFmpeg not found at path: {path}")]
    FfmpegNotFound { path: PathBuf },

    /// The ffmpeg build lacks a required encoder.
    #[error("FFmpeg encoder not available: {codec}")]
    EncoderUnavailable { codec: String },

    /// Input file not found.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// Input file is not a supported format.
    #[error("Unsupported input format: {format}")]
    UnsupportedInputFormat { format: String },

    /// Target bitrate is not usable.
    #[error("Invalid target bitrate: {bitrate_kbps} kbps")]
    InvalidBitrate { bitrate_kbps: u32 },

    /// Input is already encoded at or below the target bitrate.
    #[error("Bitrate is already lower than the desired output: {current_kbps} kbps (target {target_kbps} kbps)")]
    BitrateAlreadyLow { current_kbps: u32, target_kbps: u32 },

    /// Conversion process failed.
    #[error("Conversion failed: {reason}")]
    ConversionFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// Failed to probe media file.
    #[error("Failed to probe media file: {reason}")]
    ProbeFailed { reason: String },

    /// Swapping the encoded file in place of the original failed.
    #[error("Failed to replace {path}: {reason}")]
    ReplaceFailed { path: PathBuf, reason: String },

    /// I/O error during conversion.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConverterError {
    /// Creates a new conversion failed error with stderr output.
    pub fn conversion_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::ConversionFailed {
            reason: reason.into(),
            stderr,
        }
    }

    /// Creates a new probe failed error.
    pub fn probe_failed(reason: impl Into<String>) -> Self {
        Self::ProbeFailed {
            reason: reason.into(),
        }
    }

    /// Creates a new replace failed error.
    pub fn replace_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ReplaceFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether a later run might succeed on the same file unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConversionFailed { .. } | Self::ReplaceFailed { .. } | Self::Io(_)
        )
    }
}
