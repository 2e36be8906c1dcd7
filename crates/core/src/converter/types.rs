//! Types for the converter module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::discovery::{FileTask, MediaType};

/// A request to re-encode one file in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    /// File to re-encode; replaced by the encoded output on success.
    pub input_path: PathBuf,
    /// Detected type of the input.
    pub media_type: MediaType,
    /// Target audio bitrate in kbps.
    pub bitrate_kbps: u32,
}

impl ConversionRequest {
    pub fn new(task: &FileTask, bitrate_kbps: u32) -> Self {
        Self {
            input_path: task.path().to_path_buf(),
            media_type: task.media_type(),
            bitrate_kbps,
        }
    }
}

/// Result of a successful conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResult {
    /// Path of the re-encoded file (same as the input).
    pub output_path: PathBuf,
    /// Output file size in bytes.
    pub output_size_bytes: u64,
    /// Conversion duration in milliseconds.
    pub duration_ms: u64,
    /// Type of the re-encoded file.
    pub media_type: MediaType,
    /// Bitrate the file was encoded at.
    pub bitrate_kbps: u32,
}

/// Audio stream information reported by a probe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// File path.
    pub path: PathBuf,
    /// Audio codec of the first audio stream (e.g. "mp3").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_codec: Option<String>,
    /// Audio bitrate in kbps, from the stream or the container.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_bitrate_kbps: Option<u32>,
}
