//! Encoder capability detection.

use serde::{Deserialize, Serialize};
use std::process::Stdio;
use tokio::process::Command;

use super::config::ConverterConfig;
use crate::discovery::MediaType;

/// Audio encoders detected in the configured ffmpeg build.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EncoderCapabilities {
    /// LAME MP3 encoder available
    pub libmp3lame: bool,
    /// Native FLAC encoder available
    pub flac: bool,
}

impl EncoderCapabilities {
    /// Detect available encoders by probing ffmpeg.
    pub async fn detect(config: &ConverterConfig) -> Self {
        let output = Command::new(&config.ffmpeg_path)
            .args(["-hide_banner", "-encoders"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await;

        let stdout = match output {
            Ok(o) if o.status.success() => String::from_utf8_lossy(&o.stdout).to_string(),
            _ => return Self::default(),
        };

        Self::from_encoder_list(&stdout)
    }

    /// Parses the output of `ffmpeg -encoders`.
    pub fn from_encoder_list(list: &str) -> Self {
        let has = |name: &str| {
            list.lines()
                .any(|line| line.split_whitespace().nth(1) == Some(name))
        };

        Self {
            libmp3lame: has("libmp3lame"),
            flac: has("flac"),
        }
    }

    /// Whether files of `media_type` can be re-encoded.
    pub fn supports(&self, media_type: MediaType) -> bool {
        match media_type {
            MediaType::Mp3 => self.libmp3lame,
            MediaType::Flac => self.flac,
        }
    }
}
