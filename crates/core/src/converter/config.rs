//! Configuration for the converter module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::discovery::MediaType;

/// Configuration for the FFmpeg-based converter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Path to ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[serde(default = "default_log_level")]
    pub ffmpeg_log_level: String,

    /// Prefix of the sibling file ffmpeg encodes into before it replaces the
    /// original. The work file also gets a `.part` suffix.
    #[serde(default = "default_work_file_prefix")]
    pub work_file_prefix: String,

    /// Additional global ffmpeg arguments.
    #[serde(default)]
    pub extra_ffmpeg_args: Vec<String>,

    /// Which input types are probed and refused when already at or below the target bitrate.
    #[serde(default)]
    pub skip_lower_bitrate: BitrateSkipPolicy,
}

/// Per-type switch for the "already low bitrate" check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitrateSkipPolicy {
    #[serde(default = "default_true")]
    pub mp3: bool,
    #[serde(default)]
    pub flac: bool,
}

impl Default for BitrateSkipPolicy {
    fn default() -> Self {
        Self {
            mp3: true,
            flac: false,
        }
    }
}

impl BitrateSkipPolicy {
    /// Whether inputs of `media_type` get the bitrate check.
    pub fn applies_to(&self, media_type: MediaType) -> bool {
        match media_type {
            MediaType::Mp3 => self.mp3,
            MediaType::Flac => self.flac,
        }
    }
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_log_level() -> String {
    "error".to_string()
}

fn default_work_file_prefix() -> String {
    "wip-".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffmpeg_log_level: default_log_level(),
            work_file_prefix: default_work_file_prefix(),
            extra_ffmpeg_args: Vec::new(),
            skip_lower_bitrate: BitrateSkipPolicy::default(),
        }
    }
}

impl ConverterConfig {
    /// Creates a new config with a custom ffmpeg path.
    pub fn with_ffmpeg_path(ffmpeg_path: PathBuf) -> Self {
        Self {
            ffmpeg_path,
            ..Default::default()
        }
    }

    /// Sets the bitrate skip policy.
    pub fn with_skip_policy(mut self, policy: BitrateSkipPolicy) -> Self {
        self.skip_lower_bitrate = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConverterConfig::default();
        assert_eq!(config.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert_eq!(config.work_file_prefix, "wip-");
        assert!(config.extra_ffmpeg_args.is_empty());
    }

    #[test]
    fn test_default_skip_policy_only_checks_mp3() {
        let policy = BitrateSkipPolicy::default();
        assert!(policy.applies_to(MediaType::Mp3));
        assert!(!policy.applies_to(MediaType::Flac));
    }

    #[test]
    fn test_config_builder() {
        let config = ConverterConfig::with_ffmpeg_path(PathBuf::from("/opt/ffmpeg/bin/ffmpeg"))
            .with_skip_policy(BitrateSkipPolicy {
                mp3: false,
                flac: true,
            });

        assert_eq!(config.ffmpeg_path, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        assert!(!config.skip_lower_bitrate.applies_to(MediaType::Mp3));
        assert!(config.skip_lower_bitrate.applies_to(MediaType::Flac));
    }

    #[test]
    fn test_partial_policy_uses_field_defaults() {
        let policy: BitrateSkipPolicy = serde_json::from_str(r#"{"flac": true}"#).unwrap();
        assert!(policy.mp3);
        assert!(policy.flac);
    }
}
