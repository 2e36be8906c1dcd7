//! FFmpeg-based converter implementation.

use async_trait::async_trait;
use regex_lite::Regex;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, info};

use super::capabilities::EncoderCapabilities;
use super::config::ConverterConfig;
use super::error::ConverterError;
use super::traits::Converter;
use super::types::{ConversionRequest, ConversionResult, MediaInfo};
use crate::discovery::MediaType;

/// Lines of ffmpeg stderr kept in a conversion error.
const STDERR_TAIL_LINES: usize = 20;

/// Appended to work file names so discovery never picks them up as media.
const WORK_FILE_SUFFIX: &str = ".part";

/// FFmpeg-based converter implementation.
pub struct FfmpegConverter {
    config: ConverterConfig,
}

impl FfmpegConverter {
    /// Creates a new FFmpeg converter with the given configuration.
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// Creates a converter with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ConverterConfig::default())
    }

    /// Sibling path ffmpeg writes into before the original is replaced.
    fn work_path(&self, input_path: &Path) -> Result<PathBuf, ConverterError> {
        let file_name = input_path.file_name().ok_or_else(|| {
            ConverterError::UnsupportedInputFormat {
                format: input_path.display().to_string(),
            }
        })?;

        let mut name = self.config.work_file_prefix.clone();
        name.push_str(&file_name.to_string_lossy());
        name.push_str(WORK_FILE_SUFFIX);
        Ok(input_path.with_file_name(name))
    }

    /// Builds ffmpeg arguments for re-encoding `input_path` into `output_path`.
    fn build_args(
        &self,
        input_path: &Path,
        output_path: &Path,
        media_type: MediaType,
        bitrate_kbps: u32,
    ) -> Vec<String> {
        let mut args = vec![
            "-hide_banner".to_string(),
            "-y".to_string(), // A work file left by an interrupted run is overwritten
            "-i".to_string(),
            input_path.to_string_lossy().to_string(),
            "-c:a".to_string(),
            media_type.ffmpeg_codec().to_string(),
            "-b:a".to_string(),
            format!("{}k", bitrate_kbps),
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
        ];

        args.extend(self.config.extra_ffmpeg_args.iter().cloned());
        args.push("-f".to_string());
        args.push(media_type.ffmpeg_format().to_string());
        args.push(output_path.to_string_lossy().to_string());

        args
    }

    /// Parses the stream banner ffmpeg prints for `ffmpeg -i <file>`.
    fn parse_banner(path: &Path, banner: &str) -> Result<MediaInfo, ConverterError> {
        let stream_regex = Regex::new(r"Stream #\d+:\d+.*?: Audio: (\w+)(.*)")
            .map_err(|e| ConverterError::probe_failed(e.to_string()))?;
        let kbps_regex = Regex::new(r"(\d+) kb/s")
            .map_err(|e| ConverterError::probe_failed(e.to_string()))?;
        let container_regex = Regex::new(r"Duration:.*bitrate: (\d+) kb/s")
            .map_err(|e| ConverterError::probe_failed(e.to_string()))?;

        let caps = stream_regex
            .captures(banner)
            .ok_or_else(|| ConverterError::probe_failed("No audio stream found"))?;

        let audio_codec = caps.get(1).map(|m| m.as_str().to_string());
        let stream_kbps = caps
            .get(2)
            .and_then(|rest| kbps_regex.captures(rest.as_str()))
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok());

        // Lossless streams usually only report the container bitrate
        let audio_bitrate_kbps = stream_kbps.or_else(|| {
            container_regex
                .captures(banner)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse::<u32>().ok())
        });

        Ok(MediaInfo {
            path: path.to_path_buf(),
            audio_codec,
            audio_bitrate_kbps,
        })
    }

    /// Refuses inputs already at or below the target bitrate, per the skip policy.
    async fn check_bitrate(&self, request: &ConversionRequest) -> Result<(), ConverterError> {
        if !self
            .config
            .skip_lower_bitrate
            .applies_to(request.media_type)
        {
            return Ok(());
        }

        let info = match self.probe(&request.input_path).await {
            Ok(info) => info,
            Err(e @ ConverterError::FfmpegNotFound { .. }) => return Err(e),
            Err(e) => {
                debug!(path = %request.input_path.display(), error = %e, "Probe failed, skipping bitrate check");
                return Ok(());
            }
        };

        if info.audio_codec.as_deref() != Some(request.media_type.probe_codec_name()) {
            return Ok(());
        }

        match info.audio_bitrate_kbps {
            Some(current) if current <= request.bitrate_kbps => {
                Err(ConverterError::BitrateAlreadyLow {
                    current_kbps: current,
                    target_kbps: request.bitrate_kbps,
                })
            }
            _ => Ok(()),
        }
    }

    fn spawn_error(&self, e: std::io::Error) -> ConverterError {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConverterError::FfmpegNotFound {
                path: self.config.ffmpeg_path.clone(),
            }
        } else {
            ConverterError::Io(e)
        }
    }

    fn stderr_tail(stderr: &[u8]) -> Option<String> {
        let text = String::from_utf8_lossy(stderr);
        let lines: Vec<&str> = text.lines().collect();
        if lines.is_empty() {
            return None;
        }
        let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
        Some(lines[start..].join("\n"))
    }
}

#[async_trait]
impl Converter for FfmpegConverter {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn probe(&self, path: &Path) -> Result<MediaInfo, ConverterError> {
        if !path.exists() {
            return Err(ConverterError::InputNotFound {
                path: path.to_path_buf(),
            });
        }

        // Without an output file ffmpeg exits non-zero, but the banner is still printed.
        let output = Command::new(&self.config.ffmpeg_path)
            .arg("-hide_banner")
            .arg("-i")
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        let banner = String::from_utf8_lossy(&output.stderr);
        Self::parse_banner(path, &banner)
    }

    async fn convert(
        &self,
        request: &ConversionRequest,
    ) -> Result<ConversionResult, ConverterError> {
        let start = Instant::now();
        let input_path = &request.input_path;

        if request.bitrate_kbps == 0 {
            return Err(ConverterError::InvalidBitrate {
                bitrate_kbps: request.bitrate_kbps,
            });
        }

        if !input_path.exists() {
            return Err(ConverterError::InputNotFound {
                path: input_path.clone(),
            });
        }

        if MediaType::from_path(input_path) != Some(request.media_type) {
            return Err(ConverterError::UnsupportedInputFormat {
                format: input_path
                    .extension()
                    .map(|e| e.to_string_lossy().to_string())
                    .unwrap_or_default(),
            });
        }

        self.check_bitrate(request).await?;

        let work_path = self.work_path(input_path)?;
        let args = self.build_args(
            input_path,
            &work_path,
            request.media_type,
            request.bitrate_kbps,
        );
        debug!(ffmpeg = %self.config.ffmpeg_path.display(), ?args, "Running ffmpeg");

        let output = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            let _ = tokio::fs::remove_file(&work_path).await;
            return Err(ConverterError::conversion_failed(
                format!("FFmpeg exited with code: {:?}", output.status.code()),
                Self::stderr_tail(&output.stderr),
            ));
        }

        let output_meta = tokio::fs::metadata(&work_path)
            .await
            .map_err(|_| ConverterError::conversion_failed("Output file not created", None))?;

        // rename replaces the destination, so the original is never missing
        tokio::fs::rename(&work_path, input_path)
            .await
            .map_err(|e| ConverterError::replace_failed(input_path.clone(), e.to_string()))?;

        info!(path = %input_path.display(), bitrate_kbps = request.bitrate_kbps, "File encoded");

        Ok(ConversionResult {
            output_path: input_path.clone(),
            output_size_bytes: output_meta.len(),
            duration_ms: start.elapsed().as_millis() as u64,
            media_type: request.media_type,
            bitrate_kbps: request.bitrate_kbps,
        })
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        let caps = EncoderCapabilities::detect(&self.config).await;
        for media_type in [MediaType::Mp3, MediaType::Flac] {
            if !caps.supports(media_type) {
                return Err(ConverterError::EncoderUnavailable {
                    codec: media_type.ffmpeg_codec().to_string(),
                });
            }
        }

        Ok(())
    }
}
