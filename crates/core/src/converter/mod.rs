//! Converter module for re-encoding audio files.
//!
//! This module provides the `Converter` trait, the per-file transform the
//! worker pool calls, and an FFmpeg-backed implementation.
//!
//! # Features
//!
//! - MP3 re-encoding through libmp3lame, FLAC through the native encoder
//! - In-place replacement via a sibling work file
//! - Optional refusal of inputs already at or below the target bitrate
//!
//! # Example
//!
//! ```ignore
//! use reencode_core::converter::{ConversionRequest, Converter, FfmpegConverter};
//! use reencode_core::discovery::FileTask;
//!
//! let converter = FfmpegConverter::with_defaults();
//! converter.validate().await?;
//!
//! let task = FileTask::from_path("/music/song.mp3").unwrap();
//! let result = converter.convert(&ConversionRequest::new(&task, 128)).await?;
//! println!("Encoded in {} ms", result.duration_ms);
//! ```

mod capabilities;
mod config;
mod error;
mod ffmpeg;
mod traits;
mod types;

pub use capabilities::EncoderCapabilities;
pub use config::{BitrateSkipPolicy, ConverterConfig};
pub use error::ConverterError;
pub use ffmpeg::FfmpegConverter;
pub use traits::Converter;
pub use types::{ConversionRequest, ConversionResult, MediaInfo};
