//! Trait definitions for the converter module.

use async_trait::async_trait;
use std::path::Path;

use super::error::ConverterError;
use super::types::{ConversionRequest, ConversionResult, MediaInfo};

/// A converter that re-encodes audio files in place.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Returns the name of this converter implementation.
    fn name(&self) -> &str;

    /// Probes a media file to get its audio stream information.
    async fn probe(&self, path: &Path) -> Result<MediaInfo, ConverterError>;

    /// Re-encodes the requested file, replacing the original on success.
    async fn convert(&self, request: &ConversionRequest)
        -> Result<ConversionResult, ConverterError>;

    /// Validates that the converter is properly configured and ready.
    async fn validate(&self) -> Result<(), ConverterError>;
}
