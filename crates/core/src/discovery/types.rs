//! Types for the discovery module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Media types the re-encoder knows how to handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    /// MPEG Audio Layer III
    Mp3,
    /// Free Lossless Audio Codec
    Flac,
}

impl MediaType {
    /// Detects the media type from a file extension, ignoring case.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("mp3") {
            Some(Self::Mp3)
        } else if ext.eq_ignore_ascii_case("flac") {
            Some(Self::Flac)
        } else {
            None
        }
    }

    /// Returns the canonical file extension for this type.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Flac => "flac",
        }
    }

    /// Returns the ffmpeg encoder used when re-encoding this type.
    pub fn ffmpeg_codec(&self) -> &'static str {
        match self {
            Self::Mp3 => "libmp3lame",
            Self::Flac => "flac",
        }
    }

    /// Returns the ffmpeg muxer for this type, passed explicitly since work
    /// files carry no media extension.
    pub fn ffmpeg_format(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Flac => "flac",
        }
    }

    /// Codec name ffmpeg reports for an input stream of this type.
    pub fn probe_codec_name(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Flac => "flac",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A discovered file that is eligible for re-encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileTask {
    path: PathBuf,
    media_type: MediaType,
}

impl FileTask {
    /// Builds a task for `path` when its extension is a recognized media type.
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let media_type = MediaType::from_path(&path)?;
        Some(Self { path, media_type })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_from_extension() {
        assert_eq!(MediaType::from_path(Path::new("/a/b.mp3")), Some(MediaType::Mp3));
        assert_eq!(MediaType::from_path(Path::new("/a/b.flac")), Some(MediaType::Flac));
        assert_eq!(MediaType::from_path(Path::new("/a/b.txt")), None);
        assert_eq!(MediaType::from_path(Path::new("/a/mp3")), None);
    }

    #[test]
    fn test_media_type_ignores_case() {
        assert_eq!(MediaType::from_path(Path::new("LOUD.MP3")), Some(MediaType::Mp3));
        assert_eq!(MediaType::from_path(Path::new("Mixed.FlAc")), Some(MediaType::Flac));
    }

    #[test]
    fn test_media_type_codecs() {
        assert_eq!(MediaType::Mp3.ffmpeg_codec(), "libmp3lame");
        assert_eq!(MediaType::Flac.ffmpeg_codec(), "flac");
        assert_eq!(MediaType::Mp3.to_string(), "mp3");
    }

    #[test]
    fn test_file_task_filters_unknown_types() {
        assert!(FileTask::from_path("/music/cover.jpg").is_none());

        let task = FileTask::from_path("/music/track.flac").unwrap();
        assert_eq!(task.path(), Path::new("/music/track.flac"));
        assert_eq!(task.media_type(), MediaType::Flac);
    }
}
