//! Testing utilities and mock implementations.
//!
//! This module provides a mock [`Converter`](crate::converter::Converter)
//! so batches can be exercised without ffmpeg.
//!
//! # Example
//!
//! ```rust,ignore
//! use reencode_core::testing::{fixtures, MockConverter};
//!
//! let converter = MockConverter::new();
//! converter.fail_path(root.join("broken.mp3")).await;
//!
//! fixtures::music_tree(root, &["a.mp3", "sub/b.flac", "notes.txt"])?;
//! ```

mod mock_converter;

pub use mock_converter::{MockConverter, RecordedConversion};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::io;
    use std::path::{Path, PathBuf};

    /// Create placeholder files at `relative` paths under `root`.
    ///
    /// Parent directories are created as needed. Returns the absolute paths
    /// in the order given.
    pub fn music_tree(root: &Path, relative: &[&str]) -> io::Result<Vec<PathBuf>> {
        relative
            .iter()
            .map(|rel| {
                let path = root.join(rel);
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&path, b"not really audio")?;
                Ok(path)
            })
            .collect()
    }
}
