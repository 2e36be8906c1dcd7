//! Discovery of candidate media files.
//!
//! Walks a directory tree and turns every regular file with a recognized
//! extension into a [`FileTask`]. Discovery never fails: a missing root or an
//! unreadable subtree simply contributes no files.

mod types;
mod walker;

pub use types::{FileTask, MediaType};
pub use walker::{discover, discover_tasks};
