//! JSON-file backed completion ledger.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::error::LedgerError;

#[derive(Debug, Default)]
struct Entries {
    /// Insertion order, as persisted.
    ordered: Vec<String>,
    /// Membership index over `ordered`.
    index: HashSet<String>,
}

impl Entries {
    /// Keeps `items` exactly as loaded, duplicates included, so a rewrite
    /// never shortens the persisted sequence.
    fn from_vec(items: Vec<String>) -> Self {
        let index = items.iter().cloned().collect();
        Self {
            ordered: items,
            index,
        }
    }

    /// Returns false when the entry was already present.
    fn insert(&mut self, item: String) -> bool {
        if !self.index.insert(item.clone()) {
            return false;
        }
        self.ordered.push(item);
        true
    }
}

/// Persisted set of file paths that were processed successfully.
///
/// Membership checks share a read lock. Recording holds the write lock for
/// the append and the full rewrite of the backing file, so a `record` that
/// has returned is visible to every later `contains`.
#[derive(Debug)]
pub struct CompletionLedger {
    path: PathBuf,
    entries: RwLock<Entries>,
}

impl CompletionLedger {
    /// Loads the ledger stored at `path`.
    ///
    /// A missing, unreadable or malformed file yields an empty ledger.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let items = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<Vec<String>>(&bytes) {
                Ok(items) => items,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Ledger is malformed, starting empty");
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No ledger found, starting empty");
                Vec::new()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ledger is unreadable, starting empty");
                Vec::new()
            }
        };

        let entries = Entries::from_vec(items);
        debug!(path = %path.display(), entries = entries.ordered.len(), "Ledger loaded");

        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `file` has already been recorded as done.
    pub async fn contains(&self, file: &Path) -> bool {
        self.entries.read().await.index.contains(&Self::key(file))
    }

    /// Records `file` as done and rewrites the backing file.
    ///
    /// Recording a file that is already present is a no-op. If the write
    /// fails the in-memory entry is kept, leaving memory ahead of disk.
    pub async fn record(&self, file: &Path) -> Result<(), LedgerError> {
        let mut entries = self.entries.write().await;

        if !entries.insert(Self::key(file)) {
            debug!(path = %file.display(), "Already in ledger");
            return Ok(());
        }

        let data = Self::encode(&entries.ordered)?;
        tokio::fs::write(&self.path, data)
            .await
            .map_err(|source| LedgerError::Io {
                path: self.path.clone(),
                source,
            })
    }

    /// Snapshot of all recorded entries in insertion order.
    pub async fn entries(&self) -> Vec<String> {
        self.entries.read().await.ordered.clone()
    }

    /// Number of persisted entries, counting duplicates loaded from disk.
    pub async fn len(&self) -> usize {
        self.entries.read().await.ordered.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Pretty JSON with four-space indentation.
    fn encode(items: &[String]) -> Result<Vec<u8>, LedgerError> {
        let mut buf = Vec::new();
        let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        items.serialize(&mut ser)?;
        Ok(buf)
    }

    fn key(file: &Path) -> String {
        file.to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let ledger = CompletionLedger::load(dir.path().join("ledger.json")).await;
        assert!(ledger.is_empty().await);
    }

    #[tokio::test]
    async fn test_load_malformed_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        std::fs::write(&path, "{ not an array").unwrap();

        let ledger = CompletionLedger::load(&path).await;
        assert!(ledger.is_empty().await);
    }

    #[tokio::test]
    async fn test_load_existing_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        std::fs::write(&path, r#"["/music/a.mp3", "/music/b.flac"]"#).unwrap();

        let ledger = CompletionLedger::load(&path).await;
        assert_eq!(ledger.len().await, 2);
        assert!(ledger.contains(Path::new("/music/a.mp3")).await);
        assert!(ledger.contains(Path::new("/music/b.flac")).await);
        assert!(!ledger.contains(Path::new("/music/c.mp3")).await);
    }

    #[tokio::test]
    async fn test_record_persists_full_sequence() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        let ledger = CompletionLedger::load(&path).await;

        ledger.record(Path::new("/music/a.mp3")).await.unwrap();
        assert!(ledger.contains(Path::new("/music/a.mp3")).await);
        ledger.record(Path::new("/music/b.flac")).await.unwrap();

        let on_disk: Vec<String> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk, vec!["/music/a.mp3", "/music/b.flac"]);

        let reloaded = CompletionLedger::load(&path).await;
        assert_eq!(reloaded.entries().await, on_disk);
    }

    #[tokio::test]
    async fn test_loaded_duplicates_survive_rewrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        std::fs::write(&path, r#"["/music/a.mp3", "/music/a.mp3"]"#).unwrap();

        let ledger = CompletionLedger::load(&path).await;
        assert!(ledger.contains(Path::new("/music/a.mp3")).await);
        ledger.record(Path::new("/music/b.mp3")).await.unwrap();

        let on_disk: Vec<String> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk, vec!["/music/a.mp3", "/music/a.mp3", "/music/b.mp3"]);
    }

    #[tokio::test]
    async fn test_record_writes_four_space_indent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        let ledger = CompletionLedger::load(&path).await;

        ledger.record(Path::new("/music/a.mp3")).await.unwrap();
        ledger.record(Path::new("/music/b.flac")).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "[\n    \"/music/a.mp3\",\n    \"/music/b.flac\"\n]");
    }

    #[tokio::test]
    async fn test_record_twice_keeps_single_entry() {
        let dir = TempDir::new().unwrap();
        let ledger = CompletionLedger::load(dir.path().join("ledger.json")).await;

        ledger.record(Path::new("/music/a.mp3")).await.unwrap();
        ledger.record(Path::new("/music/a.mp3")).await.unwrap();

        assert_eq!(ledger.entries().await, vec!["/music/a.mp3"]);
    }

    #[tokio::test]
    async fn test_record_write_failure_keeps_memory_entry() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing-dir").join("ledger.json");
        let ledger = CompletionLedger::load(&path).await;

        let result = ledger.record(Path::new("/music/a.mp3")).await;
        assert!(matches!(result, Err(LedgerError::Io { .. })));
        assert!(ledger.contains(Path::new("/music/a.mp3")).await);
        assert!(!path.exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_records_are_all_persisted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        let ledger = Arc::new(CompletionLedger::load(&path).await);

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let ledger = Arc::clone(&ledger);
                tokio::spawn(async move {
                    let file = PathBuf::from(format!("/music/{}.mp3", i));
                    ledger.record(&file).await.unwrap();
                    assert!(ledger.contains(&file).await);
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(ledger.len().await, 32);
        let reloaded = CompletionLedger::load(&path).await;
        assert_eq!(reloaded.len().await, 32);
    }
}
