//! Per-request audio artifact arena.

use crate::error::{Result, ResymeError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use uuid::Uuid;

/// Lifecycle of a generated audio artifact.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioStatus {
    Processing,
    Ready,
    Failed(String),
}

/// Arena of generated audio files, keyed uniquely per request.
///
/// Keys are random, so concurrent requests can never collide on a path.
pub struct AudioStore {
    dir: PathBuf,
    entries: Mutex<HashMap<String, AudioStatus>>,
}

impl AudioStore {
    pub fn new(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            entries: Mutex::new(HashMap::new()),
        })
    }

    /// Reserve a fresh key and mark it as in progress.
    pub fn reserve(&self) -> String {
        let key = format!("{}.mp3", Uuid::new_v4());
        self.entries
            .lock()
            .unwrap()
            .insert(key.clone(), AudioStatus::Processing);
        key
    }

    pub fn mark_ready(&self, key: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), AudioStatus::Ready);
    }

    pub fn mark_failed(&self, key: &str, reason: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), AudioStatus::Failed(reason.to_string()));
    }

    /// Status of a key.
    ///
    /// Files from a previous process lifetime have no table entry; they count
    /// as ready when present on disk.
    pub fn status(&self, key: &str) -> Option<AudioStatus> {
        if let Some(status) = self.entries.lock().unwrap().get(key) {
            return Some(status.clone());
        }

        match self.path_for(key) {
            Ok(path) if path.is_file() => Some(AudioStatus::Ready),
            _ => None,
        }
    }

    /// Absolute path for a key. Rejects keys carrying path components.
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains('/') || key.contains('\\') || key.contains("..") {
            return Err(ResymeError::InvalidInput(format!(
                "invalid audio key: {}",
                key
            )));
        }
        Ok(self.dir.join(key))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn store() -> (tempfile::TempDir, AudioStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = AudioStore::new(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_reserved_keys_are_unique() {
        let (_dir, store) = store();
        let keys: HashSet<String> = (0..100).map(|_| store.reserve()).collect();
        assert_eq!(keys.len(), 100);
    }

    #[test]
    fn test_concurrent_reservations_do_not_collide() {
        let (_dir, store) = store();
        let store = Arc::new(store);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || (0..50).map(|_| store.reserve()).collect::<Vec<_>>())
            })
            .collect();

        let mut keys = HashSet::new();
        for handle in handles {
            for key in handle.join().unwrap() {
                assert!(keys.insert(key), "duplicate audio key");
            }
        }
    }

    #[test]
    fn test_status_transitions() {
        let (_dir, store) = store();
        let key = store.reserve();

        assert_eq!(store.status(&key), Some(AudioStatus::Processing));

        store.mark_ready(&key);
        assert_eq!(store.status(&key), Some(AudioStatus::Ready));

        store.mark_failed(&key, "synthesis error");
        assert!(matches!(store.status(&key), Some(AudioStatus::Failed(_))));
    }

    #[test]
    fn test_status_falls_back_to_disk() {
        let (_dir, store) = store();

        assert_eq!(store.status("unknown.mp3"), None);

        std::fs::write(store.dir().join("leftover.mp3"), b"audio").unwrap();
        assert_eq!(store.status("leftover.mp3"), Some(AudioStatus::Ready));
    }

    #[test]
    fn test_path_for_rejects_traversal() {
        let (_dir, store) = store();
        assert!(store.path_for("../escape.mp3").is_err());
        assert!(store.path_for("a/b.mp3").is_err());
        assert!(store.path_for("").is_err());
        assert!(store.path_for("ok.mp3").is_ok());
    }
}
