//! In-memory filesystem
//!
//! A map-backed `FileSystem` with Unix-style path rules, used by tests and
//! the demo binary.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::storage::filesystem::{FileEntry, FileSystem};

/// Unix-style in-memory filesystem: absolute paths start with `/`, joins
/// insert a single `/` separator.
#[derive(Debug, Default)]
pub struct InMemoryFileSystem {
    entries: RwLock<HashMap<String, FileEntry>>,
}

impl InMemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the entry at its own path.
    pub fn add(&self, entry: FileEntry) {
        let mut entries = self.entries.write().unwrap();
        entries.insert(entry.path.clone(), entry);
    }

    pub fn remove(&self, path: &str) -> Option<FileEntry> {
        let mut entries = self.entries.write().unwrap();
        entries.remove(path)
    }
}

impl FileSystem for InMemoryFileSystem {
    fn is_directory(&self, path: &str) -> bool {
        let entries = self.entries.read().unwrap();
        entries.get(path).is_some_and(|e| e.directory)
    }

    fn is_absolute(&self, path: &str) -> bool {
        path.starts_with('/')
    }

    fn join(&self, base: &str, relative: &str) -> String {
        if base.is_empty() {
            return relative.to_string();
        }
        if relative.is_empty() {
            return base.to_string();
        }
        format!("{}/{}", base.trim_end_matches('/'), relative)
    }

    fn entry(&self, path: &str) -> Option<FileEntry> {
        let entries = self.entries.read().unwrap();
        entries.get(path).cloned()
    }
}
