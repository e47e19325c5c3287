//! Filesystem seam
//!
//! The abstraction command handlers consult for path semantics and entry
//! metadata. Implementations supply the actual storage; the command core
//! never touches real disks itself.

use crate::storage::permissions::Permissions;

/// Metadata for one filesystem entry.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    pub path: String,
    pub directory: bool,
    pub owner: Option<String>,
    pub group: Option<String>,
    pub permissions: Option<Permissions>,
}

impl FileEntry {
    pub fn file(path: &str) -> Self {
        Self {
            path: path.to_string(),
            directory: false,
            owner: None,
            group: None,
            permissions: None,
        }
    }

    pub fn directory(path: &str) -> Self {
        Self {
            path: path.to_string(),
            directory: true,
            owner: None,
            group: None,
            permissions: None,
        }
    }

    pub fn with_owner(mut self, owner: &str) -> Self {
        self.owner = Some(owner.to_string());
        self
    }

    pub fn with_group(mut self, group: &str) -> Self {
        self.group = Some(group.to_string());
        self
    }

    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = Some(permissions);
        self
    }
}

/// The filesystem operations the command core depends on.
pub trait FileSystem: Send + Sync {
    /// Whether `path` names an existing directory.
    fn is_directory(&self, path: &str) -> bool;

    /// Whether `path` is absolute under this filesystem's path rules.
    fn is_absolute(&self, path: &str) -> bool;

    /// Joins `relative` onto `base` under this filesystem's path rules.
    fn join(&self, base: &str, relative: &str) -> String;

    /// Returns the entry at `path`, or `None` when nothing exists there.
    fn entry(&self, path: &str) -> Option<FileEntry>;
}
