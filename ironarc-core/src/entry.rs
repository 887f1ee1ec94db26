//! Archive entry metadata.
//!
//! This module defines the `Entry` struct that represents a file within a
//! container, along with the subset of Unix metadata the supported container
//! formats can actually carry.

/// Entry type (file, directory, symlink).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryType {
    /// Regular file.
    #[default]
    File,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
    /// Unknown type.
    Unknown,
}

impl EntryType {
    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File)
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, Self::Directory)
    }
}

/// Unix file attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileAttributes {
    /// Unix mode bits (rwxrwxrwx).
    pub unix_mode: Option<u32>,
    /// User ID.
    pub uid: Option<u32>,
    /// Group ID.
    pub gid: Option<u32>,
}

impl FileAttributes {
    /// Create new empty attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set Unix mode.
    pub fn with_mode(mut self, mode: u32) -> Self {
        self.unix_mode = Some(mode);
        self
    }

    /// Check if the entry is read-only.
    pub fn is_readonly(&self) -> bool {
        self.unix_mode.is_some_and(|mode| mode & 0o222 == 0)
    }
}

/// An entry in a container.
#[derive(Debug, Clone, Default)]
pub struct Entry {
    /// Name/path of the entry within the container.
    pub name: String,
    /// Uncompressed size in bytes.
    pub size: u64,
    /// Modification time as seconds since the Unix epoch.
    pub mtime: Option<u64>,
    /// Entry type.
    pub entry_type: EntryType,
    /// Unix attributes.
    pub attributes: FileAttributes,
}

impl Entry {
    /// Create a new file entry with the given name and size.
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_defaults() {
        let entry = Entry::new("lib.rs", 42);
        assert_eq!(entry.name, "lib.rs");
        assert_eq!(entry.size, 42);
        assert!(entry.entry_type.is_file());
        assert!(entry.mtime.is_none());
    }

    #[test]
    fn test_readonly_attributes() {
        let attrs = FileAttributes::new().with_mode(0o444);
        assert!(attrs.is_readonly());

        let attrs = FileAttributes::new().with_mode(0o644);
        assert!(!attrs.is_readonly());

        assert!(!FileAttributes::new().is_readonly());
    }
}
