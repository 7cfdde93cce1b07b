//! Core data types for treecp
//!
//! [`FileInfo`] is what the classifier produces for every entry of the walk and
//! what filters and transforms get to look at. [`CopyStats`] is what a
//! successful run hands back.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Kind of a filesystem entry as seen by the walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EntryKind {
    /// Regular file
    File,
    /// Directory
    Directory,
    /// Symbolic link (only reported when links are not dereferenced)
    Symlink,
    /// FIFO, socket, device or anything else the walk does not copy
    Other,
}

impl EntryKind {
    /// Classify a metadata record
    pub fn from_metadata(metadata: &Metadata) -> Self {
        let file_type = metadata.file_type();
        if file_type.is_symlink() {
            Self::Symlink
        } else if file_type.is_dir() {
            Self::Directory
        } else if file_type.is_file() {
            Self::File
        } else {
            Self::Other
        }
    }
}

/// Immutable description of one entry of the source tree
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FileInfo {
    /// Final path component (the root entry uses its own file name)
    pub name: String,
    /// Full source path as walked
    pub path: PathBuf,
    /// Path relative to the source root; empty for the root itself
    pub relative: PathBuf,
    /// Permission bits (`st_mode & 0o7777` on Unix)
    pub mode: u32,
    /// Entry kind
    pub kind: EntryKind,
    /// Size in bytes
    pub len: u64,
    /// Last access time, when the platform reports one
    pub accessed: Option<SystemTime>,
    /// Last modification time, when the platform reports one
    pub modified: Option<SystemTime>,
    /// Link target as stored in the link, for `EntryKind::Symlink`
    pub link_target: Option<PathBuf>,
}

impl FileInfo {
    /// Build an info record from already-fetched metadata
    pub fn from_metadata(
        path: impl Into<PathBuf>,
        relative: impl Into<PathBuf>,
        metadata: &Metadata,
        link_target: Option<PathBuf>,
    ) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            name,
            path,
            relative: relative.into(),
            mode: permission_bits(metadata),
            kind: EntryKind::from_metadata(metadata),
            len: metadata.len(),
            accessed: metadata.accessed().ok(),
            modified: metadata.modified().ok(),
            link_target,
        }
    }

    /// Whether this entry is a regular file
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// Whether this entry is a directory
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Whether this entry is a symbolic link
    pub fn is_symlink(&self) -> bool {
        self.kind == EntryKind::Symlink
    }

    /// Source path as a `Path`
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(unix)]
fn permission_bits(metadata: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn permission_bits(metadata: &Metadata) -> u32 {
    let writable = !metadata.permissions().readonly();
    match (metadata.is_dir(), writable) {
        (true, true) => 0o777,
        (true, false) => 0o555,
        (false, true) => 0o666,
        (false, false) => 0o444,
    }
}

/// Tree copy statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CopyStats {
    /// Number of regular files written
    pub files_copied: u64,
    /// Number of directories created (existing ones are reused, not counted)
    pub directories_created: u64,
    /// Number of symbolic links created
    pub symlinks_created: u64,
    /// Total bytes written by default copies and transforms
    pub bytes_copied: u64,
    /// Entries rejected by the filter (subtrees count once)
    pub entries_filtered: u64,
    /// Files left alone because the destination existed or was unsupported
    pub files_skipped: u64,
    /// Number of errors recorded
    pub errors: u64,
    /// Total duration of the operation
    pub duration: Duration,
}

impl CopyStats {
    /// Create a new empty statistics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculate the overall transfer rate in bytes per second
    pub fn transfer_rate(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.bytes_copied as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Number of entries that produced something at the destination
    pub fn entries_written(&self) -> u64 {
        self.files_copied + self.directories_created + self.symlinks_created
    }
}
