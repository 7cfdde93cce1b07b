//! Error types and handling for treecp
//!
//! Every failure the copy engine can observe for a single entry maps to one
//! variant of [`Error`]. Per-entry variants keep the path they concern and the
//! underlying [`std::io::Error`] as their source, so callers can inspect both
//! the location and the OS-level cause.

use std::fmt;
use std::path::{Path, PathBuf};

/// Main error type for treecp operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A source entry could not be inspected (missing, permission denied, I/O)
    #[error("Failed to stat '{}': {source}", .path.display())]
    Stat {
        /// Source path that could not be inspected
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A destination directory could not be created
    #[error("Failed to create directory '{}': {source}", .path.display())]
    Mkdir {
        /// Destination directory path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The byte copy (or a transform) failed mid-stream
    #[error("Failed to copy '{}' to '{}': {source}", .from.display(), .to.display())]
    Copy {
        /// Source file path
        from: PathBuf,
        /// Destination file path
        to: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Reading or creating a symbolic link failed
    #[error("Failed to replicate symlink '{}': {source}", .path.display())]
    Symlink {
        /// Path of the link being read or created
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Replicating mode bits (or timestamps) onto the destination failed
    #[error("Failed to replicate metadata onto '{}': {source}", .path.display())]
    Chmod {
        /// Destination path whose metadata could not be set
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Every error collected by a run that does not stop on the first error
    #[error("{}", AggregateDisplay(.errors))]
    Aggregate {
        /// Errors in the order they were recorded
        errors: Vec<Error>,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration issue
        message: String,
    },

    /// Generic error with custom message
    #[error("{message}")]
    Other {
        /// Custom error message
        message: String,
    },
}

/// Error kind for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorKind {
    /// Source entry unreadable or missing
    Stat,
    /// Destination directory creation failed
    Mkdir,
    /// Byte copy or transform failed
    Copy,
    /// Symlink read or creation failed
    Symlink,
    /// Mode or timestamp replication failed
    Chmod,
    /// Several errors were collected
    Aggregate,
    /// Configuration errors
    Config,
    /// Other errors
    Other,
}

impl Error {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Stat { .. } => ErrorKind::Stat,
            Self::Mkdir { .. } => ErrorKind::Mkdir,
            Self::Copy { .. } => ErrorKind::Copy,
            Self::Symlink { .. } => ErrorKind::Symlink,
            Self::Chmod { .. } => ErrorKind::Chmod,
            Self::Aggregate { .. } => ErrorKind::Aggregate,
            Self::Config { .. } => ErrorKind::Config,
            Self::Other { .. } => ErrorKind::Other,
        }
    }

    /// Whether this error ends a stop-on-error run.
    ///
    /// Metadata replication failures are reported but never abort the walk.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Chmod { .. })
    }

    /// Path the error concerns, if it is a per-entry error
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Stat { path, .. }
            | Self::Mkdir { path, .. }
            | Self::Symlink { path, .. }
            | Self::Chmod { path, .. } => Some(path.as_path()),
            Self::Copy { from, .. } => Some(from.as_path()),
            _ => None,
        }
    }

    /// Errors carried by an aggregate, or a one-element slice for anything else
    pub fn errors(&self) -> &[Error] {
        match self {
            Self::Aggregate { errors } => errors,
            other => std::slice::from_ref(other),
        }
    }

    /// Create a new stat error
    pub fn stat(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Stat {
            path: path.into(),
            source,
        }
    }

    /// Create a new mkdir error
    pub fn mkdir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Mkdir {
            path: path.into(),
            source,
        }
    }

    /// Create a new copy error
    pub fn copy(
        from: impl Into<PathBuf>,
        to: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Copy {
            from: from.into(),
            to: to.into(),
            source,
        }
    }

    /// Create a new symlink error
    pub fn symlink(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Symlink {
            path: path.into(),
            source,
        }
    }

    /// Create a new chmod error
    pub fn chmod(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Chmod {
            path: path.into(),
            source,
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new generic error
    pub fn other<S: Into<String>>(message: S) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

struct AggregateDisplay<'a>(&'a [Error]);

impl fmt::Display for AggregateDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error(s) occurred while copying", self.0.len())?;
        for error in self.0 {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}
