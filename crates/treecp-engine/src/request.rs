//! Copy requests

use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Unique identifier for a copy request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Create a new request ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One tree copy to perform. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyRequest {
    id: RequestId,
    source: PathBuf,
    destination: PathBuf,
}

impl CopyRequest {
    /// Create a request copying `source` to `destination`
    pub fn new<P1: Into<PathBuf>, P2: Into<PathBuf>>(source: P1, destination: P2) -> Self {
        Self {
            id: RequestId::new(),
            source: source.into(),
            destination: destination.into(),
        }
    }

    /// Identifier carried by every log line of this copy
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Root of the tree to copy
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Where the root is copied to, before renaming
    pub fn destination(&self) -> &Path {
        &self.destination
    }
}
