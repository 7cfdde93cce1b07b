//! Customization hooks for tree copies
//!
//! The engine consults these at fixed points of every entry's life: the
//! [`Filter`] right after classification, the [`Renamer`] on every computed
//! destination path, and the [`Transformer`] instead of the default byte copy
//! for regular files. Implementations are expected to be free of side effects
//! on the tree being copied; nothing enforces that.

use crate::FileInfo;
use std::path::{Path, PathBuf};

#[cfg(feature = "async")]
use async_trait::async_trait;
#[cfg(feature = "async")]
use tokio::io::{AsyncRead, AsyncWrite};

/// Predicate deciding which entries take part in the copy.
///
/// A rejected directory is not descended into.
pub trait Filter: Send + Sync {
    /// Return `true` to copy the entry at `path`
    fn admit(&self, path: &Path, info: &FileInfo) -> bool;
}

impl<F> Filter for F
where
    F: Fn(&Path, &FileInfo) -> bool + Send + Sync,
{
    fn admit(&self, path: &Path, info: &FileInfo) -> bool {
        self(path, info)
    }
}

/// Maps a computed destination path to the one actually used.
///
/// Must be total: every input yields a usable path.
pub trait Renamer: Send + Sync {
    /// Return the final destination for `destination`
    fn rename(&self, destination: &Path) -> PathBuf;
}

impl<F> Renamer for F
where
    F: Fn(&Path) -> PathBuf + Send + Sync,
{
    fn rename(&self, destination: &Path) -> PathBuf {
        self(destination)
    }
}

/// Takes over the byte copy of a regular file.
///
/// The reader is positioned at the start of the source file and the writer at
/// the start of the freshly created destination file. The transformer must move
/// every byte it wants written; the engine flushes and closes the writer once
/// the future resolves and reports any error it returns as a copy failure.
#[cfg(feature = "async")]
#[async_trait]
pub trait Transformer: Send + Sync {
    /// Copy (and possibly rewrite) `reader` into `writer`
    async fn transform(
        &self,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        writer: &mut (dyn AsyncWrite + Send + Unpin),
        info: &FileInfo,
    ) -> std::io::Result<()>;
}
