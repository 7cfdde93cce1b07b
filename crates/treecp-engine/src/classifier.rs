//! Path classification

use std::path::Path;
use tokio::fs;
use treecp_types::{Error, FileInfo, Result};

/// Turns a path into a [`FileInfo`], following symlinks or not
#[derive(Debug, Clone, Copy)]
pub struct PathClassifier {
    inflate_symlinks: bool,
}

impl PathClassifier {
    /// Create a classifier. With `inflate_symlinks` set links are followed and
    /// their target is reported; otherwise the link itself is reported along
    /// with the target it stores.
    pub fn new(inflate_symlinks: bool) -> Self {
        Self { inflate_symlinks }
    }

    /// Classify `path`, recording `relative` as its place in the source tree.
    ///
    /// A missing or unreadable entry is an [`Error::Stat`]; a link whose
    /// target cannot be read is an [`Error::Symlink`].
    pub async fn classify(&self, path: &Path, relative: &Path) -> Result<FileInfo> {
        let metadata = if self.inflate_symlinks {
            fs::metadata(path).await
        } else {
            fs::symlink_metadata(path).await
        }
        .map_err(|e| Error::stat(path, e))?;

        let link_target = if metadata.file_type().is_symlink() {
            Some(treecp_io::read_link(path).await?)
        } else {
            None
        };

        Ok(FileInfo::from_metadata(path, relative, &metadata, link_target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use treecp_types::{EntryKind, ErrorKind};

    #[tokio::test]
    async fn test_classify_file_and_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a");
        tokio::fs::write(&file, b"aaa").await.unwrap();

        let classifier = PathClassifier::new(true);
        let info = classifier.classify(&file, Path::new("a")).await.unwrap();
        assert_eq!(info.kind, EntryKind::File);
        assert_eq!(info.name, "a");
        assert_eq!(info.len, 3);

        let info = classifier
            .classify(temp_dir.path(), Path::new(""))
            .await
            .unwrap();
        assert_eq!(info.kind, EntryKind::Directory);
    }

    #[tokio::test]
    async fn test_classify_missing_path_is_stat_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");

        let error = PathClassifier::new(true)
            .classify(&missing, Path::new("missing"))
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Stat);
        assert_eq!(error.path(), Some(missing.as_path()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_policy() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("target");
        let link = temp_dir.path().join("link");
        tokio::fs::write(&target, b"content").await.unwrap();
        std::os::unix::fs::symlink("target", &link).unwrap();

        let inflated = PathClassifier::new(true)
            .classify(&link, Path::new("link"))
            .await
            .unwrap();
        assert_eq!(inflated.kind, EntryKind::File);
        assert!(inflated.link_target.is_none());

        let kept = PathClassifier::new(false)
            .classify(&link, Path::new("link"))
            .await
            .unwrap();
        assert_eq!(kept.kind, EntryKind::Symlink);
        assert_eq!(kept.link_target, Some(PathBuf::from("target")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_dangling_link_only_fails_when_inflating() {
        let temp_dir = TempDir::new().unwrap();
        let link = temp_dir.path().join("dangling");
        std::os::unix::fs::symlink("nowhere", &link).unwrap();

        let error = PathClassifier::new(true)
            .classify(&link, Path::new("dangling"))
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Stat);

        let info = PathClassifier::new(false)
            .classify(&link, Path::new("dangling"))
            .await
            .unwrap();
        assert!(info.is_symlink());
    }
}
