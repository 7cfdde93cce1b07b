//! Symbolic link replication

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use treecp_types::{Error, Result};

/// Read the target stored in the link at `path`, verbatim
pub async fn read_link(path: &Path) -> Result<PathBuf> {
    fs::read_link(path)
        .await
        .map_err(|e| Error::symlink(path, e))
}

/// Create a link at `link` pointing to `target`.
///
/// The target is written exactly as given, relative targets stay relative.
/// `target_is_dir` only matters on Windows, where file and directory links
/// are distinct.
pub async fn create_symlink(target: &Path, link: &Path, target_is_dir: bool) -> Result<()> {
    symlink(target, link, target_is_dir)
        .await
        .map_err(|e| Error::symlink(link, e))?;
    debug!("Linked {} -> {}", link.display(), target.display());
    Ok(())
}

#[cfg(unix)]
async fn symlink(target: &Path, link: &Path, _target_is_dir: bool) -> std::io::Result<()> {
    fs::symlink(target, link).await
}

#[cfg(windows)]
async fn symlink(target: &Path, link: &Path, target_is_dir: bool) -> std::io::Result<()> {
    if target_is_dir {
        fs::symlink_dir(target, link).await
    } else {
        fs::symlink_file(target, link).await
    }
}

#[cfg(not(any(unix, windows)))]
async fn symlink(_target: &Path, _link: &Path, _target_is_dir: bool) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "symbolic links are not supported on this platform",
    ))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use treecp_types::ErrorKind;

    #[tokio::test]
    async fn test_relative_target_is_kept_verbatim() {
        let temp_dir = TempDir::new().unwrap();
        let link = temp_dir.path().join("link");

        create_symlink(Path::new("../elsewhere/target"), &link, false)
            .await
            .unwrap();

        assert_eq!(
            read_link(&link).await.unwrap(),
            PathBuf::from("../elsewhere/target")
        );
    }

    #[tokio::test]
    async fn test_create_over_existing_entry_fails() {
        let temp_dir = TempDir::new().unwrap();
        let link = temp_dir.path().join("occupied");
        tokio::fs::write(&link, b"x").await.unwrap();

        let error = create_symlink(Path::new("target"), &link, false)
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Symlink);
        assert_eq!(error.path(), Some(link.as_path()));
    }

    #[tokio::test]
    async fn test_read_link_on_regular_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("file");
        tokio::fs::write(&file, b"x").await.unwrap();

        let error = read_link(&file).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Symlink);
    }
}
