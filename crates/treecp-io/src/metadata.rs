//! Destination metadata helpers
//!
//! Mode and timestamp replication, destination probing and removal of an
//! existing destination before it is overwritten.

use std::fs::{Metadata, Permissions};
use std::io;
use std::path::Path;
use std::time::SystemTime;
use tokio::fs;
use tracing::{debug, trace};
use treecp_types::{Error, Result};

/// Look at `path` without following a final symlink.
///
/// Returns `Ok(None)` when nothing exists there.
pub async fn probe(path: &Path) -> io::Result<Option<Metadata>> {
    match fs::symlink_metadata(path).await {
        Ok(metadata) => Ok(Some(metadata)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Apply permission bits to `path`.
///
/// Failures are reported as [`Error::Chmod`].
pub async fn set_mode(path: &Path, mode: u32) -> Result<()> {
    let permissions = permissions_for(path, mode)
        .await
        .map_err(|e| Error::chmod(path, e))?;
    fs::set_permissions(path, permissions)
        .await
        .map_err(|e| Error::chmod(path, e))?;
    trace!("Set mode {:o} on {}", mode, path.display());
    Ok(())
}

#[cfg(unix)]
async fn permissions_for(_path: &Path, mode: u32) -> io::Result<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Ok(Permissions::from_mode(mode))
}

#[cfg(not(unix))]
async fn permissions_for(path: &Path, mode: u32) -> io::Result<Permissions> {
    let mut permissions = fs::metadata(path).await?.permissions();
    permissions.set_readonly(mode & 0o222 == 0);
    Ok(permissions)
}

/// Copy access and modification times onto `path`.
///
/// Missing times fall back to "now". Failures are reported as
/// [`Error::Chmod`] since they belong to the same metadata replication step.
pub fn set_times(path: &Path, accessed: Option<SystemTime>, modified: Option<SystemTime>) -> Result<()> {
    let now = SystemTime::now();
    filetime::set_file_times(
        path,
        filetime::FileTime::from_system_time(accessed.unwrap_or(now)),
        filetime::FileTime::from_system_time(modified.unwrap_or(now)),
    )
    .map_err(|e| Error::chmod(path, e))?;
    trace!("Preserved timestamps on {}", path.display());
    Ok(())
}

/// Whether a source last modified at `source` is strictly newer than a
/// destination last modified at `destination`.
///
/// When either time is unknown the source counts as newer.
pub fn is_newer(source: Option<SystemTime>, destination: Option<SystemTime>) -> bool {
    match (source, destination) {
        (Some(source), Some(destination)) => source > destination,
        _ => true,
    }
}

/// Remove the non-directory entry at `path` so a new one can take its place.
///
/// `existing` is the `lstat` result for `path`. Files and links (including
/// links to directories) are unlinked; a real directory is left alone and
/// reported as `AlreadyExists`.
pub async fn remove_existing(path: &Path, existing: &Metadata) -> io::Result<()> {
    if existing.file_type().is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("'{}' is a directory", path.display()),
        ));
    }
    debug!("Removing existing entry {}", path.display());
    fs::remove_file(path).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_probe_missing_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");
        assert!(probe(&missing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_probe_does_not_follow_links() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("file");
        tokio::fs::write(&file, b"x").await.unwrap();

        let metadata = probe(&file).await.unwrap().unwrap();
        assert!(metadata.is_file());

        #[cfg(unix)]
        {
            let link = temp_dir.path().join("dangling");
            std::os::unix::fs::symlink("nowhere", &link).unwrap();
            let metadata = probe(&link).await.unwrap().unwrap();
            assert!(metadata.file_type().is_symlink());
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_set_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("file");
        tokio::fs::write(&file, b"x").await.unwrap();

        set_mode(&file, 0o640).await.unwrap();
        let mode = std::fs::metadata(&file).unwrap().permissions().mode() & 0o7777;
        assert_eq!(mode, 0o640);
    }

    #[tokio::test]
    async fn test_set_mode_on_missing_path_is_chmod_error() {
        let temp_dir = TempDir::new().unwrap();
        let error = set_mode(&temp_dir.path().join("missing"), 0o644)
            .await
            .unwrap_err();
        assert_eq!(error.kind(), treecp_types::ErrorKind::Chmod);
        assert!(!error.is_fatal());
    }

    #[tokio::test]
    async fn test_set_times() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("file");
        tokio::fs::write(&file, b"x").await.unwrap();

        let past = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000_000);
        set_times(&file, Some(past), Some(past)).unwrap();

        let modified = std::fs::metadata(&file).unwrap().modified().unwrap();
        assert_eq!(modified, past);
    }

    #[test]
    fn test_is_newer() {
        let older = SystemTime::UNIX_EPOCH + Duration::from_secs(10);
        let newer = SystemTime::UNIX_EPOCH + Duration::from_secs(20);

        assert!(is_newer(Some(newer), Some(older)));
        assert!(!is_newer(Some(older), Some(newer)));
        assert!(!is_newer(Some(older), Some(older)));
        assert!(is_newer(None, Some(older)));
        assert!(is_newer(Some(older), None));
    }

    #[tokio::test]
    async fn test_remove_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("file");
        tokio::fs::write(&file, b"x").await.unwrap();

        let metadata = probe(&file).await.unwrap().unwrap();
        remove_existing(&file, &metadata).await.unwrap();
        assert!(!file.exists());
    }

    #[tokio::test]
    async fn test_remove_existing_refuses_directories() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("dir");
        tokio::fs::create_dir(&dir).await.unwrap();
        tokio::fs::write(dir.join("keep"), b"x").await.unwrap();

        let metadata = probe(&dir).await.unwrap().unwrap();
        let error = remove_existing(&dir, &metadata).await.unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::AlreadyExists);
        assert!(dir.join("keep").exists());
    }
}
