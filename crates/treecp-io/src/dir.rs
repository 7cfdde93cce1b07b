//! Directory creation and listing

use std::ffi::OsString;
use std::path::Path;
use tokio::fs;
use tracing::debug;
use treecp_types::{Error, Result};

/// Create the directory `path` with permission bits `mode`.
///
/// The parent must already exist. The process umask still applies.
pub async fn create_dir(path: &Path, mode: u32) -> Result<()> {
    let mut builder = fs::DirBuilder::new();
    #[cfg(unix)]
    builder.mode(mode);
    #[cfg(not(unix))]
    let _ = mode;
    builder
        .create(path)
        .await
        .map_err(|e| Error::mkdir(path, e))?;
    debug!("Created directory {}", path.display());
    Ok(())
}

/// Names of every entry in the directory `path`, in listing order.
///
/// The whole listing is read before returning. Failures are reported as
/// [`Error::Stat`] on `path`.
pub async fn list_dir(path: &Path) -> Result<Vec<OsString>> {
    let mut entries = fs::read_dir(path)
        .await
        .map_err(|e| Error::stat(path, e))?;
    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| Error::stat(path, e))?
    {
        names.push(entry.file_name());
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use treecp_types::ErrorKind;

    #[tokio::test]
    async fn test_create_dir() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("created");

        create_dir(&dir, 0o755).await.unwrap();
        assert!(dir.is_dir());
    }

    #[tokio::test]
    async fn test_create_dir_without_parent_is_mkdir_error() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("missing/created");

        let error = create_dir(&dir, 0o755).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Mkdir);
    }

    #[tokio::test]
    async fn test_list_dir() {
        let temp_dir = TempDir::new().unwrap();
        tokio::fs::write(temp_dir.path().join("a"), b"a").await.unwrap();
        tokio::fs::create_dir(temp_dir.path().join("sub")).await.unwrap();

        let mut names = list_dir(temp_dir.path()).await.unwrap();
        names.sort();
        assert_eq!(names, vec![OsString::from("a"), OsString::from("sub")]);
    }

    #[tokio::test]
    async fn test_list_missing_dir_is_stat_error() {
        let temp_dir = TempDir::new().unwrap();
        let error = list_dir(&temp_dir.path().join("missing")).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Stat);
    }
}
