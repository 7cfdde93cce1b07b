use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Files of the standard source tree, relative path and content
pub const SOURCE_FILES: [(&str, &str); 8] = [
    ("a", "Hello world"),
    ("b", "Hello tree"),
    ("c", ""),
    ("d", "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"),
    ("e", "0123456789\n9876543210\n"),
    ("f", "Lorem ipsum dolor sit amet"),
    ("sub/a", "Hello subtree"),
    ("sub/b", ""),
];

/// Name of the symlink in the standard tree (Unix only); it points to `f`
pub const SYMLINK_NAME: &str = "g";

/// Scratch area holding a source tree and a destination path
///
/// Everything lives under one temporary directory that is removed on drop.
pub struct Fixture {
    temp_dir: TempDir,
}

impl Fixture {
    /// Empty scratch area; nothing exists at `src()` or `out()` yet
    pub fn empty() -> io::Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    /// Scratch area with the standard source tree at `src()`
    pub fn standard() -> io::Result<Self> {
        let fixture = Self::empty()?;
        for (relative, content) in SOURCE_FILES {
            fixture.write_source(relative, content)?;
        }
        #[cfg(unix)]
        std::os::unix::fs::symlink("f", fixture.src().join(SYMLINK_NAME))?;
        Ok(fixture)
    }

    /// Root of the source tree
    pub fn src(&self) -> PathBuf {
        self.temp_dir.path().join("src")
    }

    /// Destination root
    pub fn out(&self) -> PathBuf {
        self.temp_dir.path().join("out")
    }

    /// Scratch directory the fixture lives in
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write a source file, creating parent directories as needed
    pub fn write_source(&self, relative: &str, content: &str) -> io::Result<PathBuf> {
        write_file(&self.src().join(relative), content)
    }

    /// Write a destination file, creating parent directories as needed
    pub fn write_out(&self, relative: &str, content: &str) -> io::Result<PathBuf> {
        write_file(&self.out().join(relative), content)
    }
}

fn write_file(path: &Path, content: &str) -> io::Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(path.to_path_buf())
}

/// Every file under `root`, keyed by its path relative to `root`.
///
/// Symlinks are followed, so a link reads as its target's content. Directories
/// only show up through the files they contain.
pub fn read_tree(root: &Path) -> io::Result<BTreeMap<PathBuf, Vec<u8>>> {
    let mut files = BTreeMap::new();
    collect(root, Path::new(""), &mut files)?;
    Ok(files)
}

fn collect(dir: &Path, relative: &Path, files: &mut BTreeMap<PathBuf, Vec<u8>>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let relative = relative.join(entry.file_name());
        if fs::metadata(&path)?.is_dir() {
            collect(&path, &relative, files)?;
        } else {
            files.insert(relative, fs::read(&path)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_fixture() {
        let fixture = Fixture::standard().unwrap();
        let tree = read_tree(&fixture.src()).unwrap();

        assert_eq!(tree[Path::new("a")], b"Hello world");
        assert_eq!(tree[Path::new("sub/a")], b"Hello subtree");
        assert!(!fixture.out().exists());

        #[cfg(unix)]
        assert_eq!(tree[Path::new("g")], tree[Path::new("f")]);
    }
}
