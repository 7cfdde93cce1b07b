//! Hook pipeline: filter, then rename, then (files only) transform
//!
//! Every stage is optional. Without a filter every entry is admitted, without
//! a renamer the joined destination is used as is, and without a transformer
//! the engine falls back to the default byte copy.

use crate::options::CopyOptions;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use treecp_types::{Error, FileInfo, Filter, Renamer, Result, Transformer};

/// The caller's hooks, applied in a fixed order
#[derive(Clone, Default)]
pub struct HookPipeline {
    filter: Option<Arc<dyn Filter>>,
    rename: Option<Arc<dyn Renamer>>,
    transform: Option<Arc<dyn Transformer>>,
}

impl HookPipeline {
    /// Take the hooks out of a set of options
    pub fn from_options(options: &CopyOptions) -> Self {
        Self {
            filter: options.filter.clone(),
            rename: options.rename.clone(),
            transform: options.transform.clone(),
        }
    }

    /// Filter stage: whether the classified entry takes part in the copy
    pub fn admits(&self, info: &FileInfo) -> bool {
        self.filter
            .as_ref()
            .map_or(true, |filter| filter.admit(info.path(), info))
    }

    /// Rename stage: final destination for a joined destination path
    pub fn destination(&self, joined: &Path) -> PathBuf {
        self.rename
            .as_ref()
            .map_or_else(|| joined.to_path_buf(), |rename| rename.rename(joined))
    }

    /// Transform stage: the transformer to hand file copies to, if any
    pub fn transformer(&self) -> Option<&dyn Transformer> {
        self.transform.as_deref()
    }
}

/// [`Filter`] rejecting entries that match any of a set of globs.
///
/// Patterns are tried against the path relative to the source root and against
/// the bare entry name, so `*.tmp` excludes temporary files at any depth while
/// `target/**` only excludes below a top-level `target`. The root itself is
/// never excluded.
#[derive(Debug, Clone)]
pub struct GlobFilter {
    set: GlobSet,
}

impl GlobFilter {
    /// Compile the exclude patterns
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = Glob::new(pattern)
                .map_err(|e| Error::config(format!("Invalid exclude pattern '{}': {}", pattern, e)))?;
            builder.add(glob);
        }
        let set = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build exclude set: {}", e)))?;
        Ok(Self { set })
    }
}

impl Filter for GlobFilter {
    fn admit(&self, _path: &Path, info: &FileInfo) -> bool {
        if info.relative.as_os_str().is_empty() {
            return true;
        }
        !(self.set.is_match(&info.relative) || self.set.is_match(&info.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use treecp_types::EntryKind;

    fn info(relative: &str) -> FileInfo {
        let relative = PathBuf::from(relative);
        FileInfo {
            name: relative
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: Path::new("/src").join(&relative),
            relative,
            mode: 0o644,
            kind: EntryKind::File,
            len: 0,
            accessed: None,
            modified: None,
            link_target: None,
        }
    }

    #[test]
    fn test_empty_pipeline() {
        let hooks = HookPipeline::default();
        assert!(hooks.admits(&info("a")));
        assert_eq!(hooks.destination(Path::new("/dst/a")), PathBuf::from("/dst/a"));
        assert!(hooks.transformer().is_none());
    }

    #[test]
    fn test_pipeline_from_options() {
        let options = CopyOptions::new()
            .with_filter(|path: &Path, _: &FileInfo| !path.ends_with("skip"))
            .with_rename(|path: &Path| {
                if path.file_name().is_some_and(|name| name == "a") {
                    path.with_file_name("z")
                } else {
                    path.to_path_buf()
                }
            });
        let hooks = HookPipeline::from_options(&options);

        assert!(hooks.admits(&info("keep")));
        assert!(!hooks.admits(&info("skip")));
        assert_eq!(hooks.destination(Path::new("/dst/a")), PathBuf::from("/dst/z"));
        assert_eq!(hooks.destination(Path::new("/dst/b")), PathBuf::from("/dst/b"));
    }

    #[rstest]
    #[case("notes.tmp", false)]
    #[case("sub/deep/notes.tmp", false)]
    #[case("target/debug/app", false)]
    #[case("sub/target/app", true)]
    #[case("src/main.rs", true)]
    #[case("", true)]
    fn test_glob_filter(#[case] relative: &str, #[case] admitted: bool) {
        let filter = GlobFilter::new(["*.tmp", "target/**"]).unwrap();
        let entry = info(relative);
        assert_eq!(filter.admit(entry.path(), &entry), admitted);
    }

    #[test]
    fn test_glob_filter_rejects_invalid_pattern() {
        let error = GlobFilter::new(["a["]).unwrap_err();
        assert_eq!(error.kind(), treecp_types::ErrorKind::Config);
    }
}
