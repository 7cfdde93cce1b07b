//! Runtime copy options

use crate::hooks::GlobFilter;
use std::fmt;
use std::sync::Arc;
use treecp_config::Config;
use treecp_types::{BufferSize, ConcurrencyLimit, Filter, Renamer, Result, Transformer};

/// Everything that shapes a tree copy.
///
/// Defaults: clobber, collect every error, dereference symlinks, no hooks and
/// no limit on simultaneous file copies.
#[derive(Clone)]
pub struct CopyOptions {
    /// Entry predicate; rejected directories are not descended into
    pub filter: Option<Arc<dyn Filter>>,
    /// Replacement for the default byte copy of regular files
    pub transform: Option<Arc<dyn Transformer>>,
    /// Applied to every computed destination path
    pub rename: Option<Arc<dyn Renamer>>,
    /// Overwrite existing destination files
    pub clobber: bool,
    /// End the whole copy on the first fatal error
    pub stop_on_error: bool,
    /// Copy what symlinks point to instead of recreating the links.
    ///
    /// When links are recreated, their targets are written exactly as read.
    /// A relative target is not rewritten against the destination, so it
    /// resolves relative to the new link's directory.
    pub inflate_symlinks: bool,
    /// Maximum number of files being copied at once
    pub limit: Option<ConcurrencyLimit>,
    /// With `clobber` off, still overwrite files whose source is newer
    pub update_newer: bool,
    /// Replicate access and modification times onto copied files
    pub preserve_timestamps: bool,
    /// Chunk size of the default byte copy
    pub buffer_size: BufferSize,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            filter: None,
            transform: None,
            rename: None,
            clobber: true,
            stop_on_error: false,
            inflate_symlinks: true,
            limit: None,
            update_newer: false,
            preserve_timestamps: false,
            buffer_size: BufferSize::default(),
        }
    }
}

impl fmt::Debug for CopyOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CopyOptions")
            .field("filter", &self.filter.is_some())
            .field("transform", &self.transform.is_some())
            .field("rename", &self.rename.is_some())
            .field("clobber", &self.clobber)
            .field("stop_on_error", &self.stop_on_error)
            .field("inflate_symlinks", &self.inflate_symlinks)
            .field("limit", &self.limit)
            .field("update_newer", &self.update_newer)
            .field("preserve_timestamps", &self.preserve_timestamps)
            .field("buffer_size", &self.buffer_size)
            .finish()
    }
}

impl CopyOptions {
    /// Create options with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Build runtime options from loaded configuration.
    ///
    /// A non-empty `exclude` list becomes a [`GlobFilter`].
    pub fn from_config(config: &Config) -> Result<Self> {
        let settings = &config.copy;
        let mut options = Self {
            clobber: settings.clobber,
            stop_on_error: settings.stop_on_error,
            inflate_symlinks: settings.inflate_symlinks,
            limit: settings.limit,
            update_newer: settings.update_newer,
            preserve_timestamps: settings.preserve_timestamps,
            buffer_size: settings.buffer_size,
            ..Self::default()
        };
        if !settings.exclude.is_empty() {
            options = options.with_filter(GlobFilter::new(&settings.exclude)?);
        }
        Ok(options)
    }

    /// Set the entry filter
    pub fn with_filter<F: Filter + 'static>(mut self, filter: F) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Set the file transform
    pub fn with_transform<T: Transformer + 'static>(mut self, transform: T) -> Self {
        self.transform = Some(Arc::new(transform));
        self
    }

    /// Set the destination renamer
    pub fn with_rename<R: Renamer + 'static>(mut self, rename: R) -> Self {
        self.rename = Some(Arc::new(rename));
        self
    }

    /// Overwrite existing destination files or leave them alone
    pub fn clobber(mut self, clobber: bool) -> Self {
        self.clobber = clobber;
        self
    }

    /// Stop on the first fatal error or collect all of them
    pub fn stop_on_error(mut self, stop_on_error: bool) -> Self {
        self.stop_on_error = stop_on_error;
        self
    }

    /// Dereference symlinks or recreate them with their targets verbatim
    pub fn inflate_symlinks(mut self, inflate: bool) -> Self {
        self.inflate_symlinks = inflate;
        self
    }

    /// Bound the number of files copied at once
    pub fn limit(mut self, limit: ConcurrencyLimit) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Overwrite files whose source is newer even without clobbering
    pub fn update_newer(mut self, update_newer: bool) -> Self {
        self.update_newer = update_newer;
        self
    }

    /// Replicate timestamps onto copied files
    pub fn preserve_timestamps(mut self, preserve: bool) -> Self {
        self.preserve_timestamps = preserve;
        self
    }

    /// Set the chunk size of the default byte copy
    pub fn buffer_size(mut self, buffer_size: BufferSize) -> Self {
        self.buffer_size = buffer_size;
        self
    }
}
