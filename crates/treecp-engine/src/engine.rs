//! The recursive copy engine
//!
//! Each entry of the source tree runs as its own task: it is classified,
//! filtered, renamed and then dispatched on its kind. Directories create their
//! destination, list their children, schedule all of them with the
//! [`CompletionTracker`] and spawn one task per child. The caller waits for the
//! tracker's single terminal notification and then asks the
//! [`ErrorAggregator`] for the outcome.

use crate::aggregator::{ErrorAggregator, Verdict};
use crate::classifier::PathClassifier;
use crate::hooks::HookPipeline;
use crate::options::CopyOptions;
use crate::request::CopyRequest;
use crate::tracker::{CompletionTracker, PendingGuard, Termination};
use futures::FutureExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::fs;
use tokio::sync::Semaphore;
use tracing::{debug, info, info_span, warn, Instrument};
use treecp_io::BufferedCopier;
use treecp_types::{CopyStats, EntryKind, Error, FileInfo, Result};

/// Copy the tree at `source` to `destination`.
///
/// Resolves once every entry has been handled. Errors follow the
/// `stop_on_error` policy of `options`: the first fatal error alone, or an
/// [`Error::Aggregate`] with every error in the order it was recorded.
pub async fn copy<P1, P2>(source: P1, destination: P2, options: CopyOptions) -> Result<CopyStats>
where
    P1: Into<PathBuf>,
    P2: Into<PathBuf>,
{
    CopyEngine::new(options)
        .execute(CopyRequest::new(source, destination))
        .await
}

/// Reusable engine holding one set of [`CopyOptions`]
#[derive(Debug, Clone, Default)]
pub struct CopyEngine {
    options: CopyOptions,
}

impl CopyEngine {
    /// Create an engine with the given options
    pub fn new(options: CopyOptions) -> Self {
        Self { options }
    }

    /// Options every request is executed with
    pub fn options(&self) -> &CopyOptions {
        &self.options
    }

    /// Execute a copy request
    pub async fn execute(&self, request: CopyRequest) -> Result<CopyStats> {
        let span = info_span!(
            "copy",
            id = %request.id(),
            source = %request.source().display(),
            destination = %request.destination().display()
        );
        self.run(request).instrument(span).await
    }

    async fn run(&self, request: CopyRequest) -> Result<CopyStats> {
        let start = Instant::now();
        info!("Starting tree copy");
        debug!("Copy options: {:?}", self.options);

        let (tracker, root, done) = CompletionTracker::start();
        let context = Arc::new(CopyContext::new(&self.options, tracker));

        context.spawn_entry(
            PendingEntry {
                source: request.source().to_path_buf(),
                relative: PathBuf::new(),
                destination: request.destination().to_path_buf(),
            },
            root,
        );

        let termination = done
            .await
            .map_err(|_| Error::other("Copy ended without a completion notice"))?;
        if termination == Termination::Aborted {
            debug!("Stopped early, {} entries still in flight", context.tracker.pending());
        }

        let stats = context.stats.snapshot(start.elapsed());
        match context.errors.finish() {
            Some(error) => {
                warn!("Tree copy failed after {:?}", stats.duration);
                Err(error)
            }
            None => {
                info!(
                    "Tree copy completed: {} files, {} directories, {} symlinks, {} bytes in {:?}",
                    stats.files_copied,
                    stats.directories_created,
                    stats.symlinks_created,
                    stats.bytes_copied,
                    stats.duration
                );
                Ok(stats)
            }
        }
    }
}

/// An entry discovered but not yet classified
#[derive(Debug)]
struct PendingEntry {
    source: PathBuf,
    relative: PathBuf,
    /// Parent's final destination joined with the entry name, before renaming
    destination: PathBuf,
}

/// State shared by every task of one copy
struct CopyContext {
    clobber: bool,
    update_newer: bool,
    preserve_timestamps: bool,
    classifier: PathClassifier,
    hooks: HookPipeline,
    copier: BufferedCopier,
    limiter: Option<Semaphore>,
    tracker: Arc<CompletionTracker>,
    errors: ErrorAggregator,
    stats: StatsCollector,
}

impl CopyContext {
    fn new(options: &CopyOptions, tracker: Arc<CompletionTracker>) -> Self {
        Self {
            clobber: options.clobber,
            update_newer: options.update_newer,
            preserve_timestamps: options.preserve_timestamps,
            classifier: PathClassifier::new(options.inflate_symlinks),
            hooks: HookPipeline::from_options(options),
            copier: BufferedCopier::new(options.buffer_size),
            limiter: options.limit.map(|limit| Semaphore::new(limit.get())),
            tracker,
            errors: ErrorAggregator::new(options.stop_on_error),
            stats: StatsCollector::default(),
        }
    }

    fn spawn_entry(self: &Arc<Self>, entry: PendingEntry, guard: PendingGuard) {
        let context = Arc::clone(self);
        let task = async move {
            let _guard = guard;
            if context.tracker.is_closed() {
                return;
            }
            if let Err(error) = context.visit(entry).await {
                context.report(error);
            }
        }
        .boxed();
        tokio::spawn(task.in_current_span());
    }

    fn report(&self, error: Error) {
        self.stats.errors.fetch_add(1, Ordering::Relaxed);
        if self.errors.record(error) == Verdict::Abort {
            self.tracker.abort();
        }
    }

    async fn visit(self: &Arc<Self>, entry: PendingEntry) -> Result<()> {
        let info = self
            .classifier
            .classify(&entry.source, &entry.relative)
            .await?;

        if !self.hooks.admits(&info) {
            debug!("Filtered out {}", info.path.display());
            self.stats.entries_filtered.fetch_add(1, Ordering::Relaxed);
            return Ok(());
        }

        let destination = self.hooks.destination(&entry.destination);
        match info.kind {
            EntryKind::Directory => self.copy_directory(&info, destination).await,
            EntryKind::File => self.copy_file(&info, &destination).await,
            EntryKind::Symlink => self.copy_symlink(&info, &destination).await,
            EntryKind::Other => {
                warn!("Skipping special file {}", info.path.display());
                self.stats.files_skipped.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
        }
    }

    async fn copy_directory(self: &Arc<Self>, info: &FileInfo, destination: PathBuf) -> Result<()> {
        match fs::metadata(&destination).await {
            Ok(existing) if existing.is_dir() => {
                debug!("Reusing existing directory {}", destination.display());
            }
            Ok(_) => {
                return Err(Error::mkdir(
                    &destination,
                    std::io::Error::new(
                        std::io::ErrorKind::AlreadyExists,
                        "destination exists and is not a directory",
                    ),
                ));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                treecp_io::create_dir(&destination, info.mode).await?;
                self.stats.directories_created.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => return Err(Error::mkdir(&destination, e)),
        }

        let names = treecp_io::list_dir(&info.path).await?;
        debug!("Descending into {} ({} entries)", info.path.display(), names.len());

        // Every child is counted before any of them starts
        let mut scheduled = Vec::with_capacity(names.len());
        for name in names {
            let Some(guard) = self.tracker.schedule() else {
                debug!("Copy aborted, not descending further");
                return Ok(());
            };
            scheduled.push((
                PendingEntry {
                    source: info.path.join(&name),
                    relative: info.relative.join(&name),
                    destination: destination.join(&name),
                },
                guard,
            ));
        }
        for (entry, guard) in scheduled {
            self.spawn_entry(entry, guard);
        }
        Ok(())
    }

    async fn copy_file(&self, info: &FileInfo, destination: &Path) -> Result<()> {
        let existing = treecp_io::probe(destination)
            .await
            .map_err(|e| Error::copy(&info.path, destination, e))?;

        if let Some(existing) = existing {
            let overwrite = self.clobber
                || (self.update_newer
                    && treecp_io::is_newer(info.modified, existing.modified().ok()));
            if !overwrite {
                debug!("Keeping existing {}", destination.display());
                self.stats.files_skipped.fetch_add(1, Ordering::Relaxed);
                return Ok(());
            }
            treecp_io::remove_existing(destination, &existing)
                .await
                .map_err(|e| Error::copy(&info.path, destination, e))?;
        }

        let permit = match &self.limiter {
            Some(limiter) => Some(
                limiter
                    .acquire()
                    .await
                    .map_err(|_| Error::other("Copy limiter closed"))?,
            ),
            None => None,
        };
        let bytes = match self.hooks.transformer() {
            Some(transformer) => {
                self.copier
                    .transform_file(info, destination, transformer)
                    .await?
            }
            None => {
                self.copier
                    .copy_file(&info.path, destination, info.mode)
                    .await?
            }
        };
        drop(permit);

        self.stats.files_copied.fetch_add(1, Ordering::Relaxed);
        self.stats.bytes_copied.fetch_add(bytes, Ordering::Relaxed);

        // Metadata failures are reported without failing the entry
        if let Err(error) = treecp_io::set_mode(destination, info.mode).await {
            self.report(error);
        }
        if self.preserve_timestamps {
            if let Err(error) = treecp_io::set_times(destination, info.accessed, info.modified) {
                self.report(error);
            }
        }
        Ok(())
    }

    async fn copy_symlink(&self, info: &FileInfo, destination: &Path) -> Result<()> {
        let target = match &info.link_target {
            Some(target) => target.clone(),
            None => treecp_io::read_link(&info.path).await?,
        };

        let existing = treecp_io::probe(destination)
            .await
            .map_err(|e| Error::symlink(destination, e))?;
        if let Some(existing) = existing {
            if existing.file_type().is_symlink()
                && treecp_io::read_link(destination).await? == target
            {
                debug!("{} already points to {}", destination.display(), target.display());
                return Ok(());
            }
            if !self.clobber {
                debug!("Keeping existing {}", destination.display());
                self.stats.files_skipped.fetch_add(1, Ordering::Relaxed);
                return Ok(());
            }
            treecp_io::remove_existing(destination, &existing)
                .await
                .map_err(|e| Error::symlink(destination, e))?;
        }

        let target_is_dir = match fs::metadata(&info.path).await {
            Ok(metadata) => metadata.is_dir(),
            Err(e) => {
                debug!(
                    "Cannot resolve {} ({}), linking it as a file",
                    info.path.display(),
                    e
                );
                false
            }
        };
        treecp_io::create_symlink(&target, destination, target_is_dir).await?;
        self.stats.symlinks_created.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct StatsCollector {
    files_copied: AtomicU64,
    directories_created: AtomicU64,
    symlinks_created: AtomicU64,
    bytes_copied: AtomicU64,
    entries_filtered: AtomicU64,
    files_skipped: AtomicU64,
    errors: AtomicU64,
}

impl StatsCollector {
    fn snapshot(&self, duration: Duration) -> CopyStats {
        CopyStats {
            files_copied: self.files_copied.load(Ordering::Relaxed),
            directories_created: self.directories_created.load(Ordering::Relaxed),
            symlinks_created: self.symlinks_created.load(Ordering::Relaxed),
            bytes_copied: self.bytes_copied.load(Ordering::Relaxed),
            entries_filtered: self.entries_filtered.load(Ordering::Relaxed),
            files_skipped: self.files_skipped.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treecp_types::{ConcurrencyLimit, ErrorKind};
    use tempfile::TempDir;

    async fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.unwrap();
        }
        tokio::fs::write(path, content).await.unwrap();
    }

    #[tokio::test]
    async fn test_copy_single_file() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("source.txt");
        let destination = temp_dir.path().join("destination.txt");
        write(&source, "Hello, World!").await;

        let stats = copy(&source, &destination, CopyOptions::default())
            .await
            .unwrap();

        assert_eq!(stats.files_copied, 1);
        assert_eq!(stats.bytes_copied, 13);
        assert_eq!(
            tokio::fs::read_to_string(&destination).await.unwrap(),
            "Hello, World!"
        );
    }

    #[tokio::test]
    async fn test_copy_nested_tree() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("src");
        let destination = temp_dir.path().join("dst");
        write(&source.join("a"), "a").await;
        write(&source.join("sub/b"), "b").await;
        write(&source.join("sub/deeper/c"), "c").await;

        let stats = copy(&source, &destination, CopyOptions::default())
            .await
            .unwrap();

        assert_eq!(stats.files_copied, 3);
        assert_eq!(stats.directories_created, 3);
        assert_eq!(stats.errors, 0);
        assert_eq!(
            tokio::fs::read_to_string(destination.join("sub/deeper/c"))
                .await
                .unwrap(),
            "c"
        );
    }

    #[tokio::test]
    async fn test_existing_destination_directory_is_reused() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("src");
        let destination = temp_dir.path().join("dst");
        write(&source.join("a"), "new").await;
        write(&destination.join("unrelated"), "keep").await;

        let stats = copy(&source, &destination, CopyOptions::new().clobber(false))
            .await
            .unwrap();

        assert_eq!(stats.directories_created, 0);
        assert_eq!(stats.files_copied, 1);
        assert!(destination.join("unrelated").exists());
    }

    #[tokio::test]
    async fn test_missing_source_fails() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("missing");
        let destination = temp_dir.path().join("dst");

        let error = copy(&source, &destination, CopyOptions::default())
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Aggregate);
        assert_eq!(error.errors().len(), 1);
        assert_eq!(error.errors()[0].kind(), ErrorKind::Stat);

        let error = copy(&source, &destination, CopyOptions::new().stop_on_error(true))
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Stat);
    }

    #[tokio::test]
    async fn test_filtered_root_copies_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("src");
        let destination = temp_dir.path().join("dst");
        write(&source.join("a"), "a").await;

        let stats = copy(
            &source,
            &destination,
            CopyOptions::new().with_filter(|_: &Path, _: &FileInfo| false),
        )
        .await
        .unwrap();

        assert_eq!(stats.entries_filtered, 1);
        assert!(!destination.exists());
    }

    #[tokio::test]
    async fn test_limit_of_one_still_completes() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("src");
        let destination = temp_dir.path().join("dst");
        for i in 0..20 {
            write(&source.join(format!("dir{}/file{}", i % 4, i)), "x").await;
        }

        let options = CopyOptions::new().limit(ConcurrencyLimit::clamped(1));
        let stats = copy(&source, &destination, options).await.unwrap();

        assert_eq!(stats.files_copied, 20);
        assert_eq!(stats.directories_created, 5);
    }

    #[tokio::test]
    async fn test_engine_is_reusable() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("src");
        write(&source.join("a"), "a").await;

        let engine = CopyEngine::new(CopyOptions::default());
        for name in ["first", "second"] {
            let request = CopyRequest::new(&source, temp_dir.path().join(name));
            engine.execute(request).await.unwrap();
        }

        assert!(temp_dir.path().join("first/a").exists());
        assert!(temp_dir.path().join("second/a").exists());
    }
}
