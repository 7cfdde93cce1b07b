//! Recursive async tree copy engine for treecp
//!
//! Copies a directory tree (or a single file or link) from one place to
//! another, one task per entry, with caller-supplied hooks deciding what gets
//! copied, where it lands and how its bytes are written.
//!
//! # Features
//!
//! - **Hooks**: filter, rename and transform, applied in that order
//! - **Symlink policy**: dereference links or recreate them verbatim
//! - **Clobber policy**: overwrite, skip, or overwrite only when newer
//! - **Error policy**: stop on the first fatal error or collect every error
//! - **Bounded fan-out**: optional limit on simultaneous file copies
//!
//! # Examples
//!
//! ```rust,no_run
//! use treecp_engine::{copy, CopyOptions};
//! use treecp_types::FileInfo;
//! use std::path::Path;
//!
//! # async fn example() -> treecp_types::Result<()> {
//! let options = CopyOptions::new()
//!     .clobber(false)
//!     .with_filter(|_: &Path, info: &FileInfo| !info.name.starts_with('.'));
//! let stats = copy("assets", "public/assets", options).await?;
//! println!("Copied {} files", stats.files_copied);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregator;
pub mod classifier;
pub mod engine;
pub mod hooks;
pub mod options;
pub mod request;
pub mod tracker;

pub use aggregator::{ErrorAggregator, Verdict};
pub use classifier::PathClassifier;
pub use engine::{copy, CopyEngine};
pub use hooks::{GlobFilter, HookPipeline};
pub use options::CopyOptions;
pub use request::{CopyRequest, RequestId};
pub use tracker::{CompletionTracker, PendingGuard, Termination};

// Hook traits live in treecp-types; re-exported so callers need one import
pub use treecp_types::{CopyStats, Error, FileInfo, Filter, Renamer, Result, Transformer};
