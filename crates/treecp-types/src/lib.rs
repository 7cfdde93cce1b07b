//! Core type system and error handling for treecp
//!
//! This crate provides the foundational types shared by every treecp crate:
//!
//! - **Error handling**: one [`Error`] enum covering every per-entry failure kind
//!   plus the aggregate reported by collect-all runs
//! - **Core types**: [`FileInfo`], [`EntryKind`] and [`CopyStats`]
//! - **Hooks**: the [`Filter`], [`Renamer`] and (with `async`) `Transformer`
//!   traits injected into the copy engine
//! - **Configuration**: validated newtypes such as [`BufferSize`] and
//!   [`ConcurrencyLimit`]
//!
//! # Features
//!
//! - `std` (default): Enable standard library features
//! - `async`: Enable the async `Transformer` hook
//! - `serde`: Enable serialization support
//!
//! # Examples
//!
//! ```rust
//! use treecp_types::{CopyStats, Result};
//!
//! fn example_operation() -> Result<CopyStats> {
//!     let mut stats = CopyStats::new();
//!     stats.files_copied = 10;
//!     stats.bytes_copied = 1024 * 1024;
//!     Ok(stats)
//! }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::{BufferSize, ConcurrencyLimit};
pub use error::{Error, ErrorKind};
pub use result::Result;
pub use traits::*;
pub use types::*;
