//! Async filesystem primitives for treecp
//!
//! The copy engine never touches `tokio::fs` directly for the operations it
//! needs to get right on every platform. This crate provides them:
//!
//! - **Streaming copy**: [`BufferedCopier`] moves file contents in fixed-size
//!   chunks, or hands both ends to a [`Transformer`](treecp_types::Transformer)
//! - **Directories**: creation with a given mode and full listings
//! - **Metadata**: mode and timestamp replication, destination probing
//! - **Links**: reading and creating symbolic links with the target kept verbatim
//!
//! # Examples
//!
//! ```rust,no_run
//! use treecp_io::BufferedCopier;
//! use std::path::Path;
//!
//! # async fn example() -> treecp_types::Result<()> {
//! let copier = BufferedCopier::default();
//! let bytes = copier
//!     .copy_file(Path::new("source.txt"), Path::new("destination.txt"), 0o644)
//!     .await?;
//! println!("Copied {} bytes", bytes);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod copy;
pub mod dir;
pub mod link;
pub mod metadata;

pub use copy::{create_destination, open_source, stream_copy, BufferedCopier, CountingWriter};
pub use dir::{create_dir, list_dir};
pub use link::{create_symlink, read_link};
pub use metadata::{is_newer, probe, remove_existing, set_mode, set_times};
