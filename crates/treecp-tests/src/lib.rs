//! treecp integration test support
//!
//! Fixture trees and tree comparison helpers shared by the integration tests.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Fixture trees and tree readers
pub mod test_utils;

pub use test_utils::{read_tree, Fixture};
