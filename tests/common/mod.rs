//! Common test utilities for graph construction tests
//!
//! Shared fixtures for building chunk grids of known shapes and for checking
//! the graph after a call.
//!
//! # Usage
//!
//! ```ignore
//! mod common;
//! use common::{leaf_grid, node_counts};
//!
//! #[test]
//! fn my_test() -> anyhow::Result<()> {
//!     let ctx = GraphContext::new();
//!     let grid = leaf_grid(&ctx, &[vec![2, 3], vec![4]])?;
//!     let before = node_counts(&ctx)?;
//!     // ...
//!     Ok(())
//! }
//! ```

// Submodules
mod fixtures;
mod tempfile_helpers;

#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use tempfile_helpers::*;
