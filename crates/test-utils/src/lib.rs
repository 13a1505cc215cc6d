//! Shared test utilities for the inundation pipeline workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic inundation netCDF file builders
//! - Grid data generators
//! - Sample filenames for each filename schema
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then build inputs inside a temporary directory:
//!
//! ```ignore
//! use test_utils::InundationFile;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let path = InundationFile::new(test_utils::filenames::FIVE_TOKEN, 10, 20)
//!     .write_to(dir.path())
//!     .unwrap();
//! ```

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
