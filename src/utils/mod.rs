//! Utility functions and helpers
//!
//! This module contains the file-system helpers used by the file layer.

pub mod fs;

pub use fs::{ensure_dir, open_append, parent_dir, remove_if_exists, scan_dir, FileEntry};
