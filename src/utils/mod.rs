//! Cross-platform utilities and helpers
//!
//! - [`fs`] - Atomic file writes and working-copy cleanup
//! - [`platform`] - Platform-specific command names and tool detection

pub mod fs;
pub mod platform;

pub use fs::{atomic_write, remove_dir_if_exists};
