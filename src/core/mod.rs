//! Core types and error handling shared by every plugin-release module.
//!
//! - [`ReleaseError`] - typed failure classes of a release run
//! - [`ErrorContext`] - operator-facing rendering with details and suggestions
//! - [`user_friendly_error`] - conversion used by the CLI entry point

pub mod error;

pub use error::{ErrorContext, ReleaseError, user_friendly_error};
