//! Test utilities for plugin-release
//!
//! Shared by unit tests and the integration suite (through the `test-utils`
//! feature):
//!
//! - [`RecordingGit`] records every git command instead of running it and can
//!   be told to fail selected commands
//! - [`StaticHost`] serves a fixed release and records pull requests
//! - [`CatalogFixture`] writes registry catalog files
//! - [`init_test_logging`] routes `tracing` output to the test writer
//!
//! # Example
//!
//! ```rust,no_run
//! use plugin_release::git::{GitCommand, GitRunner};
//! use plugin_release::test_utils::RecordingGit;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let git = RecordingGit::new().fail_on(&["fetch"]);
//! assert!(git.run(GitCommand::fetch_remote("upstream")).await.is_err());
//! assert_eq!(git.command_lines(), vec!["fetch upstream"]);
//! # Ok(())
//! # }
//! ```

pub mod fakes;
pub mod fixtures;

pub use fakes::{RecordedCall, RecordingGit, StaticHost};
pub use fixtures::CatalogFixture;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. With `level` set that level is used,
/// otherwise `RUST_LOG` is honoured; without either, logging stays off.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true) // Show module targets like "git"
            .with_thread_ids(false)
            .try_init();
    });
}
