//! plugin-release - publish plugin releases into the JMeter plugins registry
//!
//! The JMeter plugins registry is a git repository whose `site/dat/repo`
//! directory holds JSON catalog files, one array of plugin records each. A
//! plugin author publishes a new version by adding a version entry to their
//! plugin's record and sending a pull request upstream. This crate automates
//! that round trip from a GitHub release of the plugin.
//!
//! # Architecture Overview
//!
//! ```text
//! pipeline ──► git (clone, configure)
//!    │
//!    ├──────► github (latest release + assets)
//!    │
//!    ├──────► release ──► artifact (name/version parsing)
//!    │            └─────► catalog  (previous depends)
//!    │
//!    ├──────► catalog (append version, write file)
//!    │
//!    ├──────► git (branch, merge upstream, commit, push)
//!    │
//!    └──────► github (open pull request)
//! ```
//!
//! # Core Modules
//!
//! - [`artifact`] - Pattern-driven artifact name and version extraction
//! - [`release`] - Release record construction from release assets
//! - [`catalog`] - Registry catalog model, lookup and atomic rewrite
//! - [`git`] - Repository synchronizer state machine over the system git
//! - [`github`] - GitHub REST client for releases and pull requests
//! - [`pipeline`] - End-to-end publication
//!
//! ## Supporting Modules
//! - [`cli`] - Command-line interface
//! - [`config`] - Layered configuration (flags, environment, TOML file)
//! - [`core`] - Error types and user-facing error rendering
//! - [`models`] - GitHub release payload types
//! - [`utils`] - File system and platform helpers
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Publish the latest release of the current repository
//! plugin-release publish --forked-repository https://github.com/acme/jmeter-plugins.git \
//!     --plugin-artifact-name jmeter-plugins-demo --plugin-id jpgc-demo \
//!     --ignore-dependencies ApacheJMeter,jmeter-plugins-cmn
//!
//! # Push the release branch without opening a pull request
//! plugin-release publish --no-pull-request
//!
//! # Inspect how asset names are decomposed
//! plugin-release parse json-path-2.9.0.jar --format json
//! ```

// Core functionality modules
pub mod artifact;
pub mod catalog;
pub mod pipeline;
pub mod release;

// Git and hosting integration
pub mod git;
pub mod github;

// Supporting modules
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod models;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
