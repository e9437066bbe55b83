//! Global constants used throughout the plugin-release codebase.
//!
//! Registry layout, git defaults, and GitHub API parameters live here so that
//! magic strings stay discoverable and tests can refer to the same values.

use std::time::Duration;

/// Canonical JMeter plugins registry used when no upstream is configured.
pub const DEFAULT_UPSTREAM_REPOSITORY: &str = "https://github.com/undera/jmeter-plugins.git";

/// Directory the registry fork is cloned into when none is configured.
pub const DEFAULT_WORKDIR: &str = "jmeter-plugins";

/// Location of the JSON catalog files relative to the registry checkout root.
pub const CATALOG_DIR: &str = "site/dat/repo";

/// Commit identity used when no actor is supplied by the environment.
pub const DEFAULT_GIT_ACTOR: &str = "jmeter_plugin_deployer";

/// Remote-tracking ref merged into every release branch.
pub const UPSTREAM_MERGE_REF: &str = "upstream/master";

/// Branch of the upstream registry that pull requests target.
pub const DEFAULT_BASE_BRANCH: &str = "master";

/// Archive suffix stripped from asset names before version extraction.
pub const ARCHIVE_SUFFIX: &str = ".jar";

/// Version patterns applied when the configuration supplies none.
///
/// The first captures dotted versions with an optional qualifier
/// (`3.12.0`, `31.1-jre`, `2.0.0-SNAPSHOT`), the second a bare trailing
/// number (`9`).
pub const DEFAULT_VERSION_PATTERNS: &[&str] =
    &[r"-(\d+(?:\.\d+)+(?:-[A-Za-z0-9.]+)?)$", r"-(\d+)$"];

/// Base URL of the GitHub REST API.
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Pinned GitHub REST API version.
pub const GITHUB_API_VERSION: &str = "2022-11-28";

/// Default timeout for a single git command (5 minutes).
pub const GIT_COMMAND_TIMEOUT: Duration = Duration::from_secs(300);

/// Timeout for GitHub API requests (30 seconds).
pub const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
