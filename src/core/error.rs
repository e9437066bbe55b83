//! Error handling for plugin-release
//!
//! The error system follows two principles:
//! 1. **Strongly-typed errors** so code (and tests) can tell failure classes apart
//! 2. **User-friendly messages** with actionable suggestions for operators
//!
//! # Architecture
//!
//! - [`ReleaseError`] - Enumerated error types for every failure in a release run
//! - [`ErrorContext`] - Wrapper that adds details and suggestions for display
//!
//! Typed errors are attached to [`anyhow::Error`] values as context, so a
//! caller holding an `anyhow::Error` can still recover the class with
//! `downcast_ref::<ReleaseError>()`:
//!
//! ```rust,no_run
//! use plugin_release::core::ReleaseError;
//!
//! fn classify(error: &anyhow::Error) -> &'static str {
//!     match error.downcast_ref::<ReleaseError>() {
//!         Some(ReleaseError::BranchCheckoutFailed { .. }) => "branch",
//!         Some(ReleaseError::UpstreamUpdateFailed { .. }) => "upstream",
//!         _ => "other",
//!     }
//! }
//! ```
//!
//! # Error Categories
//!
//! - **Configuration**: [`ReleaseError::ConfigError`], [`ReleaseError::MissingToken`]
//! - **Parsing**: [`ReleaseError::InvalidVersionPattern`], [`ReleaseError::CatalogReadError`]
//! - **Lookup**: [`ReleaseError::PluginArtifactNotFound`], [`ReleaseError::PluginNotFound`]
//! - **Version control**: [`ReleaseError::GitCommandError`], [`ReleaseError::UpstreamUpdateFailed`], ...
//! - **URL format**: [`ReleaseError::InvalidRepositoryUrl`]
//! - **Hosting API**: [`ReleaseError::GithubApiError`]

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for release operations.
///
/// Each variant names one failure mode of the pipeline. Messages are written
/// for operators and never include raw tool output or credentials.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReleaseError {
    /// A required input is missing or invalid
    #[error("{message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },

    /// No access token could be resolved
    #[error("GITHUB_TOKEN is not available in the environment")]
    MissingToken,

    /// A user-supplied version pattern is not a valid regular expression
    #[error("Invalid version pattern [{pattern}]: {reason}")]
    InvalidVersionPattern {
        /// The offending pattern
        pattern: String,
        /// Why the regex engine rejected it
        reason: String,
    },

    /// A catalog file could not be read or parsed
    #[error("IO Error, not possible to read content of [{file}]")]
    CatalogReadError {
        /// Path of the catalog file
        file: String,
    },

    /// A catalog file could not be written back
    #[error("IO Error, not possible to write content of [{file}]")]
    CatalogWriteError {
        /// Path of the catalog file
        file: String,
    },

    /// No release asset starts with the configured artifact prefix
    #[error("No plugin artifact found in latest github release assets by prefix [{prefix}]")]
    PluginArtifactNotFound {
        /// The artifact-name prefix that was searched for
        prefix: String,
    },

    /// The plugin ID is absent from every catalog file
    #[error("Plugin ID={plugin_id} not found in any of [{}]", scanned.join(","))]
    PluginNotFound {
        /// The plugin ID that was searched for
        plugin_id: String,
        /// Every directory entry that was considered
        scanned: Vec<String>,
    },

    /// The plugin exists but has no recorded versions to inherit from
    #[error("Plugin ID={plugin_id} in {file} has no released versions")]
    EmptyVersionHistory {
        /// The plugin ID
        plugin_id: String,
        /// The catalog file holding the plugin
        file: String,
    },

    /// A repository URL does not have the `https://github.com/<owner>/<repo>.git` shape
    #[error(
        "Not possible to extract owner and repository name from [{url}]. \
         Try complying with the format: https://github.com/owner/repo.git"
    )]
    InvalidRepositoryUrl {
        /// The rejected URL (credentials stripped)
        url: String,
    },

    /// Git command exited unsuccessfully
    #[error("Git operation failed: {operation}")]
    GitCommandError {
        /// The git operation that failed (e.g. "clone", "fetch")
        operation: String,
        /// Error output from git with credentials removed, shown as details
        stderr: String,
    },

    /// Configuring identity or remotes of a fresh clone failed
    #[error("Failed to {step} in {directory}")]
    GitConfigFailed {
        /// The configuration step (e.g. "add upstream remote")
        step: String,
        /// The working copy directory
        directory: String,
    },

    /// Git executable not found
    #[error("Git is not installed or not found in PATH")]
    GitNotFound,

    /// Cloning the registry fork failed
    #[error("Failed to checkout repository: {url}")]
    CloneFailed {
        /// Fork URL with credentials stripped
        url: String,
    },

    /// Creating the release branch failed
    #[error("There was an issue while checking out new branch {branch} in directory {directory}")]
    BranchCheckoutFailed {
        /// The branch that could not be created
        branch: String,
        /// The working copy directory
        directory: String,
    },

    /// Fetching or merging upstream failed; the merge was aborted
    #[error("Problem while updating release branch {branch} with latest upstream changes")]
    UpstreamUpdateFailed {
        /// The release branch being updated
        branch: String,
    },

    /// Staging or committing failed
    #[error("There was an issue while staging and committing changes")]
    CommitFailed,

    /// Pushing the release branch failed
    #[error("There was a problem while pushing changes to new branch {branch} in origin")]
    PushFailed {
        /// The branch that could not be pushed
        branch: String,
    },

    /// A synchronizer operation was called out of order
    #[error("Cannot {operation} while repository is {actual}; expected {expected}")]
    InvalidTransition {
        /// The attempted operation
        operation: String,
        /// The state the operation requires
        expected: String,
        /// The state the synchronizer is in
        actual: String,
    },

    /// GitHub API call returned a non-success status
    #[error("GitHub API request failed: {operation} (HTTP {status})")]
    GithubApiError {
        /// The API operation (e.g. "fetch latest release")
        operation: String,
        /// HTTP status code
        status: u16,
        /// Response message, if GitHub supplied one
        message: String,
    },

    /// Generic error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

/// Error wrapper carrying operator-facing details and a suggestion.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: ReleaseError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: ReleaseError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error (shown in green).
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error (shown in yellow).
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error, details and suggestion to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] suitable for CLI display.
///
/// The outermost [`ReleaseError`] in the chain gets a tailored suggestion,
/// and the output of a failed git command beneath it is added to the
/// details. Anything else is reported with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(release_error) = error.downcast_ref::<ReleaseError>() {
        let mut context = create_error_context(release_error.clone());
        if let Some(output) = git_output(&error) {
            context.details = Some(match context.details {
                Some(details) => format!("{details}\ngit: {output}"),
                None => format!("git: {output}"),
            });
        }
        return context;
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        if io_error.kind() == std::io::ErrorKind::PermissionDenied {
            return ErrorContext::new(ReleaseError::Other {
                message: error.to_string(),
            })
            .with_suggestion("Check ownership and permissions of the working directory");
        }
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(ReleaseError::Other {
        message,
    })
}

/// Output of the innermost failed git command, if it printed anything.
fn git_output(error: &anyhow::Error) -> Option<String> {
    error.chain().find_map(|cause| match cause.downcast_ref::<ReleaseError>() {
        Some(ReleaseError::GitCommandError {
            stderr,
            ..
        }) if !stderr.trim().is_empty() => Some(stderr.trim().to_string()),
        _ => None,
    })
}

fn create_error_context(error: ReleaseError) -> ErrorContext {
    match &error {
        ReleaseError::ConfigError { .. } => ErrorContext::new(error)
            .with_suggestion("Pass the value as a flag, set the matching environment variable, or add it to the --config file"),

        ReleaseError::MissingToken => ErrorContext::new(error)
            .with_suggestion("Export GITHUB_TOKEN with a token that can push to the fork and open pull requests upstream"),

        ReleaseError::InvalidVersionPattern { .. } => ErrorContext::new(error)
            .with_suggestion("Fix the regular expression; each version pattern must capture the version as group 1")
            .with_details("Version patterns are compiled once before any asset is parsed"),

        ReleaseError::CatalogReadError { .. } => ErrorContext::new(error)
            .with_suggestion("Check that the registry checkout is complete and the catalog file is a JSON array of plugins"),

        ReleaseError::PluginArtifactNotFound { prefix } => {
            let suggestion = format!(
                "Attach an asset whose file name starts with '{prefix}' to the release, or fix the plugin artifact name"
            );
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        ReleaseError::PluginNotFound { .. } => ErrorContext::new(error)
            .with_suggestion("Verify the plugin ID; a plugin must already be registered upstream before releases can be published")
            .with_details("Only *.json files in the registry catalog directory are searched"),

        ReleaseError::InvalidRepositoryUrl { .. } => ErrorContext::new(error)
            .with_suggestion("Use the HTTPS clone URL, for example https://github.com/owner/repo.git"),

        ReleaseError::GitNotFound => ErrorContext::new(error)
            .with_suggestion("Install git from https://git-scm.com/ or your package manager"),

        ReleaseError::GitConfigFailed { .. } => ErrorContext::new(error)
            .with_suggestion("Check that the fork was cloned completely and the directory is writable, then rerun"),

        ReleaseError::CloneFailed { .. } => ErrorContext::new(error)
            .with_suggestion("Check the fork URL and that the token grants access to it"),

        ReleaseError::UpstreamUpdateFailed { .. } => ErrorContext::new(error)
            .with_suggestion("Resolve the divergence between the fork and upstream manually, then rerun")
            .with_details("The merge was aborted so the working copy is left without conflict markers"),

        ReleaseError::PushFailed { .. } => ErrorContext::new(error)
            .with_suggestion("Check that the token has write access to the fork and the branch does not already exist"),

        ReleaseError::GithubApiError { message, .. } => {
            let details = message.clone();
            ErrorContext::new(error)
                .with_details(details)
                .with_suggestion("Check GITHUB_REPOSITORY and the token scopes")
        }

        _ => ErrorContext::new(error),
    }
}
