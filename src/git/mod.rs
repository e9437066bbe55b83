//! Repository synchronization for the plugin registry fork
//!
//! Publishing a release means preparing a branch on a fork of the registry
//! repository that is up to date with upstream and carries the patched
//! catalog. This module drives that protocol through the system `git`
//! binary:
//!
//! 1. [`RepositorySynchronizer::init`] removes any stale checkout, clones
//!    the fork with a token-authenticated URL, configures the commit
//!    identity and the `origin`/`upstream` remotes.
//! 2. [`RepositorySynchronizer::checkout_release_branch`] creates the
//!    release branch and merges `upstream/master` into it. A failed fetch or
//!    merge is rolled back with `git merge --abort` before the error is
//!    reported, so the working copy is never left mid-merge.
//! 3. [`RepositorySynchronizer::commit_changes`] stages and commits
//!    everything in the checkout.
//! 4. [`RepositorySynchronizer::push_changes`] pushes the branch to the fork.
//!
//! The synchronizer is an explicit state machine ([`SyncState`]); calling a
//! step out of order fails with [`ReleaseError::InvalidTransition`].
//!
//! Commands are executed through the [`GitRunner`] capability.
//! [`SystemGit`] runs them as subprocesses via [`GitCommand`]; tests
//! substitute a recording runner and assert on the exact command sequence.
//!
//! # Credentials
//!
//! The token is spliced into remote URLs (`https://<token>@github.com/...`).
//! Every command line and every captured stderr is passed through
//! [`redact_credentials`] before it reaches a log line or an error message.

pub mod command_builder;


use anyhow::{Context, Result};
use regex::Regex;
use std::fmt;
use std::future::Future;
use std::path::Path;
use tracing::{debug, info, warn};

pub use command_builder::{GitCommand, GitCommandOutput};

use crate::constants::{DEFAULT_GIT_ACTOR, UPSTREAM_MERGE_REF};
use crate::core::ReleaseError;
use crate::utils::platform::{command_exists, get_git_command};
use crate::utils::remove_dir_if_exists;

/// Extracts `owner/repo` from a GitHub HTTPS clone URL.
///
/// Only `https://github.com/<owner>/<repo>.git` is accepted; SSH URLs, URLs
/// without the `.git` suffix and URLs that already carry credentials are
/// rejected.
///
/// # Errors
///
/// Returns [`ReleaseError::InvalidRepositoryUrl`] for any other shape.
///
/// # Examples
///
/// ```rust
/// use plugin_release::git::extract_owner_and_repo;
///
/// let slug = extract_owner_and_repo("https://github.com/acme/widget.git").unwrap();
/// assert_eq!(slug, "acme/widget");
/// assert!(extract_owner_and_repo("git@github.com:acme/widget.git").is_err());
/// ```
pub fn extract_owner_and_repo(url: &str) -> Result<String> {
    let re = Regex::new(r"^https://github\.com/([^/]+)/([^/]+)\.git$")?;
    let captures = re.captures(url).ok_or_else(|| ReleaseError::InvalidRepositoryUrl {
        url: strip_auth_from_url(url),
    })?;

    Ok(format!("{}/{}", &captures[1], &captures[2]))
}

/// Builds the token-authenticated form of a GitHub clone URL.
///
/// # Errors
///
/// Returns [`ReleaseError::InvalidRepositoryUrl`] if `url` is not a GitHub
/// HTTPS clone URL.
pub fn token_authenticated_url(url: &str, token: &str) -> Result<String> {
    let slug = extract_owner_and_repo(url)?;
    Ok(format!("https://{token}@github.com/{slug}.git"))
}

/// Removes the userinfo part (`user:token@`) from an HTTP(S) URL.
///
/// Non-HTTP URLs and URLs without credentials are returned unchanged.
#[must_use]
pub fn strip_auth_from_url(url: &str) -> String {
    let protocol_end = if url.starts_with("https://") {
        "https://".len()
    } else if url.starts_with("http://") {
        "http://".len()
    } else {
        return url.to_string();
    };

    let rest = &url[protocol_end..];
    match (rest.find('@'), rest.find('/')) {
        (Some(at_pos), Some(slash)) if at_pos < slash => {
            format!("{}{}", &url[..protocol_end], &rest[at_pos + 1..])
        }
        (Some(at_pos), None) => format!("{}{}", &url[..protocol_end], &rest[at_pos + 1..]),
        _ => url.to_string(),
    }
}

/// Applies [`strip_auth_from_url`] to every URL embedded in free text.
///
/// Used on command lines and git's stderr, which may echo remote URLs.
#[must_use]
pub fn redact_credentials(text: &str) -> String {
    text.split_inclusive(char::is_whitespace)
        .map(|word| {
            let trimmed = word.trim_end();
            let trailing = &word[trimmed.len()..];
            match trimmed.find("http") {
                Some(start) => {
                    let (prefix, candidate) = trimmed.split_at(start);
                    // git quotes URLs in messages: "fatal: repository 'https://...' not found"
                    let end = candidate.find(['\'', '"']).unwrap_or(candidate.len());
                    let (url, suffix) = candidate.split_at(end);
                    format!("{prefix}{}{suffix}{trailing}", strip_auth_from_url(url))
                }
                None => word.to_string(),
            }
        })
        .collect()
}

/// Capability to execute a git command.
///
/// The synchronizer never spawns processes itself; it hands fully built
/// [`GitCommand`]s to a runner. Implementations must run commands one at a
/// time and report a non-zero exit status as an error.
pub trait GitRunner: Send + Sync {
    /// Runs `command` to completion.
    fn run(&self, command: GitCommand) -> impl Future<Output = Result<()>> + Send;

    /// Checks that the runner can execute git at all.
    fn ensure_available(&self) -> Result<()> {
        Ok(())
    }
}

/// [`GitRunner`] backed by the system `git` executable.
///
/// Every command runs with the default [`crate::constants::GIT_COMMAND_TIMEOUT`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemGit;

impl SystemGit {
    /// Creates a runner for the system git.
    pub const fn new() -> Self {
        Self
    }
}

impl GitRunner for SystemGit {
    fn run(&self, command: GitCommand) -> impl Future<Output = Result<()>> + Send {
        // Fail instead of waiting for credentials on a terminal
        command.env("GIT_TERMINAL_PROMPT", "0").execute_success()
    }

    fn ensure_available(&self) -> Result<()> {
        if command_exists(get_git_command()) {
            Ok(())
        } else {
            Err(ReleaseError::GitNotFound.into())
        }
    }
}

/// Progress of a [`RepositorySynchronizer`] through the release protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Nothing has been done yet
    Uninitialized,
    /// The fork has been cloned
    Cloned,
    /// Identity and remotes are configured
    Configured,
    /// The release branch exists and is checked out
    BranchCreated,
    /// Upstream has been merged into the release branch
    Merged,
    /// The catalog change is committed
    Committed,
    /// The release branch is pushed to the fork
    Pushed,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Cloned => "cloned",
            Self::Configured => "configured",
            Self::BranchCreated => "branch-created",
            Self::Merged => "merged",
            Self::Committed => "committed",
            Self::Pushed => "pushed",
        };
        f.write_str(name)
    }
}

/// Inputs of the synchronization protocol.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// HTTPS clone URL of the registry fork
    pub forked_repository: String,
    /// HTTPS clone URL of the canonical registry
    pub upstream_repository: String,
    /// Token spliced into both remote URLs
    pub token: String,
    /// Plugin artifact name; upper-cased into the branch name
    pub artifact_name: String,
    /// Commit author; [`DEFAULT_GIT_ACTOR`] when absent
    pub actor: Option<String>,
    /// Plugin repository name, preferred over the artifact name in commit messages
    pub repository_name: Option<String>,
}

impl SyncSettings {
    fn actor(&self) -> &str {
        self.actor.as_deref().filter(|a| !a.is_empty()).unwrap_or(DEFAULT_GIT_ACTOR)
    }
}

/// Drives the clone, branch, merge, commit and push sequence on a registry fork.
pub struct RepositorySynchronizer<G> {
    git: G,
    settings: SyncSettings,
    state: SyncState,
}

impl<G: GitRunner> RepositorySynchronizer<G> {
    /// Creates a synchronizer in the [`SyncState::Uninitialized`] state.
    pub const fn new(git: G, settings: SyncSettings) -> Self {
        Self {
            git,
            settings,
            state: SyncState::Uninitialized,
        }
    }

    /// Current protocol state.
    #[must_use]
    pub const fn state(&self) -> SyncState {
        self.state
    }

    /// The git runner.
    pub const fn runner(&self) -> &G {
        &self.git
    }

    /// Release branch name: upper-cased artifact name, a dash and the version.
    ///
    /// `foo-bar` with version `1.2.3` gives `FOO-BAR-1.2.3`.
    #[must_use]
    pub fn branch_name(&self, version: &str) -> String {
        format!("{}-{}", self.settings.artifact_name.to_uppercase(), version)
    }

    /// Commit message (also the pull request title): `<name> v<version> release`.
    #[must_use]
    pub fn commit_message(&self, version: &str) -> String {
        let name = self
            .settings
            .repository_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.settings.artifact_name);
        format!("{name} v{version} release")
    }

    /// Clones the fork into `dir` and configures identity and remotes.
    ///
    /// Any existing directory at `dir` is deleted first.
    ///
    /// # Errors
    ///
    /// - [`ReleaseError::CloneFailed`] if the clone fails; nothing else runs
    /// - [`ReleaseError::GitConfigFailed`] naming the step for configuration failures
    /// - [`ReleaseError::InvalidTransition`] unless uninitialized
    pub async fn init(&mut self, dir: &Path) -> Result<()> {
        self.expect_state("initialize", SyncState::Uninitialized)?;

        let fork_url =
            token_authenticated_url(&self.settings.forked_repository, &self.settings.token)?;
        let upstream_url =
            token_authenticated_url(&self.settings.upstream_repository, &self.settings.token)?;

        remove_dir_if_exists(dir).await?;

        info!("Cloning {} into {}", self.settings.forked_repository, dir.display());
        self.git
            .run(GitCommand::clone(&fork_url, dir).with_context("clone fork"))
            .await
            .with_context(|| ReleaseError::CloneFailed {
                url: strip_auth_from_url(&self.settings.forked_repository),
            })?;
        self.state = SyncState::Cloned;

        let actor = self.settings.actor().to_string();
        let email = format!("{actor}@users.noreply.github.com");
        let steps = [
            ("set git user.name", GitCommand::config_local("user.name", &actor)),
            ("set git user.email", GitCommand::config_local("user.email", &email)),
            ("set origin remote URL", GitCommand::set_remote_url("origin", &fork_url)),
            ("add upstream remote", GitCommand::add_remote("upstream", &upstream_url)),
        ];
        for (step, command) in steps {
            self.git
                .run(command.current_dir(dir).with_context(step))
                .await
                .with_context(|| ReleaseError::GitConfigFailed {
                    step: step.to_string(),
                    directory: dir.display().to_string(),
                })?;
        }
        self.state = SyncState::Configured;

        debug!("Repository configured for actor {}", actor);
        Ok(())
    }

    /// Creates the release branch for `version` and merges upstream into it.
    ///
    /// Returns the branch name.
    ///
    /// # Errors
    ///
    /// - [`ReleaseError::BranchCheckoutFailed`] if `checkout -b` fails
    /// - [`ReleaseError::UpstreamUpdateFailed`] if fetching or merging
    ///   upstream fails; `git merge --abort` has run by then
    /// - [`ReleaseError::InvalidTransition`] unless configured
    pub async fn checkout_release_branch(&mut self, version: &str, dir: &Path) -> Result<String> {
        self.expect_state("check out the release branch", SyncState::Configured)?;

        let branch = self.branch_name(version);
        info!("Creating release branch {}", branch);

        self.git
            .run(GitCommand::checkout_new_branch(&branch).current_dir(dir))
            .await
            .with_context(|| ReleaseError::BranchCheckoutFailed {
                branch: branch.clone(),
                directory: dir.display().to_string(),
            })?;
        self.state = SyncState::BranchCreated;

        if let Err(e) = self.merge_upstream(dir).await {
            self.abort_merge(dir).await;
            return Err(e.context(ReleaseError::UpstreamUpdateFailed {
                branch,
            }));
        }
        self.state = SyncState::Merged;

        Ok(branch)
    }

    /// Stages everything in `dir` and commits it as the release commit.
    ///
    /// # Errors
    ///
    /// - [`ReleaseError::CommitFailed`]; git's output is only logged
    /// - [`ReleaseError::InvalidTransition`] unless upstream was merged
    pub async fn commit_changes(&mut self, version: &str, dir: &Path) -> Result<()> {
        self.expect_state("commit changes", SyncState::Merged)?;

        let message = self.commit_message(version);
        for command in [GitCommand::add("."), GitCommand::commit(&message)] {
            self.git.run(command.current_dir(dir)).await.map_err(|e| {
                debug!("Commit step failed: {:#}", e);
                ReleaseError::CommitFailed
            })?;
        }
        self.state = SyncState::Committed;

        info!("Committed \"{}\"", message);
        Ok(())
    }

    /// Pushes `branch` to `origin` and sets it as upstream.
    ///
    /// # Errors
    ///
    /// - [`ReleaseError::PushFailed`]; git's output is only logged
    /// - [`ReleaseError::InvalidTransition`] unless committed
    pub async fn push_changes(&mut self, branch: &str, dir: &Path) -> Result<()> {
        self.expect_state("push changes", SyncState::Committed)?;

        self.git
            .run(GitCommand::push_upstream("origin", branch).current_dir(dir))
            .await
            .map_err(|e| {
                debug!("Push failed: {:#}", e);
                ReleaseError::PushFailed {
                    branch: branch.to_string(),
                }
            })?;
        self.state = SyncState::Pushed;

        info!("Pushed {} to origin", branch);
        Ok(())
    }

    async fn merge_upstream(&self, dir: &Path) -> Result<()> {
        self.git.run(GitCommand::fetch_remote("upstream").current_dir(dir)).await?;
        self.git.run(GitCommand::merge_unrelated(UPSTREAM_MERGE_REF).current_dir(dir)).await
    }

    async fn abort_merge(&self, dir: &Path) {
        if let Err(e) = self.git.run(GitCommand::merge_abort().current_dir(dir)).await {
            // Nothing to abort when the fetch failed; the original error is reported
            warn!("git merge --abort failed: {:#}", e);
        }
    }

    fn expect_state(&self, operation: &str, expected: SyncState) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ReleaseError::InvalidTransition {
                operation: operation.to_string(),
                expected: expected.to_string(),
                actual: self.state.to_string(),
            }
            .into())
        }
    }
}
