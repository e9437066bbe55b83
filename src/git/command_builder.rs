//! Type-safe Git command builder for consistent command execution
//!
//! Every git invocation of the release pipeline is described by a
//! [`GitCommand`]: arguments, working directory (passed as `-C <dir>`),
//! environment, timeout and a logging context. The same value is executed by
//! [`SystemGit`](super::SystemGit) and inspected by test runners, so the
//! exact command line is part of the tested contract.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use super::redact_credentials;
use crate::constants::GIT_COMMAND_TIMEOUT;
use crate::core::ReleaseError;
use crate::utils::platform::get_git_command;

/// Builder for constructing and executing Git commands with consistent error handling.
///
/// # Examples
///
/// ```rust,no_run
/// use plugin_release::git::command_builder::GitCommand;
///
/// # async fn example() -> anyhow::Result<()> {
/// GitCommand::fetch_remote("upstream")
///     .current_dir("jmeter-plugins")
///     .with_context("release branch")
///     .execute_success()
///     .await?;
/// # Ok(())
/// # }
/// ```
///
/// # Default Configuration
///
/// - **Timeout**: 5 minutes
/// - **Working directory**: current process directory
/// - **Environment**: inherited, plus any [`env`](Self::env) overrides
#[derive(Debug, Clone)]
pub struct GitCommand {
    /// Command arguments passed to git (without the `-C <dir>` prefix)
    args: Vec<String>,

    /// Working directory, passed as `-C <dir>`
    current_dir: Option<PathBuf>,

    /// Environment variables to set for the git process
    env_vars: Vec<(String, String)>,

    /// Maximum duration to wait for completion
    timeout_duration: Duration,

    /// Optional context string for log messages
    context: Option<String>,
}

impl Default for GitCommand {
    fn default() -> Self {
        Self {
            args: Vec::new(),
            current_dir: None,
            env_vars: Vec::new(),
            timeout_duration: GIT_COMMAND_TIMEOUT,
            context: None,
        }
    }
}

impl GitCommand {
    /// Creates a new Git command builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the working directory; emitted as `-C <dir>` ahead of the arguments.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Adds a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Adds multiple arguments, in order.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets an environment variable for the git process.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.push((key.into(), value.into()));
        self
    }

    /// Set a context included in debug log messages
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Arguments after the optional `-C <dir>` prefix.
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Working directory, if one was set.
    #[must_use]
    pub fn working_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    /// The git subcommand (first argument), e.g. `"clone"`.
    #[must_use]
    pub fn operation(&self) -> &str {
        self.args.first().map_or("unknown", String::as_str)
    }

    /// Full argument list as passed to the git executable.
    #[must_use]
    pub fn full_args(&self) -> Vec<String> {
        let mut full_args = Vec::with_capacity(self.args.len() + 2);
        if let Some(ref dir) = self.current_dir {
            full_args.push("-C".to_string());
            full_args.push(dir.display().to_string());
        }
        full_args.extend(self.args.iter().cloned());
        full_args
    }

    /// Command line with credentials removed, for logging.
    #[must_use]
    pub fn display_line(&self) -> String {
        redact_credentials(&format!("{} {}", get_git_command(), self.full_args().join(" ")))
    }

    /// Execute the command and return its output.
    ///
    /// # Errors
    ///
    /// - [`ReleaseError::GitNotFound`] if the git executable cannot be spawned
    /// - [`ReleaseError::GitCommandError`] on a non-zero exit status or timeout;
    ///   credentials are removed from the captured stderr
    pub async fn execute(self) -> Result<GitCommandOutput> {
        let start = std::time::Instant::now();
        let full_args = self.full_args();
        let display_line = self.display_line();
        let operation = self.operation().to_string();

        let mut cmd = Command::new(get_git_command());
        cmd.args(&full_args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        for (key, value) in &self.env_vars {
            tracing::trace!(target: "git", "Setting env var: {}={}", key, value);
            cmd.env(key, value);
        }

        if let Some(ref ctx) = self.context {
            tracing::debug!(target: "git", "({}) Executing command: {}", ctx, display_line);
        } else {
            tracing::debug!(target: "git", "Executing command: {}", display_line);
        }

        let output_future = cmd.output();

        let duration = self.timeout_duration;
        let Ok(output) = timeout(duration, output_future).await else {
            tracing::warn!(
                target: "git",
                "Command timed out after {} seconds: {}",
                duration.as_secs(),
                display_line
            );
            return Err(ReleaseError::GitCommandError {
                operation,
                stderr: format!(
                    "Git command timed out after {} seconds. This may indicate network \
                     problems or an authentication prompt waiting for input",
                    duration.as_secs()
                ),
            }
            .into());
        };

        let output = match output {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ReleaseError::GitNotFound.into());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to execute {display_line}"));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = redact_credentials(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            tracing::debug!(
                target: "git",
                "Command failed with exit code: {:?}",
                output.status.code()
            );
            if !stderr.is_empty() {
                tracing::debug!(target: "git", "Error: {}", stderr.trim());
            }

            return Err(ReleaseError::GitCommandError {
                operation,
                stderr: if stderr.is_empty() {
                    redact_credentials(&stdout)
                } else {
                    stderr
                },
            }
            .into());
        }

        if !stdout.is_empty() {
            tracing::debug!(target: "git", "{}", stdout.trim());
        }
        if !stderr.is_empty() {
            tracing::debug!(target: "git", "{}", stderr.trim());
        }

        let elapsed = start.elapsed();
        if elapsed.as_secs() > 1 {
            tracing::info!(target: "git::perf", "Git {} took {:.2}s", operation, elapsed.as_secs_f64());
        }

        Ok(GitCommandOutput {
            stdout,
            stderr,
        })
    }

    /// Execute the command and only check for success
    pub async fn execute_success(self) -> Result<()> {
        self.execute().await?;
        Ok(())
    }
}

/// Output from a Git command
#[derive(Debug)]
pub struct GitCommandOutput {
    /// Standard output from the Git command
    pub stdout: String,
    /// Standard error output, credentials removed
    pub stderr: String,
}

// Convenience builders for the release workflow

impl GitCommand {
    /// `git clone <url> <target>`
    pub fn clone(url: &str, target: impl AsRef<Path>) -> Self {
        Self::new().args(["clone", url]).arg(target.as_ref().display().to_string())
    }

    /// `git config --local <key> <value>`
    pub fn config_local(key: &str, value: &str) -> Self {
        Self::new().args(["config", "--local", key, value])
    }

    /// `git remote set-url <remote> <url>`
    pub fn set_remote_url(remote: &str, url: &str) -> Self {
        Self::new().args(["remote", "set-url", remote, url])
    }

    /// `git remote add <remote> <url>`
    pub fn add_remote(remote: &str, url: &str) -> Self {
        Self::new().args(["remote", "add", remote, url])
    }

    /// `git checkout -b <branch>`
    pub fn checkout_new_branch(branch: &str) -> Self {
        Self::new().args(["checkout", "-b", branch])
    }

    /// `git fetch <remote>`
    pub fn fetch_remote(remote: &str) -> Self {
        Self::new().args(["fetch", remote])
    }

    /// `git merge <reference> --allow-unrelated-histories`
    pub fn merge_unrelated(reference: &str) -> Self {
        Self::new().args(["merge", reference, "--allow-unrelated-histories"])
    }

    /// `git merge --abort`
    pub fn merge_abort() -> Self {
        Self::new().args(["merge", "--abort"])
    }

    /// `git add <pathspec>`
    pub fn add(pathspec: &str) -> Self {
        Self::new().args(["add", pathspec])
    }

    /// `git commit -m <message>`
    pub fn commit(message: &str) -> Self {
        Self::new().args(["commit", "-m", message])
    }

    /// `git push <remote> -u <branch>`
    pub fn push_upstream(remote: &str, branch: &str) -> Self {
        Self::new().args(["push", remote, "-u", branch])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_args_prefix_working_dir() {
        let cmd = GitCommand::fetch_remote("upstream").current_dir("jmeter-plugins");
        assert_eq!(cmd.full_args(), vec!["-C", "jmeter-plugins", "fetch", "upstream"]);
        assert_eq!(cmd.arguments(), ["fetch".to_string(), "upstream".to_string()]);
        assert_eq!(cmd.operation(), "fetch");
    }

    #[test]
    fn test_display_line_hides_token() {
        let cmd = GitCommand::clone("https://ghp_secret@github.com/fork/repo.git", "jmeter-plugins");
        let line = cmd.display_line();
        assert!(!line.contains("ghp_secret"));
        assert!(line.contains("https://github.com/fork/repo.git"));
    }

    #[test]
    fn test_convenience_builders() {
        assert_eq!(
            GitCommand::merge_unrelated("upstream/master").arguments(),
            ["merge", "upstream/master", "--allow-unrelated-histories"].map(String::from)
        );
        assert_eq!(
            GitCommand::push_upstream("origin", "DEMO-1.0").arguments(),
            ["push", "origin", "-u", "DEMO-1.0"].map(String::from)
        );
        assert_eq!(
            GitCommand::config_local("user.name", "bot").arguments(),
            ["config", "--local", "user.name", "bot"].map(String::from)
        );
    }

    #[tokio::test]
    async fn test_failing_command_maps_to_git_command_error() {
        if !crate::utils::platform::command_exists(get_git_command()) {
            return;
        }
        let temp = tempfile::TempDir::new().unwrap();
        let err = GitCommand::new()
            .args(["rev-parse", "HEAD"])
            .current_dir(temp.path())
            .execute_success()
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReleaseError>(),
            Some(ReleaseError::GitCommandError { operation, .. }) if operation == "rev-parse"
        ));
    }
}
