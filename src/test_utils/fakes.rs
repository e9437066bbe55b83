//! In-memory stand-ins for the git runner and the hosting API.

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::core::ReleaseError;
use crate::git::{GitCommand, GitRunner, redact_credentials};
use crate::github::{PullRequest, ReleaseHost, RepositoryRef};
use crate::models::{Release, ReleaseAsset};

type CloneHook = Arc<dyn Fn(&Path) -> Result<()> + Send + Sync>;

/// One git command seen by [`RecordingGit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// `-C` directory, if any
    pub dir: Option<PathBuf>,
    /// Arguments after `-C <dir>`
    pub args: Vec<String>,
}

impl RecordedCall {
    /// Arguments joined with single spaces, e.g. `"fetch upstream"`.
    pub fn line(&self) -> String {
        self.args.join(" ")
    }
}

/// [`GitRunner`] that records commands instead of executing them.
///
/// Clones share the same log, so a test can keep a handle while the
/// synchronizer owns another.
#[derive(Clone, Default)]
pub struct RecordingGit {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    failing: Arc<Vec<Vec<String>>>,
    on_clone: Option<CloneHook>,
}

impl RecordingGit {
    /// Runner on which every command succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every command whose arguments start with `prefix` fail.
    #[must_use]
    pub fn fail_on(mut self, prefix: &[&str]) -> Self {
        let mut failing = self.failing.as_ref().clone();
        failing.push(prefix.iter().map(|s| (*s).to_string()).collect());
        self.failing = Arc::new(failing);
        self
    }

    /// Runs `hook` with the target directory whenever a clone succeeds.
    ///
    /// Lets tests populate the "cloned" checkout.
    #[must_use]
    pub fn on_clone(
        mut self,
        hook: impl Fn(&Path) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.on_clone = Some(Arc::new(hook));
        self
    }

    /// Every recorded call, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded argument lines, in order.
    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(RecordedCall::line).collect()
    }

    fn should_fail(&self, args: &[String]) -> bool {
        self.failing.iter().any(|prefix| args.starts_with(prefix))
    }
}

impl GitRunner for RecordingGit {
    async fn run(&self, command: GitCommand) -> Result<()> {
        let call = RecordedCall {
            dir: command.working_dir().map(Path::to_path_buf),
            args: command.arguments().to_vec(),
        };
        self.calls.lock().unwrap().push(call.clone());

        if self.should_fail(&call.args) {
            return Err(ReleaseError::GitCommandError {
                operation: command.operation().to_string(),
                stderr: redact_credentials(&format!("simulated failure of `git {}`", call.line())),
            }
            .into());
        }

        if command.operation() == "clone" {
            if let (Some(hook), Some(target)) = (&self.on_clone, call.args.last()) {
                hook(Path::new(target))?;
            }
        }
        Ok(())
    }
}

/// [`ReleaseHost`] serving one fixed release.
#[derive(Debug, Clone)]
pub struct StaticHost {
    release: Release,
    pull_requests: Arc<Mutex<Vec<(RepositoryRef, PullRequest)>>>,
    pull_request_status: Option<u16>,
}

impl StaticHost {
    /// Serves a release tagged `tag_name` with the given notes and assets.
    pub fn new(tag_name: &str, body: Option<&str>, assets: Vec<ReleaseAsset>) -> Self {
        Self {
            release: Release {
                tag_name: tag_name.to_string(),
                body: body.map(str::to_string),
                assets,
            },
            pull_requests: Arc::default(),
            pull_request_status: None,
        }
    }

    /// Rejects pull requests with the given HTTP status.
    #[must_use]
    pub fn reject_pull_requests(mut self, status: u16) -> Self {
        self.pull_request_status = Some(status);
        self
    }

    /// Pull requests opened so far, with their target repository.
    pub fn pull_requests(&self) -> Vec<(RepositoryRef, PullRequest)> {
        self.pull_requests.lock().unwrap().clone()
    }
}

impl ReleaseHost for StaticHost {
    async fn latest_release(&self, _repository: &RepositoryRef) -> Result<Release> {
        Ok(self.release.clone())
    }

    async fn open_pull_request(
        &self,
        repository: &RepositoryRef,
        request: &PullRequest,
    ) -> Result<String> {
        if let Some(status) = self.pull_request_status {
            return Err(ReleaseError::GithubApiError {
                operation: format!("open pull request on {repository}"),
                status,
                message: "Validation Failed".to_string(),
            }
            .into());
        }

        let mut pull_requests = self.pull_requests.lock().unwrap();
        pull_requests.push((repository.clone(), request.clone()));
        Ok(format!("https://github.com/{repository}/pull/{}", pull_requests.len()))
    }
}
