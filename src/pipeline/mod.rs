//! End-to-end release publication
//!
//! [`ReleasePipeline::run`] performs one publication, strictly in order:
//!
//! 1. clone and configure the registry fork
//! 2. fetch the latest release of the plugin repository
//! 3. build the release record from its assets and the catalog
//! 4. append the record to the plugin's catalog file
//! 5. create the release branch and merge upstream into it
//! 6. commit and push the branch to the fork
//! 7. optionally open the pull request against upstream
//!
//! Any failure stops the run; nothing is retried.

use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

use crate::catalog::CatalogRepository;
use crate::config::ReleaseConfig;
use crate::constants::CATALOG_DIR;
use crate::core::ReleaseError;
use crate::git::{GitRunner, RepositorySynchronizer};
use crate::github::{PullRequest, ReleaseHost, RepositoryRef};
use crate::models::Release;
use crate::release::ReleaseBuilder;

/// Result of a successful publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    /// Catalog ID of the published plugin
    pub plugin_id: String,
    /// Published version, the release tag without a leading `v`
    pub version: String,
    /// Release branch pushed to the fork
    pub branch: String,
    /// Catalog file the version was added to
    pub catalog_file: PathBuf,
    /// URL of the opened pull request, if one was requested
    pub pull_request: Option<String>,
}

/// Wires the hosting client, metadata builder and synchronizer together.
pub struct ReleasePipeline<H, G> {
    config: ReleaseConfig,
    host: H,
    synchronizer: RepositorySynchronizer<G>,
}

impl<H: ReleaseHost, G: GitRunner> ReleasePipeline<H, G> {
    /// Creates a pipeline for `config` using the given host and git runner.
    pub fn new(config: ReleaseConfig, host: H, git: G) -> Self {
        let synchronizer = RepositorySynchronizer::new(git, config.sync_settings());
        Self {
            config,
            host,
            synchronizer,
        }
    }

    /// Runs the publication.
    ///
    /// # Errors
    ///
    /// Returns the first failure of any step, see [`ReleaseError`] for the classes.
    pub async fn run(mut self) -> Result<PublishOutcome> {
        self.synchronizer.runner().ensure_available()?;

        let workdir = self.config.workdir.clone();
        self.synchronizer.init(&workdir).await?;

        let release = self.host.latest_release(&self.config.plugin_repository).await?;
        let version = release.version().to_string();
        let changes = self.changes_for(&release)?;
        info!("Publishing {} v{}", self.config.plugin.plugin_id, version);

        let catalog = CatalogRepository::new(workdir.join(CATALOG_DIR));
        let record =
            ReleaseBuilder::new(&self.config.plugin, &release.assets, &catalog, changes.as_str())
                .build()
                .await?;
        let catalog_file =
            catalog.add_release(&self.config.plugin.plugin_id, &version, record).await?;

        let branch = self.synchronizer.checkout_release_branch(&version, &workdir).await?;
        self.synchronizer.commit_changes(&version, &workdir).await?;
        self.synchronizer.push_changes(&branch, &workdir).await?;

        let pull_request = if self.config.open_pull_request {
            Some(self.open_pull_request(&version, &branch, changes).await?)
        } else {
            info!("Skipping pull request for {}", branch);
            None
        };

        Ok(PublishOutcome {
            plugin_id: self.config.plugin.plugin_id.clone(),
            version,
            branch,
            catalog_file,
            pull_request,
        })
    }

    /// Configured changelog text, falling back to the release notes.
    fn changes_for(&self, release: &Release) -> Result<String> {
        if let Some(changes) = &self.config.changes {
            return Ok(changes.clone());
        }
        match release.notes() {
            Some(notes) => {
                info!("Using notes of release {} as changelog", release.tag_name);
                Ok(notes.to_string())
            }
            None => Err(ReleaseError::ConfigError {
                message: format!(
                    "CHANGES is not set in the environment or empty and release {} has no notes",
                    release.tag_name
                ),
            }
            .into()),
        }
    }

    async fn open_pull_request(&self, version: &str, branch: &str, body: String) -> Result<String> {
        let fork = RepositoryRef::from_clone_url(&self.config.forked_repository)?;
        let upstream = RepositoryRef::from_clone_url(&self.config.upstream_repository)?;

        let request = PullRequest {
            title: self.synchronizer.commit_message(version),
            head: format!("{}:{}", fork.owner, branch),
            base: self.config.base_branch.clone(),
            body,
        };
        let url = self.host.open_pull_request(&upstream, &request).await?;
        info!("Opened pull request {}", url);
        Ok(url)
    }
}
