//! `publish` command: run the full release pipeline.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::config::{ConfigInputs, ReleaseConfig, parse_config};
use crate::git::SystemGit;
use crate::github::GithubClient;
use crate::pipeline::{PublishOutcome, ReleasePipeline};

/// Publish the latest release of a plugin into the registry.
///
/// Every input can be given as a flag or through the environment variable
/// shown in `--help`; `GITHUB_TOKEN`, `GITHUB_ACTOR` and `GITHUB_REPOSITORY`
/// are the variables GitHub Actions provides.
#[derive(Args, Debug, Default)]
pub struct PublishCommand {
    /// HTTPS clone URL of your fork of the registry
    #[arg(long, env = "FORKED_REPOSITORY")]
    pub forked_repository: Option<String>,

    /// HTTPS clone URL of the upstream registry
    #[arg(long, env = "UPSTREAM_REPOSITORY")]
    pub upstream_repository: Option<String>,

    /// File-name prefix of the plugin's own release asset
    #[arg(long, env = "PLUGIN_ARTIFACT_NAME")]
    pub plugin_artifact_name: Option<String>,

    /// Catalog ID of the plugin, e.g. `jpgc-demo`
    #[arg(long, env = "PLUGIN_ID")]
    pub plugin_id: Option<String>,

    /// Changelog of the new version; defaults to the release notes
    #[arg(long, env = "CHANGES")]
    pub changes: Option<String>,

    /// Asset name prefixes to leave out of `libs`, comma separated
    #[arg(long, env = "IGNORE_DEPENDENCIES", value_delimiter = ',')]
    pub ignore_dependencies: Vec<String>,

    /// Version pattern; repeat for several, tried in order
    #[arg(long = "version-pattern", env = "VERSION_PATTERNS", value_delimiter = '\n')]
    pub version_patterns: Vec<String>,

    /// GitHub token used for cloning, pushing and the API
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Commit author name
    #[arg(long, env = "GITHUB_ACTOR")]
    pub actor: Option<String>,

    /// Plugin repository whose latest release is published (`owner/repo`)
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub plugin_repository: Option<String>,

    /// Directory to clone the fork into (deleted first if present)
    #[arg(long, env = "WORKDIR")]
    pub workdir: Option<PathBuf>,

    /// Upstream branch the pull request targets
    #[arg(long, env = "BASE_BRANCH")]
    pub base_branch: Option<String>,

    /// Stop after pushing the release branch
    #[arg(long)]
    pub no_pull_request: bool,
}

impl PublishCommand {
    /// Runs the pipeline against GitHub and the system git.
    pub async fn execute(self, config_path: Option<&Path>) -> Result<()> {
        let config = self.resolve_config(config_path)?;
        let host = GithubClient::new(config.github_token.clone())?;

        let outcome = ReleasePipeline::new(config, host, SystemGit::new()).run().await?;
        print_outcome(&outcome);
        Ok(())
    }

    /// Merges flags and environment over the optional configuration file.
    pub fn resolve_config(self, config_path: Option<&Path>) -> Result<ReleaseConfig> {
        let file_inputs = match config_path {
            Some(path) => parse_config::<ConfigInputs>(path)?,
            None => ConfigInputs::default(),
        };
        ReleaseConfig::from_inputs(self.into_inputs().or(file_inputs))
    }

    fn into_inputs(self) -> ConfigInputs {
        ConfigInputs {
            forked_repository: self.forked_repository,
            upstream_repository: self.upstream_repository,
            plugin_artifact_name: self.plugin_artifact_name,
            plugin_id: self.plugin_id,
            changes: self.changes,
            ignore_dependencies: Some(self.ignore_dependencies),
            version_patterns: Some(self.version_patterns),
            github_token: self.github_token,
            actor: self.actor,
            plugin_repository: self.plugin_repository,
            workdir: self.workdir,
            open_pull_request: self.no_pull_request.then_some(false),
            base_branch: self.base_branch,
        }
    }
}

fn print_outcome(outcome: &PublishOutcome) {
    println!(
        "{} Published {} v{}",
        "✓".green(),
        outcome.plugin_id.bold(),
        outcome.version
    );
    println!("  Catalog: {}", outcome.catalog_file.display());
    println!("  Branch:  {}", outcome.branch);
    match &outcome.pull_request {
        Some(url) => println!("  Pull request: {}", url.cyan()),
        None => println!("  Pull request: {}", "skipped".dimmed()),
    }
}
