//! Release configuration: layered inputs and the validated run configuration.

use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

use crate::artifact::VersionPatterns;
use crate::constants::{
    DEFAULT_BASE_BRANCH, DEFAULT_UPSTREAM_REPOSITORY, DEFAULT_VERSION_PATTERNS, DEFAULT_WORKDIR,
};
use crate::core::ReleaseError;
use crate::git::{SyncSettings, extract_owner_and_repo};
use crate::github::RepositoryRef;

/// One layer of raw configuration values.
///
/// Both the `--config` TOML file and the command line (flags and
/// environment variables) produce a `ConfigInputs`; [`ConfigInputs::or`]
/// stacks them with the command line on top. Empty strings count as unset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigInputs {
    /// HTTPS clone URL of the registry fork
    pub forked_repository: Option<String>,
    /// HTTPS clone URL of the canonical registry
    pub upstream_repository: Option<String>,
    /// File-name prefix identifying the plugin's own release asset
    pub plugin_artifact_name: Option<String>,
    /// Catalog ID of the plugin
    pub plugin_id: Option<String>,
    /// Changelog text for the new version
    pub changes: Option<String>,
    /// Asset name prefixes excluded from the library map
    pub ignore_dependencies: Option<Vec<String>>,
    /// Ordered version-extraction patterns
    pub version_patterns: Option<Vec<String>>,
    /// GitHub token; never read from the configuration file
    #[serde(skip)]
    pub github_token: Option<String>,
    /// Commit author name
    pub actor: Option<String>,
    /// `owner/repo` of the plugin repository whose release is published
    pub plugin_repository: Option<String>,
    /// Directory the registry fork is cloned into
    pub workdir: Option<PathBuf>,
    /// Whether to open the upstream pull request after pushing
    pub open_pull_request: Option<bool>,
    /// Upstream branch targeted by the pull request
    pub base_branch: Option<String>,
}

impl ConfigInputs {
    /// Fills every unset value of `self` from `lower`.
    #[must_use]
    pub fn or(self, lower: Self) -> Self {
        Self {
            forked_repository: non_empty(self.forked_repository)
                .or_else(|| non_empty(lower.forked_repository)),
            upstream_repository: non_empty(self.upstream_repository)
                .or_else(|| non_empty(lower.upstream_repository)),
            plugin_artifact_name: non_empty(self.plugin_artifact_name)
                .or_else(|| non_empty(lower.plugin_artifact_name)),
            plugin_id: non_empty(self.plugin_id).or_else(|| non_empty(lower.plugin_id)),
            changes: non_empty(self.changes).or_else(|| non_empty(lower.changes)),
            ignore_dependencies: self
                .ignore_dependencies
                .filter(|list| !list.is_empty())
                .or(lower.ignore_dependencies),
            version_patterns: self
                .version_patterns
                .filter(|list| !list.is_empty())
                .or(lower.version_patterns),
            github_token: non_empty(self.github_token).or_else(|| non_empty(lower.github_token)),
            actor: non_empty(self.actor).or_else(|| non_empty(lower.actor)),
            plugin_repository: non_empty(self.plugin_repository)
                .or_else(|| non_empty(lower.plugin_repository)),
            workdir: self.workdir.or(lower.workdir),
            open_pull_request: self.open_pull_request.or(lower.open_pull_request),
            base_branch: non_empty(self.base_branch).or_else(|| non_empty(lower.base_branch)),
        }
    }

    /// Version patterns to compile: the configured list, or the defaults.
    #[must_use]
    pub fn version_patterns_or_default(&self) -> Vec<String> {
        match &self.version_patterns {
            Some(patterns) if !patterns.is_empty() => patterns.clone(),
            _ => DEFAULT_VERSION_PATTERNS.iter().map(|p| (*p).to_string()).collect(),
        }
    }
}

/// Plugin-specific settings consumed by the release metadata builder.
#[derive(Debug, Clone)]
pub struct PluginSettings {
    /// Catalog ID of the plugin
    pub plugin_id: String,
    /// File-name prefix of the plugin's own artifact
    pub artifact_name: String,
    /// Non-empty asset name prefixes excluded from the library map
    pub ignore_dependencies: Vec<String>,
    /// Compiled version patterns, in priority order
    pub version_patterns: VersionPatterns,
}

impl PluginSettings {
    /// Whether an asset name starts with one of the ignored prefixes.
    #[must_use]
    pub fn is_ignored(&self, asset_name: &str) -> bool {
        self.ignore_dependencies.iter().any(|prefix| asset_name.starts_with(prefix.as_str()))
    }
}

/// Validated configuration of one release run.
#[derive(Debug, Clone)]
pub struct ReleaseConfig {
    /// HTTPS clone URL of the registry fork
    pub forked_repository: String,
    /// HTTPS clone URL of the canonical registry
    pub upstream_repository: String,
    /// Plugin repository the release is read from
    pub plugin_repository: RepositoryRef,
    /// Plugin settings for metadata extraction
    pub plugin: PluginSettings,
    /// Explicit changelog text; the release notes are used when absent
    pub changes: Option<String>,
    /// GitHub token spliced into remote URLs and used for API calls
    pub github_token: String,
    /// Commit author name
    pub actor: Option<String>,
    /// Directory the registry fork is cloned into
    pub workdir: PathBuf,
    /// Whether to open the upstream pull request
    pub open_pull_request: bool,
    /// Upstream branch targeted by the pull request
    pub base_branch: String,
}

impl ReleaseConfig {
    /// Validates merged inputs into a run configuration.
    ///
    /// Required values are checked in input order so the first missing one
    /// is reported. Repository URLs and version patterns are validated here,
    /// before any git or network work starts.
    ///
    /// # Errors
    ///
    /// - [`ReleaseError::ConfigError`] for a missing required input
    /// - [`ReleaseError::MissingToken`] when no token is available
    /// - [`ReleaseError::InvalidRepositoryUrl`] for malformed clone URLs
    /// - [`ReleaseError::InvalidVersionPattern`] for malformed patterns
    pub fn from_inputs(inputs: ConfigInputs) -> Result<Self> {
        let version_patterns = inputs.version_patterns_or_default();

        let forked_repository = required(inputs.forked_repository, "FORKED_REPOSITORY")?;
        let plugin_artifact_name = required(inputs.plugin_artifact_name, "PLUGIN_ARTIFACT_NAME")?;
        let plugin_id = required(inputs.plugin_id, "PLUGIN_ID")?;
        let plugin_repository = required(inputs.plugin_repository, "GITHUB_REPOSITORY")?;
        let github_token = non_empty(inputs.github_token).ok_or(ReleaseError::MissingToken)?;

        let upstream_repository = non_empty(inputs.upstream_repository)
            .unwrap_or_else(|| DEFAULT_UPSTREAM_REPOSITORY.to_string());

        extract_owner_and_repo(&forked_repository)?;
        extract_owner_and_repo(&upstream_repository)?;
        let plugin_repository: RepositoryRef = plugin_repository.parse()?;

        let ignore_dependencies = inputs
            .ignore_dependencies
            .unwrap_or_default()
            .iter()
            .flat_map(|entry| entry.split(','))
            .map(str::trim)
            .filter(|prefix| !prefix.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            forked_repository,
            upstream_repository,
            plugin_repository,
            plugin: PluginSettings {
                plugin_id,
                artifact_name: plugin_artifact_name,
                ignore_dependencies,
                version_patterns: VersionPatterns::compile(&version_patterns)?,
            },
            changes: non_empty(inputs.changes),
            github_token,
            actor: non_empty(inputs.actor),
            workdir: inputs.workdir.unwrap_or_else(|| PathBuf::from(DEFAULT_WORKDIR)),
            open_pull_request: inputs.open_pull_request.unwrap_or(true),
            base_branch: non_empty(inputs.base_branch)
                .unwrap_or_else(|| DEFAULT_BASE_BRANCH.to_string()),
        })
    }

    /// Settings for the repository synchronizer.
    #[must_use]
    pub fn sync_settings(&self) -> SyncSettings {
        SyncSettings {
            forked_repository: self.forked_repository.clone(),
            upstream_repository: self.upstream_repository.clone(),
            token: self.github_token.clone(),
            artifact_name: self.plugin.artifact_name.clone(),
            actor: self.actor.clone(),
            repository_name: Some(self.plugin_repository.repo.clone()),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn required(value: Option<String>, input: &str) -> Result<String, ReleaseError> {
    non_empty(value).ok_or_else(|| ReleaseError::ConfigError {
        message: format!("{input} is not set in the environment or empty"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> ConfigInputs {
        ConfigInputs {
            forked_repository: Some("https://github.com/fork/jmeter-plugins.git".to_string()),
            plugin_artifact_name: Some("jmeter-plugins-demo".to_string()),
            plugin_id: Some("jpgc-demo".to_string()),
            plugin_repository: Some("acme/jmeter-plugins-demo".to_string()),
            github_token: Some("ghp_token".to_string()),
            ..ConfigInputs::default()
        }
    }

    #[test]
    fn test_defaults_applied() {
        let config = ReleaseConfig::from_inputs(complete()).unwrap();
        assert_eq!(config.upstream_repository, DEFAULT_UPSTREAM_REPOSITORY);
        assert_eq!(config.workdir, PathBuf::from(DEFAULT_WORKDIR));
        assert_eq!(config.base_branch, "master");
        assert!(config.open_pull_request);
        assert_eq!(config.plugin.version_patterns.len(), DEFAULT_VERSION_PATTERNS.len());
        assert!(config.plugin.ignore_dependencies.is_empty());
    }

    #[test]
    fn test_missing_required_input_is_named() {
        let inputs = ConfigInputs {
            plugin_id: Some(String::new()),
            ..complete()
        };
        let err = ReleaseConfig::from_inputs(inputs).unwrap_err();
        assert_eq!(err.to_string(), "PLUGIN_ID is not set in the environment or empty");
    }

    #[test]
    fn test_missing_token() {
        let inputs = ConfigInputs {
            github_token: None,
            ..complete()
        };
        let err = ReleaseConfig::from_inputs(inputs).unwrap_err();
        assert_eq!(err.downcast_ref::<ReleaseError>(), Some(&ReleaseError::MissingToken));
    }

    #[test]
    fn test_ignore_dependencies_split_and_empty_entries_dropped() {
        let inputs = ConfigInputs {
            ignore_dependencies: Some(vec!["dep1,dep2".to_string(), " ".to_string(), "dep3".to_string()]),
            ..complete()
        };
        let config = ReleaseConfig::from_inputs(inputs).unwrap();
        assert_eq!(config.plugin.ignore_dependencies, vec!["dep1", "dep2", "dep3"]);
        assert!(config.plugin.is_ignored("dep2-1.0.jar"));
        assert!(!config.plugin.is_ignored("lib-core-2.1.jar"));
    }

    #[test]
    fn test_invalid_fork_url_rejected_early() {
        let inputs = ConfigInputs {
            forked_repository: Some("git@github.com:fork/jmeter-plugins.git".to_string()),
            ..complete()
        };
        let err = ReleaseConfig::from_inputs(inputs).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReleaseError>(),
            Some(ReleaseError::InvalidRepositoryUrl { .. })
        ));
    }

    #[test]
    fn test_invalid_version_pattern_rejected_early() {
        let inputs = ConfigInputs {
            version_patterns: Some(vec!["([0-9".to_string()]),
            ..complete()
        };
        let err = ReleaseConfig::from_inputs(inputs).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReleaseError>(),
            Some(ReleaseError::InvalidVersionPattern { .. })
        ));
    }

    #[test]
    fn test_layering_prefers_upper_non_empty_values() {
        let file = ConfigInputs {
            plugin_id: Some("from-file".to_string()),
            changes: Some("file changes".to_string()),
            version_patterns: Some(vec![r"-(\d+)$".to_string()]),
            ..ConfigInputs::default()
        };
        let cli = ConfigInputs {
            plugin_id: Some("from-cli".to_string()),
            changes: Some(String::new()),
            version_patterns: Some(vec![]),
            ..complete()
        };

        let merged = cli.or(file);
        assert_eq!(merged.plugin_id.as_deref(), Some("from-cli"));
        assert_eq!(merged.changes.as_deref(), Some("file changes"));
        assert_eq!(merged.version_patterns_or_default(), vec![r"-(\d+)$".to_string()]);
    }

    #[test]
    fn test_sync_settings_use_plugin_repository_name() {
        let config = ReleaseConfig::from_inputs(complete()).unwrap();
        let settings = config.sync_settings();
        assert_eq!(settings.repository_name.as_deref(), Some("jmeter-plugins-demo"));
        assert_eq!(settings.artifact_name, "jmeter-plugins-demo");
    }

    #[test]
    fn test_config_file_keys_are_kebab_case() {
        let inputs: ConfigInputs = toml::from_str(
            r#"
            plugin-id = "jpgc-demo"
            ignore-dependencies = ["ApacheJMeter"]
            version-patterns = ['-(\d+(?:\.\d+)+)$']
            open-pull-request = false
            "#,
        )
        .unwrap();
        assert_eq!(inputs.plugin_id.as_deref(), Some("jpgc-demo"));
        assert_eq!(inputs.open_pull_request, Some(false));
        assert_eq!(inputs.ignore_dependencies, Some(vec!["ApacheJMeter".to_string()]));
    }
}
