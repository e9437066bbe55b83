//! Integration test suite for plugin-release
//!
//! Runs the publication pipeline end to end against in-memory stand-ins for
//! git and GitHub, with real catalog files in a temporary checkout.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! - **publish**: successful publications and their side effects
//! - **failures**: how each failing step surfaces and what it leaves behind

mod failures;
mod publish;

use plugin_release::config::{ConfigInputs, ReleaseConfig};
use plugin_release::models::ReleaseAsset;
use plugin_release::test_utils::{CatalogFixture, RecordingGit, init_test_logging};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary working area with the checkout location inside it.
pub struct Workspace {
    _temp: TempDir,
    pub checkout: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        init_test_logging(None);
        let temp = TempDir::new().unwrap();
        let checkout = temp.path().join("jmeter-plugins");
        Self {
            _temp: temp,
            checkout,
        }
    }

    /// Inputs for publishing `jpgc-myplugin` from `acme/myplugin-repo`.
    pub fn inputs(&self) -> ConfigInputs {
        ConfigInputs {
            forked_repository: Some("https://github.com/fork/jmeter-plugins.git".to_string()),
            plugin_artifact_name: Some("myplugin".to_string()),
            plugin_id: Some("jpgc-myplugin".to_string()),
            ignore_dependencies: Some(vec!["ignored-thing".to_string()]),
            github_token: Some("ghp_secret".to_string()),
            plugin_repository: Some("acme/myplugin-repo".to_string()),
            workdir: Some(self.checkout.clone()),
            ..ConfigInputs::default()
        }
    }

    pub fn config(&self) -> ReleaseConfig {
        ReleaseConfig::from_inputs(self.inputs()).unwrap()
    }

    pub fn catalog_file(&self, name: &str) -> PathBuf {
        self.checkout.join("site/dat/repo").join(name)
    }
}

/// Git runner whose clone materializes the registry fixture.
pub fn registry_git() -> RecordingGit {
    RecordingGit::new().on_clone(|target: &Path| CatalogFixture::registry().write_to(target).map(|_| ()))
}

pub fn asset(name: &str) -> ReleaseAsset {
    ReleaseAsset::new(name, format!("https://github.com/acme/myplugin-repo/releases/download/v1.1/{name}"))
}

pub fn release_assets() -> Vec<ReleaseAsset> {
    vec![asset("myplugin-1.1.jar"), asset("lib-core-2.1.jar"), asset("ignored-thing-9.jar")]
}
