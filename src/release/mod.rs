//! Release metadata construction
//!
//! Turns the assets of a GitHub release into the catalog record of the new
//! plugin version:
//!
//! - `downloadUrl`: URL of the plugin's own artifact, the first asset whose
//!   name starts with the configured artifact prefix
//! - `libs`: every other asset, unless it matches an ignored prefix, keyed
//!   `<artifact>>=<version>` using the configured version patterns
//! - `depends`: copied from the latest version already in the catalog
//! - `changes`: the changelog text

use anyhow::Result;
use indexmap::IndexMap;
use tracing::debug;

use crate::artifact::ArtifactInfo;
use crate::catalog::{CatalogRepository, PluginVersion};
use crate::config::PluginSettings;
use crate::core::ReleaseError;
use crate::models::ReleaseAsset;

/// Builds the [`PluginVersion`] record for one release.
#[derive(Debug)]
pub struct ReleaseBuilder<'a> {
    plugin: &'a PluginSettings,
    assets: &'a [ReleaseAsset],
    catalog: &'a CatalogRepository,
    changes: String,
}

impl<'a> ReleaseBuilder<'a> {
    /// Creates a builder over the assets of one release.
    pub fn new(
        plugin: &'a PluginSettings,
        assets: &'a [ReleaseAsset],
        catalog: &'a CatalogRepository,
        changes: impl Into<String>,
    ) -> Self {
        Self {
            plugin,
            assets,
            catalog,
            changes: changes.into(),
        }
    }

    /// Assembles the release record.
    ///
    /// # Errors
    ///
    /// - [`ReleaseError::PluginArtifactNotFound`] if no asset carries the artifact prefix
    /// - [`ReleaseError::PluginNotFound`] if no catalog file lists the plugin
    /// - [`ReleaseError::CatalogReadError`] for an unreadable catalog file
    /// - [`ReleaseError::EmptyVersionHistory`] if the plugin has no prior version
    pub async fn build(self) -> Result<PluginVersion> {
        let download_url = self.own_artifact()?.download_url.clone();
        let libs = self.libraries();
        let depends = self.inherited_depends().await?;

        debug!(
            "Release record for {}: {} libs, {} depends",
            self.plugin.plugin_id,
            libs.len(),
            depends.len()
        );
        Ok(PluginVersion::new(self.changes, download_url, libs, depends))
    }

    /// The plugin's own artifact; several matches are accepted, the first wins.
    pub fn own_artifact(&self) -> Result<&'a ReleaseAsset> {
        let prefix = self.plugin.artifact_name.as_str();
        self.assets.iter().find(|asset| asset.name.starts_with(prefix)).ok_or_else(|| {
            ReleaseError::PluginArtifactNotFound {
                prefix: prefix.to_string(),
            }
            .into()
        })
    }

    /// Library map of the release, in asset order.
    ///
    /// Assets starting with the artifact prefix or an ignored prefix are
    /// skipped. When two assets decompose to the same key the later URL wins.
    #[must_use]
    pub fn libraries(&self) -> IndexMap<String, String> {
        let mut libs = IndexMap::new();
        for asset in self.assets {
            if asset.name.starts_with(self.plugin.artifact_name.as_str()) {
                continue;
            }
            if self.plugin.is_ignored(&asset.name) {
                debug!("Ignoring release asset {}", asset.name);
                continue;
            }

            let info = ArtifactInfo::parse(&asset.name, &self.plugin.version_patterns);
            debug!("Release asset {} parsed as {}", asset.name, info);
            libs.insert(info.lib_key(), asset.download_url.clone());
        }
        libs
    }

    async fn inherited_depends(&self) -> Result<Vec<String>> {
        let plugin_id = self.plugin.plugin_id.as_str();
        let path = self.catalog.locate(plugin_id).await?;
        let plugins = CatalogRepository::load(&path).await?;

        let empty_history = || ReleaseError::EmptyVersionHistory {
            plugin_id: plugin_id.to_string(),
            file: path.display().to_string(),
        };
        let plugin = plugins.iter().find(|p| p.id == plugin_id).ok_or_else(empty_history)?;
        let (version, latest) = plugin.versions.latest().ok_or_else(empty_history)?;

        debug!("Inheriting depends of {} v{}", plugin_id, version);
        Ok(latest.depends().to_vec())
    }
}
