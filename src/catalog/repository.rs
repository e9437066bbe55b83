//! Locating, reading and rewriting catalog files inside a registry checkout.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use super::{Plugin, PluginVersion};
use crate::core::ReleaseError;
use crate::utils::atomic_write;

/// Access to the JSON catalog files of one registry checkout.
///
/// The catalog directory holds several `*.json` files, each a JSON array of
/// [`Plugin`] records. A plugin lives in exactly one of them; that file is the
/// unit of read, patch and write.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    root: PathBuf,
}

impl CatalogRepository {
    /// Creates an accessor for the catalog directory `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }

    /// Finds the catalog file containing `plugin_id`.
    ///
    /// Files are visited in file-name order and selected by the `.json`
    /// extension only. Every file is checked before giving up.
    ///
    /// # Errors
    ///
    /// - [`ReleaseError::PluginNotFound`] listing every directory entry scanned
    /// - [`ReleaseError::CatalogReadError`] if a JSON file cannot be parsed
    pub async fn locate(&self, plugin_id: &str) -> Result<PathBuf> {
        let mut entries = fs::read_dir(&self.root).await.with_context(|| {
            format!("Failed to read catalog directory: {}", self.root.display())
        })?;

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();

        for name in &names {
            let path = self.root.join(name);
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }

            let plugins = Self::load(&path).await?;
            if plugins.iter().any(|plugin| plugin.id == plugin_id) {
                debug!("Plugin {} found in {}", plugin_id, path.display());
                return Ok(path);
            }
        }

        Err(ReleaseError::PluginNotFound {
            plugin_id: plugin_id.to_string(),
            scanned: names,
        }
        .into())
    }

    /// Parses a catalog file into its plugin records.
    ///
    /// # Errors
    ///
    /// Any read or parse failure becomes [`ReleaseError::CatalogReadError`];
    /// the underlying cause is only logged.
    pub async fn load(path: &Path) -> Result<Vec<Plugin>> {
        Self::read_json(path).await
    }

    /// Writes a catalog document as two-space indented JSON with a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseError::CatalogWriteError`] if serialization or the
    /// atomic write fails.
    pub fn write<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
        let write_error = || ReleaseError::CatalogWriteError {
            file: path.display().to_string(),
        };

        let mut content = serde_json::to_string_pretty(records).map_err(|e| {
            debug!("Serializing catalog for {} failed: {}", path.display(), e);
            write_error()
        })?;
        content.push('\n');

        atomic_write(path, content.as_bytes()).map_err(|e| {
            debug!("Writing {} failed: {:#}", path.display(), e);
            write_error()
        })?;

        Ok(())
    }

    /// Appends `record` as `version` to the plugin's history and rewrites its file.
    ///
    /// Only the plugin's `versions` object gains a key; every other record,
    /// version and key keeps its position and text. Returns the patched file.
    /// If the version is already recorded the file is left untouched, so
    /// repeating a patch is harmless.
    ///
    /// # Errors
    ///
    /// Propagates lookup, read and write failures. A plugin record whose
    /// `versions` is not an object is reported as unreadable.
    pub async fn add_release(
        &self,
        plugin_id: &str,
        version: &str,
        record: PluginVersion,
    ) -> Result<PathBuf> {
        let path = self.locate(plugin_id).await?;
        let mut document: Vec<Value> = Self::read_json(&path).await?;

        let plugin = document
            .iter_mut()
            .filter_map(Value::as_object_mut)
            .find(|plugin| plugin.get("id").and_then(Value::as_str) == Some(plugin_id))
            .ok_or_else(|| ReleaseError::PluginNotFound {
                plugin_id: plugin_id.to_string(),
                scanned: vec![path.display().to_string()],
            })?;

        let Some(versions) = plugin
            .entry("versions")
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
        else {
            debug!("`versions` of {} in {} is not an object", plugin_id, path.display());
            return Err(ReleaseError::CatalogReadError {
                file: path.display().to_string(),
            }
            .into());
        };

        if versions.contains_key(version) {
            warn!(
                "Version {} of {} is already in {}; leaving catalog unchanged",
                version,
                plugin_id,
                path.display()
            );
            return Ok(path);
        }

        let record = serde_json::to_value(&record).map_err(|e| {
            debug!("Serializing release record failed: {}", e);
            ReleaseError::CatalogWriteError {
                file: path.display().to_string(),
            }
        })?;
        versions.insert(version.to_string(), record);

        Self::write(&path, &document)?;
        info!("Added {} v{} to {}", plugin_id, version, path.display());
        Ok(path)
    }

    async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
        let read_error = || ReleaseError::CatalogReadError {
            file: path.display().to_string(),
        };

        let content = fs::read_to_string(path).await.map_err(|e| {
            debug!("Reading {} failed: {}", path.display(), e);
            read_error()
        })?;

        let parsed = serde_json::from_str(&content).map_err(|e| {
            debug!("Parsing {} failed: {}", path.display(), e);
            read_error()
        })?;

        Ok(parsed)
    }
}
