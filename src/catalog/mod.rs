//! Plugin registry catalog model and file access.
//!
//! The registry stores its catalog as JSON arrays of plugin records spread
//! over several files in `site/dat/repo`. Each record carries a `versions`
//! object mapping a release version to its download URL, bundled libraries
//! and plugin dependencies:
//!
//! ```json
//! [
//!   {
//!     "id": "jpgc-casutg",
//!     "name": "Custom Thread Groups",
//!     "description": "...",
//!     "versions": {
//!       "2.9": {
//!         "changes": "Fix concurrency",
//!         "downloadUrl": "https://.../jmeter-plugins-casutg-2.9.jar",
//!         "libs": { "jmeter-plugins-cmn-jmeter>=0.6": "https://.../jmeter-plugins-cmn-jmeter-0.6.jar" },
//!         "depends": ["jpgc-graphs-basic"]
//!       }
//!     }
//!   }
//! ]
//! ```
//!
//! The typed model below is read-only. Appending a release patches the raw
//! JSON document of the file (see [`CatalogRepository::add_release`]) so that
//! records, versions and keys the run does not touch keep their exact text.

mod repository;

pub use repository::CatalogRepository;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One plugin record of the registry catalog.
///
/// Fields other than these (description, vendor, helpUrl, ...) are ignored
/// when reading.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Plugin {
    /// Unique plugin identifier (e.g. `jpgc-casutg`)
    pub id: String,
    /// Human readable name
    #[serde(default)]
    pub name: Option<String>,
    /// Release history
    #[serde(default)]
    pub versions: VersionHistory,
}

/// Metadata of one released plugin version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginVersion {
    /// Changelog text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<String>,
    /// Download URL of the plugin artifact
    #[serde(rename = "downloadUrl", default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    /// Bundled libraries keyed `name>=version`, mapped to their download URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub libs: Option<IndexMap<String, String>>,
    /// IDs of plugins this version depends on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends: Option<Vec<String>>,
}

impl PluginVersion {
    /// Builds a complete release record.
    pub fn new(
        changes: impl Into<String>,
        download_url: impl Into<String>,
        libs: IndexMap<String, String>,
        depends: Vec<String>,
    ) -> Self {
        Self {
            changes: Some(changes.into()),
            download_url: Some(download_url.into()),
            libs: Some(libs),
            depends: Some(depends),
        }
    }

    /// Declared plugin dependencies, empty when the field is absent.
    #[must_use]
    pub fn depends(&self) -> &[String] {
        self.depends.as_deref().unwrap_or_default()
    }
}

/// Ordered release history of a plugin.
///
/// Entries keep the order they appear in the catalog file, where new
/// releases are appended at the end. "Latest" therefore means *last
/// appended*, not the highest semantic version: a hotfix for an older line that was published
/// after a newer release is the latest entry.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct VersionHistory(IndexMap<String, PluginVersion>);

impl VersionHistory {
    /// The most recently appended release, if any.
    #[must_use]
    pub fn latest(&self) -> Option<(&str, &PluginVersion)> {
        self.0.last().map(|(version, record)| (version.as_str(), record))
    }

    /// Looks up a release by version.
    #[must_use]
    pub fn get(&self, version: &str) -> Option<&PluginVersion> {
        self.0.get(version)
    }

    /// Number of recorded releases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Versions in history order.
    pub fn versions(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: &str = r#"{
  "id": "jpgc-demo",
  "name": "Demo",
  "description": "Demo plugin",
  "screenshotUrl": "https://example.com/shot.png",
  "vendor": "example",
  "markerClass": "com.example.Demo",
  "versions": {
    "1.0": {
      "changes": "Initial",
      "downloadUrl": "https://example.com/demo-1.0.jar",
      "libs": {}
    },
    "0.9": {
      "downloadUrl": "https://example.com/demo-0.9.jar",
      "depends": [
        "jpgc-common"
      ],
      "installerClass": "com.example.Installer"
    }
  }
}"#;

    #[test]
    fn test_latest_is_last_appended_not_highest() {
        let plugin: Plugin = serde_json::from_str(RECORD).unwrap();
        let (version, record) = plugin.versions.latest().unwrap();
        assert_eq!(version, "0.9");
        assert_eq!(record.depends(), ["jpgc-common".to_string()]);
    }

    #[test]
    fn test_history_keeps_file_order_and_ignores_unknown_fields() {
        let plugin: Plugin = serde_json::from_str(RECORD).unwrap();
        assert_eq!(plugin.name.as_deref(), Some("Demo"));
        assert_eq!(plugin.versions.versions().collect::<Vec<_>>(), ["1.0", "0.9"]);
        assert_eq!(plugin.versions.len(), 2);

        let initial = plugin.versions.get("1.0").unwrap();
        assert_eq!(initial.changes.as_deref(), Some("Initial"));
        assert!(initial.depends().is_empty());
        assert!(plugin.versions.get("2.0").is_none());
    }

    #[test]
    fn test_new_record_serializes_all_fields() {
        let mut libs = IndexMap::new();
        libs.insert("lib-core>=2.1".to_string(), "https://example.com/lib-core-2.1.jar".to_string());
        let record = PluginVersion::new("Notes", "https://example.com/p.jar", libs, vec![]);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "changes": "Notes",
                "downloadUrl": "https://example.com/p.jar",
                "libs": { "lib-core>=2.1": "https://example.com/lib-core-2.1.jar" },
                "depends": []
            })
        );
    }
}
