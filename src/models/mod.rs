//! Shared data models for release operations
//!
//! These types mirror the subset of the GitHub release payload the pipeline
//! consumes. They are used by the hosting client, the metadata builder and
//! the test fakes alike.

use serde::{Deserialize, Serialize};

/// A downloadable file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseAsset {
    /// File name, e.g. `lib-core-2.1.jar`
    pub name: String,
    /// Public download URL
    #[serde(rename = "browser_download_url")]
    pub download_url: String,
}

impl ReleaseAsset {
    /// Creates an asset from a name and download URL.
    pub fn new(name: impl Into<String>, download_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            download_url: download_url.into(),
        }
    }
}

/// A published release of the plugin repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Tag the release was cut from (e.g. `v3.1`)
    pub tag_name: String,
    /// Release notes, if any
    #[serde(default)]
    pub body: Option<String>,
    /// Attached assets
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

impl Release {
    /// Version string derived from the tag: a leading `v` is dropped.
    ///
    /// ```rust
    /// use plugin_release::models::Release;
    ///
    /// let release = Release { tag_name: "v3.1".into(), body: None, assets: vec![] };
    /// assert_eq!(release.version(), "3.1");
    /// ```
    #[must_use]
    pub fn version(&self) -> &str {
        self.tag_name.strip_prefix('v').unwrap_or(&self.tag_name)
    }

    /// Release notes with surrounding whitespace removed, if non-empty.
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.body.as_deref().map(str::trim).filter(|body| !body.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_strips_leading_v_only() {
        let mut release = Release {
            tag_name: "v2.0".to_string(),
            body: None,
            assets: vec![],
        };
        assert_eq!(release.version(), "2.0");

        release.tag_name = "2.0".to_string();
        assert_eq!(release.version(), "2.0");

        release.tag_name = "release-2.0".to_string();
        assert_eq!(release.version(), "release-2.0");
    }

    #[test]
    fn test_release_deserializes_github_payload() {
        let json = r#"{
            "tag_name": "v1.0",
            "body": "  Fixed things\n",
            "draft": false,
            "assets": [
                {"name": "myplugin-1.0.jar", "browser_download_url": "https://example.com/myplugin-1.0.jar", "size": 10}
            ]
        }"#;
        let release: Release = serde_json::from_str(json).unwrap();
        assert_eq!(release.notes(), Some("Fixed things"));
        assert_eq!(
            release.assets,
            vec![ReleaseAsset::new("myplugin-1.0.jar", "https://example.com/myplugin-1.0.jar")]
        );
    }

    #[test]
    fn test_notes_empty_body_is_none() {
        let release = Release {
            tag_name: "v1".to_string(),
            body: Some("   ".to_string()),
            assets: vec![],
        };
        assert_eq!(release.notes(), None);
    }
}
