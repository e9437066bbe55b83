//! Registry catalog fixtures

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::CATALOG_DIR;

/// A set of catalog files to write into a registry checkout.
#[derive(Clone, Debug, Default)]
pub struct CatalogFixture {
    files: Vec<(String, String)>,
}

impl CatalogFixture {
    /// Empty fixture.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a catalog file with raw content.
    #[must_use]
    pub fn with_file(mut self, name: &str, content: &str) -> Self {
        self.files.push((name.to_string(), content.to_string()));
        self
    }

    /// Catalog layout resembling the real registry: an unrelated `jpgc.json`,
    /// and `various.json` holding `jpgc-myplugin` with two released versions.
    pub fn registry() -> Self {
        Self::new()
            .with_file(
                "jpgc.json",
                r#"[
  {
    "id": "jpgc-common",
    "name": "Common Libraries",
    "versions": {
      "0.1": {
        "changes": "Initial",
        "downloadUrl": "https://example.com/jpgc-common-0.1.jar"
      }
    }
  }
]
"#,
            )
            .with_file(
                "various.json",
                r#"[
  {
    "id": "jpgc-myplugin",
    "name": "My Plugin",
    "description": "Does things",
    "screenshotUrl": "https://example.com/shot.png",
    "versions": {
      "0.9": {
        "changes": "Preview",
        "downloadUrl": "https://example.com/myplugin-0.9.jar"
      },
      "1.0": {
        "changes": "First stable",
        "downloadUrl": "https://example.com/myplugin-1.0.jar",
        "depends": [
          "jpgc-common"
        ]
      }
    }
  }
]
"#,
            )
    }

    /// Writes the files under `<checkout>/site/dat/repo` and returns that directory.
    pub fn write_to(&self, checkout: &Path) -> Result<PathBuf> {
        let dir = checkout.join(CATALOG_DIR);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        for (name, content) in &self.files {
            fs::write(dir.join(name), content)
                .with_context(|| format!("Failed to write fixture {name}"))?;
        }
        Ok(dir)
    }
}
