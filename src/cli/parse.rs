//! `parse` command: show how asset names decompose under the configured patterns.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::Path;

use crate::artifact::{ArtifactInfo, VersionPatterns};
use crate::config::{ConfigInputs, parse_config};

/// Output format of the `parse` command.
#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One colored line per asset
    Text,
    /// JSON array, for scripting
    Json,
}

/// Decompose release asset file names into artifact name and version.
///
/// Uses the same patterns and fallback as `publish`, so it can be used to
/// check which `libs` keys a release would produce.
#[derive(Args, Debug)]
pub struct ParseCommand {
    /// Asset file names, e.g. `commons-lang3-3.12.0.jar`
    #[arg(required = true, value_name = "ASSET")]
    pub assets: Vec<String>,

    /// Version pattern; repeat for several, tried in order
    #[arg(long = "version-pattern", env = "VERSION_PATTERNS", value_delimiter = '\n')]
    pub version_patterns: Vec<String>,

    /// Output format: text or json
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct ParsedAsset {
    file: String,
    artifact: String,
    version: String,
    key: String,
}

impl ParseCommand {
    /// Runs the command, printing to stdout.
    pub fn execute(self, config_path: Option<&Path>) -> Result<()> {
        let file_inputs = match config_path {
            Some(path) => parse_config::<ConfigInputs>(path)?,
            None => ConfigInputs::default(),
        };
        let inputs = ConfigInputs {
            version_patterns: Some(self.version_patterns.clone()),
            ..ConfigInputs::default()
        }
        .or(file_inputs);
        let patterns = VersionPatterns::compile(inputs.version_patterns_or_default())?;

        let parsed = self.decompose(&patterns);
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&parsed)?),
            OutputFormat::Text => {
                for asset in &parsed {
                    let artifact = if asset.artifact.is_empty() {
                        "(none)".yellow().to_string()
                    } else {
                        asset.artifact.bold().to_string()
                    };
                    println!(
                        "{}  {} {}  {}",
                        asset.file,
                        artifact,
                        asset.version.green(),
                        asset.key.dimmed()
                    );
                }
            }
        }
        Ok(())
    }

    fn decompose(&self, patterns: &VersionPatterns) -> Vec<ParsedAsset> {
        self.assets
            .iter()
            .map(|file| {
                let info = ArtifactInfo::parse(file, patterns);
                ParsedAsset {
                    file: file.clone(),
                    key: info.lib_key(),
                    artifact: info.artifact_name,
                    version: info.version,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_VERSION_PATTERNS;

    fn command(assets: &[&str]) -> ParseCommand {
        ParseCommand {
            assets: assets.iter().map(|s| (*s).to_string()).collect(),
            version_patterns: vec![],
            format: OutputFormat::Json,
        }
    }

    #[test]
    fn test_decompose_with_default_patterns() {
        let patterns = VersionPatterns::compile(DEFAULT_VERSION_PATTERNS).unwrap();
        let parsed = command(&["commons-lang3-3.12.0.jar", "standalone.jar"]).decompose(&patterns);

        assert_eq!(parsed[0].artifact, "commons-lang3");
        assert_eq!(parsed[0].version, "3.12.0");
        assert_eq!(parsed[0].key, "commons-lang3>=3.12.0");
        assert_eq!(parsed[1].artifact, "");
        assert_eq!(parsed[1].version, "standalone");
    }

    #[test]
    fn test_execute_rejects_invalid_pattern() {
        let mut cmd = command(&["a-1.0.jar"]);
        cmd.version_patterns = vec!["(".to_string()];
        assert!(cmd.execute(None).is_err());
    }

    #[test]
    fn test_execute_reads_patterns_from_config_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("release.toml");
        std::fs::write(&path, "version-patterns = ['(']\n").unwrap();

        let err = command(&["a-1.0.jar"]).execute(Some(&path)).unwrap_err();
        assert!(err.to_string().starts_with("Invalid version pattern [(]"));
    }
}
