//! TOML parsing for configuration files.

use anyhow::{Context, Result};
use std::path::Path;

/// Reads and deserializes a TOML configuration file.
///
/// # Errors
///
/// Fails with the file path in context if the file cannot be read or does
/// not match the expected structure.
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: T = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_config() {
        let temp = tempdir().unwrap();
        let config_path = temp.path().join("release.toml");

        #[derive(serde::Deserialize)]
        struct TestConfig {
            name: String,
            patterns: Vec<String>,
        }

        let toml_content = r#"
            name = "test"
            patterns = ['-(\d+)$']
        "#;

        std::fs::write(&config_path, toml_content).unwrap();

        let config: TestConfig = parse_config(&config_path).unwrap();
        assert_eq!(config.name, "test");
        assert_eq!(config.patterns, vec![r"-(\d+)$".to_string()]);
    }

    #[test]
    fn test_parse_config_error_names_file() {
        let temp = tempdir().unwrap();
        let config_path = temp.path().join("invalid.toml");
        std::fs::write(&config_path, "invalid = toml {").unwrap();

        #[derive(Debug, serde::Deserialize)]
        struct TestConfig {
            #[allow(dead_code)]
            name: String,
        }

        let err = parse_config::<TestConfig>(&config_path).unwrap_err();
        assert!(err.to_string().contains("invalid.toml"));
    }
}
