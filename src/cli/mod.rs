//! Command-line interface for plugin-release.
//!
//! # Available Commands
//!
//! - `publish` - Publish the latest plugin release into the registry fork
//!   and open a pull request against upstream
//! - `parse` - Show how asset file names decompose into artifact name and
//!   version, for tuning version patterns
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug output (including every git command)
//! - `--quiet` - Only report errors
//! - `--config` - TOML file with default inputs
//!
//! # Example
//!
//! ```bash
//! # Typical CI invocation, inputs come from the environment
//! FORKED_REPOSITORY=https://github.com/acme/jmeter-plugins.git \
//! PLUGIN_ARTIFACT_NAME=jmeter-plugins-demo PLUGIN_ID=jpgc-demo \
//! GITHUB_REPOSITORY=acme/jmeter-plugins-demo GITHUB_TOKEN=... \
//! plugin-release publish
//!
//! # Check pattern behaviour locally
//! plugin-release parse commons-lang3-3.12.0.jar guava-31.1-jre.jar
//! ```

mod parse;
mod publish;

pub use parse::{OutputFormat, ParseCommand};
pub use publish::PublishCommand;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Runtime configuration derived from the global flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Log filter used when `RUST_LOG` is not set
    pub log_level: String,
    /// Optional TOML configuration file
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Installs the global tracing subscriber.
    ///
    /// `RUST_LOG` wins over the level derived from `--verbose`/`--quiet`.
    /// Logs go to stderr so command output on stdout stays parseable.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.log_level.as_str()));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Publishes JMeter plugin releases to the plugins registry.
#[derive(Parser)]
#[command(
    name = "plugin-release",
    about = "Publish a plugin release into the JMeter plugins registry",
    version,
    long_about = "Reads the latest GitHub release of a plugin, records it in the registry \
                  catalog of a fork, pushes a release branch and opens a pull request upstream."
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output, including every git command.
    ///
    /// Equivalent to `RUST_LOG=debug`.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// TOML file providing default inputs (kebab-case keys).
    ///
    /// Flags and environment variables override values from the file.
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish the latest release of the plugin into the registry.
    ///
    /// See [`PublishCommand`] for inputs.
    Publish(PublishCommand),

    /// Decompose asset file names into artifact name and version.
    Parse(ParseCommand),
}

impl Cli {
    /// Execute the selected subcommand.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Build a [`CliConfig`] from the parsed arguments.
    ///
    /// - `--verbose` maps to `debug`
    /// - `--quiet` maps to `error`
    /// - otherwise `info`
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        };

        CliConfig {
            log_level: log_level.to_string(),
            config_path: self.config.clone(),
        }
    }

    /// Execute with an explicit configuration.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        match self.command {
            Commands::Publish(cmd) => cmd.execute(config.config_path.as_deref()).await,
            Commands::Parse(cmd) => cmd.execute(config.config_path.as_deref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_from_flags() {
        let cli = Cli::parse_from(["plugin-release", "--verbose", "parse", "a-1.0.jar"]);
        assert_eq!(cli.build_config().log_level, "debug");

        let cli = Cli::parse_from(["plugin-release", "parse", "-q", "a-1.0.jar"]);
        assert_eq!(cli.build_config().log_level, "error");

        let cli = Cli::parse_from(["plugin-release", "parse", "a-1.0.jar"]);
        assert_eq!(cli.build_config().log_level, "info");
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["plugin-release", "-v", "-q", "parse", "a.jar"]).is_err());
    }

    #[test]
    fn test_config_path_is_global() {
        let cli = Cli::parse_from(["plugin-release", "parse", "--config", "release.toml", "x.jar"]);
        assert_eq!(cli.build_config().config_path, Some(PathBuf::from("release.toml")));
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
