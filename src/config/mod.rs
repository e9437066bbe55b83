//! Configuration management for plugin-release
//!
//! A release run is configured from up to three layers, highest first:
//!
//! 1. **Command line flags** (`--plugin-id jpgc-demo`)
//! 2. **Environment variables** (`PLUGIN_ID=jpgc-demo`, `GITHUB_TOKEN`, `GITHUB_ACTOR`,
//!    `GITHUB_REPOSITORY`), resolved by clap together with the flags
//! 3. **Configuration file** passed with `--config` (TOML, kebab-case keys)
//!
//! ```toml
//! forked-repository = "https://github.com/acme/jmeter-plugins.git"
//! plugin-artifact-name = "jmeter-plugins-demo"
//! plugin-id = "jpgc-demo"
//! ignore-dependencies = ["ApacheJMeter", "jmeter-plugins-cmn"]
//! version-patterns = ['-(\d+(?:\.\d+)+(?:-[A-Za-z0-9.]+)?)$', '-(\d+)$']
//! ```
//!
//! The token is only accepted from the command line or environment, never
//! from the file.
//!
//! Layers are merged into [`ConfigInputs`] and validated once into a
//! [`ReleaseConfig`]. Environment-derived fallbacks (actor, repository name)
//! become explicit fields here so that the rest of the crate never reads the
//! process environment.

pub mod parser;
mod release;

pub use parser::parse_config;
pub use release::{ConfigInputs, PluginSettings, ReleaseConfig};
