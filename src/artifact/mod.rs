//! Artifact name and version extraction from release asset file names.
//!
//! Release assets are opaque file names such as `commons-lang3-3.12.0.jar`
//! or `json-path-2.9.0.jar`. This module splits them into an artifact name and
//! a version using an ordered list of user-supplied regular expressions, with
//! a dash-splitting fallback when no pattern applies.
//!
//! # Algorithm
//!
//! 1. Strip a trailing `.jar` (exact, case-sensitive).
//! 2. Try each pattern in order. The first pattern whose capture group 1 is
//!    non-empty and literally present in the base name wins. The artifact
//!    name is the base name with the first occurrence of that version removed
//!    and separators (`-`, `_`, `.`) trimmed from both ends.
//! 3. Otherwise split on the last `-`: the tail is the version, the head the
//!    artifact name. A name without `-` yields an empty artifact name and the
//!    whole base name as version.
//!
//! # Examples
//!
//! ```rust
//! use plugin_release::artifact::{ArtifactInfo, VersionPatterns};
//!
//! # fn example() -> anyhow::Result<()> {
//! let patterns = VersionPatterns::compile([r"-(\d+(?:\.\d+)+)$"])?;
//! let info = ArtifactInfo::parse("commons-lang3-3.12.0.jar", &patterns);
//! assert_eq!(info.artifact_name, "commons-lang3");
//! assert_eq!(info.version, "3.12.0");
//! assert_eq!(info.lib_key(), "commons-lang3>=3.12.0");
//! # Ok(())
//! # }
//! ```

use anyhow::Result;
use regex::Regex;
use std::fmt;

use crate::constants::ARCHIVE_SUFFIX;
use crate::core::ReleaseError;

const SEPARATORS: &[char] = &['-', '_', '.'];

/// Ordered, pre-compiled version-extraction patterns.
///
/// Order is priority: the first pattern producing a usable capture wins.
/// Compile once per run so a malformed pattern surfaces as a single
/// configuration error before any asset is inspected.
#[derive(Debug, Clone, Default)]
pub struct VersionPatterns {
    patterns: Vec<Regex>,
}

impl VersionPatterns {
    /// Compiles the given patterns, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseError::InvalidVersionPattern`] naming the first
    /// pattern the regex engine rejects.
    pub fn compile<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                Regex::new(pattern).map_err(|e| ReleaseError::InvalidVersionPattern {
                    pattern: pattern.to_string(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            patterns,
        })
    }

    /// Number of compiled patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether no patterns were configured (only the fallback applies).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Returns the first version accepted by a pattern, in priority order.
    fn extract_version<'a>(&self, base_name: &'a str) -> Option<&'a str> {
        self.patterns.iter().find_map(|regex| {
            let version = regex.captures(base_name)?.get(1)?.as_str();
            (!version.is_empty() && base_name.contains(version)).then_some(version)
        })
    }
}

/// Artifact name and version derived from one asset file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactInfo {
    /// Artifact name with the version removed (may be empty, see module docs)
    pub artifact_name: String,
    /// Extracted version
    pub version: String,
}

impl ArtifactInfo {
    /// Decomposes `file_name` using pre-compiled patterns. Never fails.
    #[must_use]
    pub fn parse(file_name: &str, patterns: &VersionPatterns) -> Self {
        let base_name = strip_archive_suffix(file_name);

        if let Some(version) = patterns.extract_version(base_name) {
            return Self {
                artifact_name: infer_artifact_name(base_name, version),
                version: version.to_string(),
            };
        }

        fallback_extraction(base_name)
    }

    /// Compiles `patterns` and parses `file_name` in one step.
    ///
    /// # Errors
    ///
    /// Fails only if one of the patterns is not a valid regular expression.
    pub fn parse_with<S: AsRef<str>>(file_name: &str, patterns: &[S]) -> Result<Self> {
        let compiled = VersionPatterns::compile(patterns)?;
        Ok(Self::parse(file_name, &compiled))
    }

    /// Library key in the registry's minimum-version format: `name>=version`.
    #[must_use]
    pub fn lib_key(&self) -> String {
        format!("{}>={}", self.artifact_name, self.version)
    }
}

impl fmt::Display for ArtifactInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.artifact_name, self.version)
    }
}

fn strip_archive_suffix(name: &str) -> &str {
    name.strip_suffix(ARCHIVE_SUFFIX).unwrap_or(name)
}

fn infer_artifact_name(base_name: &str, version: &str) -> String {
    match base_name.find(version) {
        Some(index) => {
            let before = &base_name[..index];
            let after = &base_name[index + version.len()..];
            format!("{before}{after}").trim_matches(SEPARATORS).to_string()
        }
        None => base_name.trim_matches(SEPARATORS).to_string(),
    }
}

fn fallback_extraction(base_name: &str) -> ArtifactInfo {
    match base_name.rsplit_once('-') {
        Some((name, version)) => ArtifactInfo {
            artifact_name: name.to_string(),
            version: version.to_string(),
        },
        None => {
            tracing::warn!(
                "Asset '{}' has no version separator; recording it with an empty artifact name",
                base_name
            );
            ArtifactInfo {
                artifact_name: String::new(),
                version: base_name.to_string(),
            }
        }
    }
}
