//! File system helpers: atomic writes and working-copy cleanup.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Writes `content` to `path` atomically using a temp-and-rename strategy.
///
/// The content is written to a sibling `.tmp` file, synced to disk, then
/// renamed over the target, so readers never observe a partially written
/// catalog. Parent directories are created if missing.
///
/// # Errors
///
/// Fails if the temp file cannot be created, written, synced or renamed.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }

    let temp_path = path.with_extension("tmp");

    {
        let mut file = fs::File::create(&temp_path)
            .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

        file.write_all(content)
            .with_context(|| format!("Failed to write to temp file: {}", temp_path.display()))?;

        file.sync_all().with_context(|| "Failed to sync file to disk")?;
    }

    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;

    Ok(())
}

/// Removes `dir` and everything below it; a missing directory is not an error.
///
/// # Errors
///
/// Fails if the directory exists but cannot be removed.
pub async fn remove_dir_if_exists(dir: &Path) -> Result<()> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => {
            tracing::debug!("Removed existing directory {}", dir.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => {
            Err(e).with_context(|| format!("Failed to remove directory: {}", dir.display()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_creates_parents_and_replaces_content() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("site/dat/repo/various.json");

        atomic_write(&target, b"[]").unwrap();
        atomic_write(&target, b"[1]").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "[1]");
        assert!(!target.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_remove_dir_if_exists() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("checkout");
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("nested/file.txt"), "x").unwrap();

        remove_dir_if_exists(&dir).await.unwrap();
        assert!(!dir.exists());

        // Second call on a missing directory is a no-op
        remove_dir_if_exists(&dir).await.unwrap();
    }
}
