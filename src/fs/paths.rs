//! Path and directory management.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Application folder under the platform cache root.
const CACHE_SUBDIR: [&str; 2] = ["subscrforge", "collector"];

/// Get the response cache directory.
///
/// The directory is platform dependent:
///
/// - Windows: `%TEMP%/subscrforge/collector`
/// - macOS: `$HOME/Library/Caches/subscrforge/collector`
/// - Linux: `$XDG_CACHE_HOME/subscrforge/collector` or `$HOME/.cache/subscrforge/collector`
///
/// Any other platform is unsupported.
pub fn default_cache_dir() -> Result<PathBuf> {
    let root = cache_root()?;
    Ok(CACHE_SUBDIR.iter().fold(root, |path, part| path.join(part)))
}

#[cfg(windows)]
fn cache_root() -> Result<PathBuf> {
    Ok(std::env::temp_dir())
}

#[cfg(any(target_os = "macos", target_os = "linux"))]
fn cache_root() -> Result<PathBuf> {
    directories::BaseDirs::new()
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .ok_or_else(|| Error::Config("Cannot determine the home directory".to_string()))
}

#[cfg(not(any(windows, target_os = "macos", target_os = "linux")))]
fn cache_root() -> Result<PathBuf> {
    Err(Error::UnsupportedPlatform(std::env::consts::OS.to_string()))
}

/// Resolve the cache directory, preferring an explicit override.
pub fn resolve_cache_dir(custom: Option<&Path>) -> Result<PathBuf> {
    match custom {
        Some(path) => Ok(path.to_path_buf()),
        None => default_cache_dir(),
    }
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
