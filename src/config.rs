//! Platform-specific paths and backend settings

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// File name of the local cache inside the data directory
pub const DATABASE_FILE: &str = "hyodo.db";

/// Get the default data directory
/// - macOS: ~/Library/Application Support/hyodo/
/// - Linux: ~/.local/share/hyodo/
/// - Windows: %APPDATA%/hyodo/
pub fn default_data_dir() -> Result<PathBuf> {
    let data = dirs::data_dir().context("Could not determine data directory")?;
    Ok(data.join("hyodo"))
}

/// Resolve the local cache file, creating the data directory if needed
pub fn database_path(data_dir: Option<&Path>) -> Result<PathBuf> {
    let dir = match data_dir {
        Some(d) => d.to_path_buf(),
        None => default_data_dir()?,
    };
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create: {}", dir.display()))?;
    Ok(dir.join(DATABASE_FILE))
}

/// Connection settings for the hosted backend
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Project URL, e.g. `https://<ref>.supabase.co`
    pub url: String,
    /// Public (anon) API key
    pub anon_key: String,
    /// Where password-reset links land
    pub redirect_url: Option<String>,
}

impl RemoteConfig {
    /// Build from optional settings; `None` unless both URL and key are set
    pub fn from_parts(
        url: Option<String>,
        anon_key: Option<String>,
        redirect_url: Option<String>,
    ) -> Option<Self> {
        let url = url.filter(|u| !u.trim().is_empty())?;
        let anon_key = anon_key.filter(|k| !k.trim().is_empty())?;
        Some(Self {
            url,
            anon_key,
            redirect_url: redirect_url.filter(|r| !r.trim().is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths_exist() {
        // Should not panic
        let _ = default_data_dir();
    }

    #[test]
    fn test_database_path_creates_dir() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("nested").join("hyodo");
        let path = database_path(Some(&dir)).unwrap();
        assert!(dir.is_dir());
        assert_eq!(path, dir.join(DATABASE_FILE));
    }

    #[test]
    fn test_remote_config_requires_url_and_key() {
        assert!(RemoteConfig::from_parts(None, Some("k".into()), None).is_none());
        assert!(RemoteConfig::from_parts(Some("https://x".into()), None, None).is_none());
        assert!(RemoteConfig::from_parts(Some(" ".into()), Some("k".into()), None).is_none());

        let config =
            RemoteConfig::from_parts(Some("https://x".into()), Some("k".into()), Some("".into()))
                .unwrap();
        assert_eq!(config.url, "https://x");
        assert!(config.redirect_url.is_none());
    }
}
