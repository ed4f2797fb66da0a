//! XDG directory path resolution

use std::path::{Path, PathBuf};
use xdg::BaseDirectories;

/// Get the configuration directory path
///
/// Checks ARGONAUT_CONFIG_DIR environment variable first, then falls back to
/// XDG_CONFIG_HOME/argonaut
pub fn config_dir() -> PathBuf {
    std::env::var("ARGONAUT_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            BaseDirectories::with_prefix("argonaut")
                .map(|xdg| xdg.get_config_home())
                .unwrap_or_else(|_| PathBuf::from(".").join(".config").join("argonaut"))
        })
}

/// Get the root configuration file path
pub fn root_config_path() -> PathBuf {
    config_dir().join("config.yaml")
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir() {
        let dir = config_dir();
        assert!(dir.to_string_lossy().contains("argonaut"));
    }
}
