//! Default path resolution for configuration files
//!
//! Uses the platform configuration directory when one exists.

use std::path::PathBuf;

/// Returns the default path of the viewer configuration file.
///
/// - Linux: `~/.config/nbtview/cli.toml`
/// - macOS: `~/Library/Application Support/nbtview/cli.toml`
/// - Fallback: `./.nbtview/cli.toml`
pub fn default_config_path() -> PathBuf {
    config_dir().join("cli.toml")
}

/// Directory holding nbtview configuration files
pub fn config_dir() -> PathBuf {
    match dirs::config_dir() {
        Some(dir) => dir.join("nbtview"),
        None => PathBuf::from(".nbtview"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_path_is_toml() {
        let path = default_config_path();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("toml"));
        assert!(path.ends_with("nbtview/cli.toml"));
    }

    #[test]
    fn test_config_dir_is_parent_of_config_path() {
        assert_eq!(default_config_path().parent(), Some(config_dir().as_path()));
    }
}
