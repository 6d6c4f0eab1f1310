//! Configuration loading.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the profile and entry log.
    pub data_dir: PathBuf,

    /// CSV product catalog used for searches and offline estimates.
    pub catalog_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            catalog_path: data_dir.join("products.csv"),
            data_dir,
        }
    }
}

impl Config {
    /// Load from defaults, the user config file, an optional explicit file,
    /// then `GLUCO_*` environment variables, later sources winning.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("GLUCO_"));

        Ok(figment.extract()?)
    }
}

/// Platform config directory for gluco, e.g. `~/.config/gluco`.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("gluco"))
}

/// Platform data directory for gluco, e.g. `~/.local/share/gluco`.
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("gluco"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_catalog_lives_in_data_dir() {
        let config = Config::default();
        assert_eq!(config.catalog_path, config.data_dir.join("products.csv"));
    }

    #[test]
    fn test_explicit_file_overrides_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "data_dir = \"/tmp/gluco-test\"").unwrap();
        writeln!(file, "catalog_path = \"/tmp/gluco-test/foods.csv\"").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/gluco-test"));
        assert_eq!(config.catalog_path, PathBuf::from("/tmp/gluco-test/foods.csv"));
    }
}
