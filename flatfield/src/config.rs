//! Application configuration, loaded from YAML or JSON.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::SyntheticFieldConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log filter, e.g. `info` or `flatfield=debug`.
    pub log_level: String,
    /// Directory for rotated log files. Logs go to stderr when unset.
    pub log_dir: Option<PathBuf>,
    /// Parameters for synthetic dark/flat generation.
    pub synthetic: SyntheticFieldConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: None,
            synthetic: SyntheticFieldConfig::default(),
        }
    }
}

impl Config {
    /// Read a config file; the extension selects YAML or JSON.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let config: Config = common::file_format::load_from_file(path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?;
        config
            .synthetic
            .validate()
            .with_context(|| format!("Invalid config '{}'", path.display()))?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        common::file_format::save_to_file(self, path)
            .with_context(|| format!("Failed to save config '{}'", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "synthetic:\n  noise_stddev: 2.5\n  seed: 17\n";
        let config: Config = serde_yml::from_str(yaml).unwrap();

        assert_eq!(config.log_level, "info");
        assert_eq!(config.synthetic.noise_stddev, 2.5);
        assert_eq!(config.synthetic.seed, Some(17));
        assert_eq!(config.synthetic.brightness, 255.0);
        assert_eq!(config.synthetic.smoothing_sigma, 5.0);
        assert_eq!(config.synthetic.dark_scale, 0.25);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ffc.yaml");

        let config = Config {
            log_level: "debug".to_string(),
            log_dir: Some(PathBuf::from("logs")),
            synthetic: SyntheticFieldConfig::seeded(99),
        };
        config.save(&path).unwrap();

        assert_eq!(Config::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_synthetic_params_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ffc.json");
        std::fs::write(&path, r#"{ "synthetic": { "smoothing_sigma": -1.0 } }"#).unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid config"));
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = Config::from_file(Path::new("/nonexistent/ffc.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }
}
