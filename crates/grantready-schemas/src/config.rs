//! Configuration management
//!
//! Configuration is layered from:
//! - Default values
//! - Configuration files (YAML/JSON/TOML)
//! - Environment variables
//!
//! Copyright (c) 2026 GrantReady Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use crate::loader::cache::CacheConfig;
use crate::logging::LoggingConfig;
use crate::validation::ValidationConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding schema documents
    pub schemas_dir: PathBuf,

    /// Directory holding example payloads
    pub examples_dir: PathBuf,

    /// Where the validation suite writes its report
    pub report_path: PathBuf,

    /// Validation settings
    pub validation: ValidationConfig,

    /// Loader cache settings
    pub cache: CacheConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        let schemas_dir = PathBuf::from("schemas");
        Self {
            examples_dir: schemas_dir.join("examples"),
            report_path: schemas_dir.join("validation-report.json"),
            schemas_dir,
            validation: ValidationConfig::default(),
            cache: CacheConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Serialization format of a configuration file, by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            _ => Err(Error::InvalidFormat {
                path: path.to_path_buf(),
                expected: "yaml, json or toml".to_string(),
            }),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;

        let config = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(&content)?,
            ConfigFormat::Json => serde_json::from_str(&content)?,
            ConfigFormat::Toml => toml::from_str(&content)?,
        };

        debug!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Load configuration from default locations, then apply the environment
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file_from(&Self::default_config_paths());
        config.merge_with_env()?;
        Ok(config)
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        match file {
            Some(path) => {
                let mut config = Self::from_file(path)?;
                config.merge_with_env()?;
                Ok(config)
            }
            None => Self::load(),
        }
    }

    /// First readable configuration among `paths`, or the defaults
    fn load_file_from(paths: &[PathBuf]) -> Self {
        for path in paths.iter().filter(|p| p.exists()) {
            match Self::from_file(path) {
                Ok(config) => return config,
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to load config"),
            }
        }
        Self::default()
    }

    /// Get default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("grantready.toml"),
            PathBuf::from("grantready.yaml"),
            PathBuf::from("grantready.json"),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            let grantready_dir = config_dir.join("grantready");
            paths.push(grantready_dir.join("config.toml"));
            paths.push(grantready_dir.join("config.yaml"));
            paths.push(grantready_dir.join("config.json"));
        }

        paths
    }

    /// Apply overrides from the process environment
    pub fn merge_with_env(&mut self) -> Result<()> {
        self.apply_env(std::env::vars())
    }

    /// Apply `GRANTREADY_*` overrides found in `vars`, then the logging ones
    pub fn apply_env<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: Vec<(String, String)> = vars.into_iter().collect();

        for (key, value) in &vars {
            match key.as_str() {
                "GRANTREADY_SCHEMAS_DIR" => self.schemas_dir = PathBuf::from(value),
                "GRANTREADY_EXAMPLES_DIR" => self.examples_dir = PathBuf::from(value),
                "GRANTREADY_REPORT_PATH" => self.report_path = PathBuf::from(value),
                "GRANTREADY_VALIDATION_MODE" => {
                    self.validation.mode = value.parse().map_err(Error::config)?;
                }
                _ => {}
            }
        }

        self.logging.apply_env(vars);
        Ok(())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = match ConfigFormat::from_path(path)? {
            ConfigFormat::Yaml => serde_yaml::to_string(self)?,
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogFormat;
    use crate::validation::ValidationMode;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.schemas_dir, PathBuf::from("schemas"));
        assert_eq!(config.examples_dir, PathBuf::from("schemas/examples"));
        assert_eq!(config.validation.mode, ValidationMode::Strict);
        assert!(config.cache.enabled);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("grantready.yaml");
        std::fs::write(
            &path,
            "schemas_dir: /srv/schemas\nvalidation:\n  mode: basic\n  business_rules: true\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.schemas_dir, PathBuf::from("/srv/schemas"));
        assert_eq!(config.examples_dir, PathBuf::from("schemas/examples"));
        assert_eq!(config.validation.mode, ValidationMode::Basic);
        assert!(config.validation.business_rules);
        assert!(config.validation.validate_formats);
    }

    #[test]
    fn test_toml_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("grantready.toml");
        std::fs::write(
            &path,
            "report_path = \"out/report.json\"\n\n[cache]\nmax_entries = 8\n\n[logging]\nformat = \"json\"\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.report_path, PathBuf::from("out/report.json"));
        assert_eq!(config.cache.max_entries, 8);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let err = Config::from_file(Path::new("grantready.ini")).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat { .. }));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.validation = ValidationConfig::partial().with_business_rules();

        for name in ["nested/config.json", "config.yaml"] {
            let path = dir.path().join(name);
            config.save(&path).unwrap();
            assert_eq!(Config::from_file(&path).unwrap(), config);
        }
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env(vec![
                ("GRANTREADY_SCHEMAS_DIR".to_string(), "/data/schemas".to_string()),
                ("GRANTREADY_VALIDATION_MODE".to_string(), "partial".to_string()),
                ("GRANTREADY_LOG_FORMAT".to_string(), "full".to_string()),
            ])
            .unwrap();

        assert_eq!(config.schemas_dir, PathBuf::from("/data/schemas"));
        assert_eq!(config.validation.mode, ValidationMode::Partial);
        assert_eq!(config.logging.format, LogFormat::Full);

        let err = config
            .apply_env(vec![("GRANTREADY_VALIDATION_MODE".to_string(), "lenient".to_string())])
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let broken = dir.path().join("grantready.json");
        std::fs::write(&broken, "{ nope").unwrap();

        let config = Config::load_file_from(&[dir.path().join("missing.yaml"), broken]);
        assert_eq!(config, Config::default());
    }
}
