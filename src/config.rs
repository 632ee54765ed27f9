use crate::error::{Result, XgExtractError};
use crate::export::ExportFormat;
use crate::locator::DEFAULT_PATTERN;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub locator: LocatorConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocatorConfig {
    /// Regular expression the backup file names must match.
    pub pattern: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportConfig {
    pub format: ExportFormat,
    /// Listing destination; derived from the archive name when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<PathBuf>,
    /// Group selection terms; empty selects every group.
    pub groups: Vec<String>,
    /// Allow overwriting an existing repack destination.
    pub overwrite: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locator: LocatorConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_string(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::Text,
            destination: None,
            groups: Vec::new(),
            overwrite: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(XgExtractError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| XgExtractError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| XgExtractError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                // Try to load from default locations
                let default_paths = ["xgextract.toml", ".xgextract.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                // If no config file found, use defaults
                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref pattern) = cli_args.pattern {
            self.locator.pattern = pattern.clone();
        }

        if let Some(format) = cli_args.format {
            self.export.format = format;
        }

        if let Some(ref destination) = cli_args.destination {
            self.export.destination = Some(destination.clone());
        }

        if let Some(ref groups) = cli_args.groups {
            self.export.groups = groups.clone();
        }

        if let Some(overwrite) = cli_args.overwrite {
            self.export.overwrite = overwrite;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| XgExtractError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| XgExtractError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.locator.pattern.trim().is_empty() {
            return Err(XgExtractError::Config {
                message: "Backup filename pattern must not be empty".to_string(),
            });
        }

        if let Err(e) = Regex::new(&self.locator.pattern) {
            return Err(XgExtractError::Config {
                message: format!(
                    "Invalid backup filename pattern '{}': {}",
                    self.locator.pattern, e
                ),
            });
        }

        if self
            .export
            .groups
            .iter()
            .all(|term| term.trim().is_empty())
            && !self.export.groups.is_empty()
        {
            return Err(XgExtractError::Config {
                message: "Group selection must not consist of empty terms".to_string(),
            });
        }

        Ok(())
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub pattern: Option<String>,
    pub format: Option<ExportFormat>,
    pub destination: Option<PathBuf>,
    pub groups: Option<Vec<String>>,
    pub overwrite: Option<bool>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pattern(mut self, pattern: Option<String>) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn with_format(mut self, format: Option<ExportFormat>) -> Self {
        self.format = format;
        self
    }

    pub fn with_destination(mut self, destination: Option<PathBuf>) -> Self {
        self.destination = destination;
        self
    }

    pub fn with_groups(mut self, groups: Option<Vec<String>>) -> Self {
        self.groups = groups;
        self
    }

    pub fn with_overwrite(mut self, overwrite: Option<bool>) -> Self {
        self.overwrite = overwrite;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.locator.pattern, DEFAULT_PATTERN);
        assert_eq!(config.export.format, ExportFormat::Text);
        assert!(config.export.groups.is_empty());
        assert!(!config.export.overwrite);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.locator.pattern = "(unclosed".to_string();
        assert!(config.validate().is_err());

        config.locator.pattern = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_file_operations() {
        let mut config = Config::default();
        config.export.groups = vec!["Servers".to_string()];
        let temp_file = NamedTempFile::new().unwrap();

        config.save_to_file(temp_file.path()).unwrap();

        let loaded_config = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded_config.locator.pattern, config.locator.pattern);
        assert_eq!(loaded_config.export.groups, vec!["Servers"]);
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::default();

        let overrides = CliOverrides::new()
            .with_pattern(Some(r"^weekly-.*\.tar$".to_string()))
            .with_format(Some(ExportFormat::Json))
            .with_groups(Some(vec!["Servers".to_string(), "Mail".to_string()]));

        config.merge_with_cli_args(&overrides);

        assert_eq!(config.locator.pattern, r"^weekly-.*\.tar$");
        assert_eq!(config.export.format, ExportFormat::Json);
        assert_eq!(config.export.groups.len(), 2);
        // Untouched values keep their defaults.
        assert!(!config.export.overwrite);
    }

    #[test]
    fn test_sample_config_generation() {
        let sample = Config::create_sample_config();
        assert!(!sample.is_empty());
        assert!(sample.contains("[locator]"));
        assert!(sample.contains("[export]"));
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let result = Config::load_from_file("/nonexistent/xgextract.toml");
        assert!(matches!(result, Err(XgExtractError::Config { .. })));
    }
}
