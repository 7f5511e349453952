use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use super::types::GlobalConfig;
use crate::core::errors::PhishError;

const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "./config.yml",
    "./config/config.yml",
];

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from `custom_path`, or from the first default location that parses
    pub fn load_with_custom_path(custom_path: Option<&Path>) -> Result<GlobalConfig> {
        // an explicit path must load
        if let Some(path) = custom_path {
            return Self::load_from_file(path)
                .with_context(|| format!("Failed to load config from custom path: {:?}", path));
        }

        for path in Self::candidate_paths() {
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => {
                        tracing::info!("Loaded configuration from: {:?}", path);
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {:#}", path, e);
                        continue;
                    }
                }
            }
        }

        tracing::info!("No configuration file found, using default settings");
        let config = GlobalConfig::default();
        Self::validate_config(&config)?;
        Ok(config)
    }

    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = DEFAULT_CONFIG_PATHS.iter().map(PathBuf::from).collect();
        if let Some(dirs) = ProjectDirs::from("io", "mobile-phish", "mobile-phish") {
            paths.push(dirs.config_dir().join("config.yml"));
        }
        paths
    }

    /// Load configuration from a specific file
    fn load_from_file(path: &Path) -> Result<GlobalConfig> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: GlobalConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML config: {:?}", path))?;

        Self::validate_config(&config)?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate_config(config: &GlobalConfig) -> Result<()> {
        let runner = &config.browserstack_runner;

        if config.api.base_url.trim().is_empty() {
            return Err(PhishError::Config("api.base_url cannot be empty".into()).into());
        }

        if runner.target_generator.entries_per_file == 0 {
            return Err(PhishError::Config("entries_per_file must be greater than 0".into()).into());
        }

        if runner.build_name.trim().is_empty() {
            return Err(PhishError::Config("build_name cannot be empty".into()).into());
        }

        if runner.command.trim().is_empty() {
            return Err(PhishError::Config("runner command cannot be empty".into()).into());
        }

        if runner.interrupted && runner.continue_point.is_none() {
            return Err(PhishError::Config(
                "interrupted runs need a continue_point to resume from".into(),
            )
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_are_valid() {
        let config = GlobalConfig::default();
        ConfigLoader::validate_config(&config).unwrap();
        assert_eq!(config.api.base_url, "https://api.browserstack.com");
        assert_eq!(config.browserstack_runner.poll_interval_ms, 1000);
        assert_eq!(config.browserstack_runner.target_generator.entries_per_file, 5);
    }

    #[test]
    fn test_load_custom_config() {
        let temp_file = NamedTempFile::new().unwrap();
        let config_content = r#"
browserstack_runner:
  test_script: tests/visit.py
  urls_file: data/urls.csv
  targets_src: targets/android
  build_name: Android_Run
  interrupted: true
  continue_point: 5.yml
  target_generator:
    entries_per_file: 25
    browser_versions_file: targets/browser_versions.yml
  output_analyzer:
    output_directory: results
"#;
        fs::write(&temp_file, config_content).unwrap();

        let config = ConfigLoader::load_with_custom_path(Some(temp_file.path())).unwrap();
        let runner = &config.browserstack_runner;
        assert_eq!(runner.test_script, "tests/visit.py");
        assert_eq!(runner.targets_src, PathBuf::from("targets/android"));
        assert_eq!(runner.continue_point.as_deref(), Some("5.yml"));
        assert_eq!(runner.target_generator.entries_per_file, 25);
        assert!(runner.target_generator.browser_versions_file.is_some());
        assert_eq!(runner.output_analyzer.output_directory, PathBuf::from("results"));
        // untouched sections keep their defaults
        assert_eq!(runner.command, "browserstack-sdk");
        assert_eq!(config.api.timeout_secs, 30);
    }

    #[test]
    fn test_validation_errors() {
        let temp_file = NamedTempFile::new().unwrap();
        let invalid_config = r#"
browserstack_runner:
  target_generator:
    entries_per_file: 0
"#;
        fs::write(&temp_file, invalid_config).unwrap();

        let result = ConfigLoader::load_with_custom_path(Some(temp_file.path()));
        assert!(result.is_err());
        assert!(format!("{:#}", result.unwrap_err()).contains("entries_per_file must be greater than 0"));
    }

    #[test]
    fn test_interrupted_requires_continue_point() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(&temp_file, "browserstack_runner:\n  interrupted: true\n").unwrap();

        let err = ConfigLoader::load_with_custom_path(Some(temp_file.path())).unwrap_err();
        assert!(format!("{:#}", err).contains("continue_point"));
    }

    #[test]
    fn test_missing_custom_path_is_an_error() {
        let result = ConfigLoader::load_with_custom_path(Some(Path::new("/nonexistent/config.yml")));
        assert!(result.is_err());
    }
}
