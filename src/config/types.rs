use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GlobalConfig {
    pub api: ApiConfig,
    pub browserstack_runner: RunnerConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.browserstack.com".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// SDK configuration file rewritten for every batch.
    pub session_config: PathBuf,
    /// Test program, split with shell rules (e.g. "browserstack-sdk python").
    pub command: String,
    pub test_script: String,
    pub urls_file: String,
    pub targets_src: PathBuf,
    pub build_name: String,
    pub interrupted: bool,
    pub continue_point: Option<String>,
    pub poll_interval_ms: u64,
    pub target_generator: TargetGeneratorConfig,
    pub output_analyzer: OutputAnalyzerConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            session_config: PathBuf::from("browserstack.yml"),
            command: "browserstack-sdk".to_string(),
            test_script: "src/browserstack/test.py".to_string(),
            urls_file: "urls.csv".to_string(),
            targets_src: PathBuf::from("targets/all_targets"),
            build_name: "All_Targets".to_string(),
            interrupted: false,
            continue_point: None,
            poll_interval_ms: 1000,
            target_generator: TargetGeneratorConfig::default(),
            output_analyzer: OutputAnalyzerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TargetGeneratorConfig {
    pub targets_directory: PathBuf,
    pub custom_outfile: Option<PathBuf>,
    pub browser_versions_file: Option<PathBuf>,
    pub output_as_file: bool,
    /// Upper bound on targets per batch (the account's queued-session limit).
    pub entries_per_file: usize,
}

impl Default for TargetGeneratorConfig {
    fn default() -> Self {
        Self {
            targets_directory: PathBuf::from("targets"),
            custom_outfile: None,
            browser_versions_file: None,
            output_as_file: false,
            entries_per_file: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputAnalyzerConfig {
    pub output_directory: PathBuf,
}

impl Default for OutputAnalyzerConfig {
    fn default() -> Self {
        Self {
            output_directory: PathBuf::from("output_data"),
        }
    }
}
