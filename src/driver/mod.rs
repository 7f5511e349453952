//! Batched test runs: one batch of targets at a time, gated on the account
//! having no sessions in flight.

pub mod batches;
pub mod gate;
pub mod session_config;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::browserstack::AutomateApi;
use crate::config::RunnerConfig;
use crate::core::errors::PhishError;
use crate::executors::{command, toolchain};
use crate::ui::printer;
use crate::utils::ids;
use batches::BatchFile;
use session_config::SessionConfig;

/// Runs the tests for one batch once the session config points at it.
#[async_trait]
pub trait BatchExecutor: Send + Sync {
    async fn execute(&self, batch: &BatchFile) -> Result<()>;
}

/// `{command} {test_script} {urls_file}`, e.g. `browserstack-sdk test.py urls.csv`.
pub struct SdkExecutor {
    program: String,
    args: Vec<String>,
    cwd: PathBuf,
}

impl SdkExecutor {
    pub fn from_config(runner: &RunnerConfig) -> Result<Self> {
        let mut words = shell_words::split(&runner.command)
            .map_err(|e| PhishError::Config(format!("runner command: {}", e)))?;
        if words.is_empty() {
            return Err(PhishError::Config("runner command cannot be empty".into()).into());
        }
        let program = words.remove(0);
        words.push(runner.test_script.clone());
        words.push(runner.urls_file.clone());

        Ok(Self { program, args: words, cwd: PathBuf::from(".") })
    }

    pub fn verify(&self) -> Result<()> {
        toolchain::verify_or_bail(&[self.program.as_str()])
    }
}

#[async_trait]
impl BatchExecutor for SdkExecutor {
    async fn execute(&self, batch: &BatchFile) -> Result<()> {
        let result = command::execute_streaming(&self.program, &self.args, &self.cwd).await?;
        if result.success() {
            tracing::info!(
                "{} finished batch {} in {}ms (pid {:?})",
                self.program, batch.name, result.duration_ms, result.pid
            );
        } else {
            // the SDK reports per-session results itself; a failing batch does not stop the run
            let failure = result.to_exec_error(&self.program, &self.args, &self.cwd);
            tracing::warn!("Batch {} exited unsuccessfully: {:?}", batch.name, failure);
        }
        Ok(())
    }
}

/// What one driver invocation did, persisted so outcomes can be pulled later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub build_name: String,
    pub unique_token: String,
    pub base_name: String,
    pub targets_src: PathBuf,
    pub resumed_from: Option<String>,
    pub batches: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

pub struct RunDriver<'a> {
    api: &'a dyn AutomateApi,
    executor: &'a dyn BatchExecutor,
    runner: &'a RunnerConfig,
}

impl<'a> RunDriver<'a> {
    pub fn new(api: &'a dyn AutomateApi, executor: &'a dyn BatchExecutor, runner: &'a RunnerConfig) -> Self {
        Self { api, executor, runner }
    }

    /// Run every selected batch under one build name, then hand the session
    /// config back in its original state.
    pub async fn run(&self, mut session: SessionConfig, token: &str) -> Result<RunManifest> {
        let started_at = Utc::now();
        let build_name = ids::build_name(token, &self.runner.build_name);
        let resumed_from = if self.runner.interrupted {
            self.runner.continue_point.clone()
        } else {
            None
        };

        let selected = batches::select_from(
            batches::list_batches(&self.runner.targets_src)?,
            resumed_from.as_deref(),
        );
        let interval = Duration::from_millis(self.runner.poll_interval_ms);
        tracing::info!("Build {}: {} batches from {:?}", build_name, selected.len(), self.runner.targets_src);

        let mut processed = Vec::with_capacity(selected.len());
        for (position, batch) in selected.iter().enumerate() {
            let platforms = batch.load()?;
            session
                .apply_batch(&build_name, &platforms)
                .with_context(|| format!("Failed to stage batch {} in {:?}", batch.name, session.path()))?;

            let waited = gate::wait_until_idle(self.api, interval).await?;
            if waited > 0 {
                tracing::info!("Account idle after {} polls", waited);
            }

            printer::print_batch_header(position + 1, selected.len(), &batch.name, platforms.len());
            self.executor.execute(batch).await?;
            processed.push(batch.name.clone());
        }

        session.restore()?;

        Ok(RunManifest {
            build_name,
            unique_token: token.to_string(),
            base_name: self.runner.build_name.clone(),
            targets_src: self.runner.targets_src.clone(),
            resumed_from,
            batches: processed,
            started_at,
            finished_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browserstack::fake::FakeApi;
    use crate::core::models::Target;
    use serde_yaml::{Mapping, Value};
    use std::fs;
    use std::sync::Mutex;
    use std::sync::atomic::Ordering;
    use tempfile::{tempdir, TempDir};

    const SDK_CONFIG: &str = "# sdk settings\nuserName: someone\nbuildName: unset\nplatforms: []\nparallelsPerPlatform: 1\n";

    /// Records what the SDK would have seen for each batch.
    struct Recorder {
        config_path: PathBuf,
        seen: Mutex<Vec<(String, Mapping)>>,
        fail_on: Option<String>,
    }

    impl Recorder {
        fn new(config_path: PathBuf) -> Self {
            Self { config_path, seen: Mutex::new(Vec::new()), fail_on: None }
        }
    }

    #[async_trait]
    impl BatchExecutor for Recorder {
        async fn execute(&self, batch: &BatchFile) -> Result<()> {
            let doc: Mapping = serde_yaml::from_str(&fs::read_to_string(&self.config_path)?)?;
            self.seen.lock().unwrap().push((batch.name.clone(), doc));
            if self.fail_on.as_deref() == Some(batch.name.as_str()) {
                anyhow::bail!("sdk crashed");
            }
            Ok(())
        }
    }

    fn target(device: &str) -> Target {
        Target {
            os: "android".into(),
            os_version: "14.0".into(),
            browser: "chrome".into(),
            device: Some(device.into()),
            browser_version: None,
            real_mobile: Some(true),
            extra: Default::default(),
        }
    }

    fn workspace(batch_names: &[&str]) -> (TempDir, RunnerConfig) {
        let tmp = tempdir().unwrap();
        let targets = tmp.path().join("targets");
        fs::create_dir_all(&targets).unwrap();
        for name in batch_names {
            let batch = vec![target(&format!("device-{}", name))];
            fs::write(targets.join(name), serde_yaml::to_string(&batch).unwrap()).unwrap();
        }
        fs::write(tmp.path().join("browserstack.yml"), SDK_CONFIG).unwrap();

        let runner = RunnerConfig {
            session_config: tmp.path().join("browserstack.yml"),
            targets_src: targets,
            build_name: "Android_Run".into(),
            poll_interval_ms: 0,
            ..RunnerConfig::default()
        };
        (tmp, runner)
    }

    #[tokio::test]
    async fn test_runs_batches_in_order_and_restores_config() -> Result<()> {
        let (_tmp, runner) = workspace(&["3.yml", "0.yml", "1.yml"]);
        let api = FakeApi::with_running(&[2, 0]);
        let recorder = Recorder::new(runner.session_config.clone());
        let driver = RunDriver::new(&api, &recorder, &runner);

        let manifest = driver.run(SessionConfig::load(&runner.session_config)?, "TOKEN123").await?;

        assert_eq!(manifest.build_name, "TOKEN123_Android_Run");
        assert_eq!(manifest.batches, vec!["0.yml", "1.yml", "3.yml"]);
        assert_eq!(api.plan_calls.load(Ordering::SeqCst), 4);

        let seen = recorder.seen.lock().unwrap();
        for (name, doc) in seen.iter() {
            assert_eq!(doc.get("buildName").and_then(Value::as_str), Some("TOKEN123_Android_Run"));
            let platforms: Vec<Target> = serde_yaml::from_value(doc.get("platforms").cloned().unwrap())?;
            assert_eq!(platforms, vec![target(&format!("device-{}", name))]);
            assert_eq!(doc.get("parallelsPerPlatform").and_then(Value::as_u64), Some(1));
        }

        assert_eq!(fs::read_to_string(&runner.session_config)?, SDK_CONFIG);
        Ok(())
    }

    #[tokio::test]
    async fn test_resume_from_continue_point() -> Result<()> {
        let (_tmp, mut runner) = workspace(&["0.yml", "3.yml", "5.yml", "9.yml"]);
        runner.interrupted = true;
        runner.continue_point = Some("5.yml".into());
        let api = FakeApi::default();
        let recorder = Recorder::new(runner.session_config.clone());

        let manifest = RunDriver::new(&api, &recorder, &runner)
            .run(SessionConfig::load(&runner.session_config)?, "tok")
            .await?;

        assert_eq!(manifest.batches, vec!["5.yml", "9.yml"]);
        assert_eq!(manifest.resumed_from.as_deref(), Some("5.yml"));
        let names: Vec<String> = recorder.seen.lock().unwrap().iter().map(|(n, _)| n.clone()).collect();
        assert_eq!(names, vec!["5.yml", "9.yml"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_failure_mid_run_still_restores_config() {
        let (_tmp, runner) = workspace(&["0.yml", "1.yml", "2.yml"]);
        let api = FakeApi::default();
        let mut recorder = Recorder::new(runner.session_config.clone());
        recorder.fail_on = Some("1.yml".into());

        let session = SessionConfig::load(&runner.session_config).unwrap();
        let result = RunDriver::new(&api, &recorder, &runner).run(session, "tok").await;

        assert!(result.is_err());
        assert_eq!(recorder.seen.lock().unwrap().len(), 2);
        assert_eq!(fs::read_to_string(&runner.session_config).unwrap(), SDK_CONFIG);
    }

    #[test]
    fn test_sdk_executor_command_line() {
        let runner = RunnerConfig {
            command: "browserstack-sdk python3 -u".into(),
            test_script: "visit.py".into(),
            urls_file: "urls.csv".into(),
            ..RunnerConfig::default()
        };
        let executor = SdkExecutor::from_config(&runner).unwrap();
        assert_eq!(executor.program, "browserstack-sdk");
        assert_eq!(executor.args, vec!["python3", "-u", "visit.py", "urls.csv"]);
    }
}
