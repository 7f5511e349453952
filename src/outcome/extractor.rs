use anyhow::{Context, Result};
use serde_json::Value;
use serde_json_path::JsonPath;
use std::path::PathBuf;

use crate::browserstack::AutomateApi;
use crate::browserstack::types::AutomationSession;
use crate::core::models::{DeviceInfo, SessionRecord};
use crate::reporters::OutputLayout;
use crate::reporters::writer::{write_raw_log, write_session_record};
use crate::ui::progress::SessionProgress;

use super::machine;
use super::useragent;

/// Builds are matched against the most recent ones only; there is no paging.
pub const BUILD_WINDOW: u32 = 100;

const USER_AGENT_QUERY: &str = "$.log.entries[*].request.headers[?@.name == 'User-Agent'].value";
const MOZILLA_TOKEN: &str = "Mozilla/5.0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSession {
    pub session_id: String,
    pub public_url: Option<String>,
}

#[derive(Debug)]
pub struct SessionReport {
    pub session_id: String,
    pub path: PathBuf,
    pub record: SessionRecord,
    pub skipped: usize,
}

#[derive(Debug)]
pub struct BuildReport {
    pub fragment: String,
    pub found: usize,
    pub saved: Vec<SessionReport>,
    pub failed: Vec<String>,
}

pub struct OutcomeExtractor<'a> {
    api: &'a dyn AutomateApi,
    layout: OutputLayout,
}

impl<'a> OutcomeExtractor<'a> {
    pub fn new(api: &'a dyn AutomateApi, layout: OutputLayout) -> Self {
        Self { api, layout }
    }

    /// Outcomes of one session, keyed by URL only.
    pub async fn save_session(&self, session_id: &str) -> Result<SessionReport> {
        let logs = self
            .api
            .session_logs(session_id)
            .await
            .with_context(|| format!("Invalid session id {}", session_id))?;

        let scan = machine::scan(&logs);
        let record = SessionRecord {
            outcomes: scan.outcomes,
            ..SessionRecord::default()
        };
        let path = self.layout.session_outcome(session_id);
        write_session_record(&path, &record)?;

        Ok(SessionReport {
            session_id: session_id.to_string(),
            path,
            record,
            skipped: scan.skipped,
        })
    }

    /// Sessions of every recent build whose name contains `fragment`.
    pub async fn resolve_sessions(&self, fragment: &str) -> Result<Vec<ResolvedSession>> {
        let builds = self
            .api
            .builds(BUILD_WINDOW)
            .await
            .context("Failed to list builds")?;

        let mut resolved = Vec::new();
        for build in builds.iter().filter(|b| b.name.contains(fragment)) {
            tracing::info!("Build {} ({}) matches {:?}", build.name, build.hashed_id, fragment);
            let sessions = match self.api.build_sessions(&build.hashed_id).await {
                Ok(sessions) => sessions,
                Err(e) => {
                    tracing::warn!("Skipping build {}: {:#}", build.name, e);
                    continue;
                }
            };

            for session_id in sessions.into_iter().filter_map(|s| s.hashed_id) {
                match self.api.session(&session_id).await {
                    Ok(detail) => resolved.push(ResolvedSession {
                        session_id,
                        public_url: detail.public_url,
                    }),
                    Err(e) => tracing::warn!("Skipping session {}: {:#}", session_id, e),
                }
            }
        }

        Ok(resolved)
    }

    /// Outcomes plus device header for every session of the matching builds.
    pub async fn save_build(&self, fragment: &str) -> Result<BuildReport> {
        let sessions = self.resolve_sessions(fragment).await?;
        Ok(self.build_outcomes(fragment, &sessions).await)
    }

    async fn build_outcomes(&self, fragment: &str, sessions: &[ResolvedSession]) -> BuildReport {
        let progress = SessionProgress::new(sessions.len() as u64, fragment);
        let mut report = BuildReport {
            fragment: fragment.to_string(),
            found: sessions.len(),
            saved: Vec::new(),
            failed: Vec::new(),
        };

        for session in sessions {
            progress.start(&session.session_id);
            match self.save_build_session(fragment, session).await {
                Ok(saved) => {
                    progress.print_success(&format!(
                        "{}: {} outcome(s) -> {}",
                        saved.session_id,
                        saved.record.outcomes.len(),
                        saved.path.display()
                    ));
                    report.saved.push(saved);
                }
                Err(e) => {
                    progress.print_warning(&format!("{}: {:#}", session.session_id, e));
                    report.failed.push(session.session_id.clone());
                }
            }
            progress.advance();
        }
        progress.finish();

        report
    }

    async fn save_build_session(&self, fragment: &str, session: &ResolvedSession) -> Result<SessionReport> {
        let logs = self
            .api
            .session_logs(&session.session_id)
            .await
            .context("Failed to fetch session logs")?;

        let scan = machine::scan(&logs);
        let device_info = match scan.first_session {
            Some(first) => Some(self.device_header(&session.session_id, first).await),
            None => None,
        };
        let record = SessionRecord {
            public_url: session.public_url.clone(),
            device_info,
            outcomes: scan.outcomes,
        };

        let path = self.layout.build_outcome(fragment, &session.session_id);
        write_session_record(&path, &record)?;

        Ok(SessionReport {
            session_id: session.session_id.clone(),
            path,
            record,
            skipped: scan.skipped,
        })
    }

    async fn device_header(&self, session_id: &str, first: AutomationSession) -> DeviceInfo {
        let browser_version = match first.browser_version {
            Some(version) => Some(version),
            None => self.detect_browser_version(session_id).await,
        };
        DeviceInfo {
            device: first.device,
            os: first.os,
            os_version: first.os_version,
            browser: first.browser,
            browser_version,
        }
    }

    /// Browser family and version from the first Mozilla-style `User-Agent`
    /// header in the session's network log.
    pub async fn detect_browser_version(&self, session_id: &str) -> Option<String> {
        let har = match self.api.network_logs(session_id).await {
            Ok(har) => har,
            Err(e) => {
                tracing::warn!("No network logs for {}: {:#}", session_id, e);
                return None;
            }
        };

        let Some(user_agent) = first_browser_user_agent(&har) else {
            tracing::warn!("No browser User-Agent in network logs of {}", session_id);
            return None;
        };

        let version = useragent::browser_version(&user_agent);
        if version.is_none() {
            tracing::warn!("Unrecognized User-Agent for {}: {}", session_id, user_agent);
        }
        version
    }

    /// Raw session logs, unchanged, for one session or a whole build fragment.
    pub async fn save_session_logs(&self, session_id: &str) -> Result<PathBuf> {
        let logs = self
            .api
            .session_logs(session_id)
            .await
            .with_context(|| format!("Invalid session id {}", session_id))?;
        let path = self.layout.session_log(session_id);
        write_raw_log(&path, &logs)?;
        Ok(path)
    }

    pub async fn save_build_logs(&self, fragment: &str) -> Result<Vec<PathBuf>> {
        let sessions = self.resolve_sessions(fragment).await?;
        self.build_logs(fragment, &sessions).await
    }

    async fn build_logs(&self, fragment: &str, sessions: &[ResolvedSession]) -> Result<Vec<PathBuf>> {
        let progress = SessionProgress::new(sessions.len() as u64, fragment);
        let mut written = Vec::new();

        for session in sessions {
            progress.start(&session.session_id);
            match self.api.session_logs(&session.session_id).await {
                Ok(logs) => {
                    let path = self.layout.build_log(fragment, &session.session_id);
                    write_raw_log(&path, &logs)?;
                    written.push(path);
                }
                Err(e) => progress.print_warning(&format!("{}: {:#}", session.session_id, e)),
            }
            progress.advance();
        }
        progress.finish();

        Ok(written)
    }

    /// Outcome record and raw log of one session.
    pub async fn save_all_session(&self, session_id: &str) -> Result<(SessionReport, PathBuf)> {
        let report = self.save_session(session_id).await?;
        let log = self.save_session_logs(session_id).await?;
        Ok((report, log))
    }

    /// Outcome records and raw logs for every session of the matching builds.
    pub async fn save_all_build(&self, fragment: &str) -> Result<(BuildReport, Vec<PathBuf>)> {
        let sessions = self.resolve_sessions(fragment).await?;
        let report = self.build_outcomes(fragment, &sessions).await;
        let logs = self.build_logs(fragment, &sessions).await?;
        Ok((report, logs))
    }
}

fn first_browser_user_agent(har: &Value) -> Option<String> {
    let path = match JsonPath::parse(USER_AGENT_QUERY) {
        Ok(path) => path,
        Err(e) => {
            tracing::error!("Invalid User-Agent query: {}", e);
            return None;
        }
    };

    path.query(har)
        .all()
        .into_iter()
        .filter_map(Value::as_str)
        .find(|ua| ua.contains(MOZILLA_TOKEN))
        .map(String::from)
}
