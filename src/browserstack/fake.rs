use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::client::AutomateApi;
use super::types::{AutomationSession, Build, PlanStatus};

/// In-memory Automate API. Unknown identifiers fail the way a 404 would.
#[derive(Default)]
pub struct FakeApi {
    pub browsers: Vec<Value>,
    /// `parallel_sessions_running` values handed out in order; 0 once drained.
    pub running: Mutex<VecDeque<u32>>,
    pub plan_calls: AtomicUsize,
    pub builds: Vec<Build>,
    pub builds_calls: AtomicUsize,
    pub build_sessions: HashMap<String, Vec<AutomationSession>>,
    pub sessions: HashMap<String, AutomationSession>,
    pub logs: HashMap<String, String>,
    pub network_logs: HashMap<String, Value>,
    pub network_log_calls: AtomicUsize,
}

impl FakeApi {
    pub fn with_running(counts: &[u32]) -> Self {
        Self {
            running: Mutex::new(counts.iter().copied().collect()),
            ..Self::default()
        }
    }

    pub fn add_session(&mut self, build_id: &str, session_id: &str, logs: &str) {
        let session = AutomationSession {
            hashed_id: Some(session_id.to_string()),
            public_url: Some(format!("https://automate.example/sessions/{}", session_id)),
            ..AutomationSession::default()
        };
        self.build_sessions
            .entry(build_id.to_string())
            .or_default()
            .push(session.clone());
        self.sessions.insert(session_id.to_string(), session);
        self.logs.insert(session_id.to_string(), logs.to_string());
    }
}

#[async_trait]
impl AutomateApi for FakeApi {
    async fn browsers(&self) -> Result<Vec<Map<String, Value>>> {
        self.browsers
            .iter()
            .map(|v| v.as_object().cloned().ok_or_else(|| anyhow!("matrix entry is not an object")))
            .collect()
    }

    async fn plan(&self) -> Result<PlanStatus> {
        self.plan_calls.fetch_add(1, Ordering::SeqCst);
        let running = self.running.lock().unwrap().pop_front().unwrap_or(0);
        Ok(PlanStatus { parallel_sessions_running: running, ..PlanStatus::default() })
    }

    async fn builds(&self, limit: u32) -> Result<Vec<Build>> {
        self.builds_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.builds.iter().take(limit as usize).cloned().collect())
    }

    async fn build_sessions(&self, build_id: &str) -> Result<Vec<AutomationSession>> {
        self.build_sessions
            .get(build_id)
            .cloned()
            .ok_or_else(|| anyhow!("404: unknown build {}", build_id))
    }

    async fn session(&self, session_id: &str) -> Result<AutomationSession> {
        self.sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| anyhow!("404: unknown session {}", session_id))
    }

    async fn session_logs(&self, session_id: &str) -> Result<String> {
        self.logs
            .get(session_id)
            .cloned()
            .ok_or_else(|| anyhow!("404: no logs for {}", session_id))
    }

    async fn network_logs(&self, session_id: &str) -> Result<Value> {
        self.network_log_calls.fetch_add(1, Ordering::SeqCst);
        self.network_logs
            .get(session_id)
            .cloned()
            .ok_or_else(|| anyhow!("404: no network logs for {}", session_id))
    }
}
