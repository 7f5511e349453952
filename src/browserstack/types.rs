use serde::{Deserialize, Serialize};

/// `GET /automate/plan.json`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PlanStatus {
    pub parallel_sessions_running: u32,
    #[serde(default)]
    pub parallel_sessions_max_allowed: Option<u32>,
    #[serde(default)]
    pub queued_sessions: Option<u32>,
    #[serde(default)]
    pub queued_sessions_max_allowed: Option<u32>,
    #[serde(default)]
    pub automate_plan: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BuildEnvelope {
    pub automation_build: Build,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Build {
    pub name: String,
    pub hashed_id: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SessionEnvelope {
    pub automation_session: AutomationSession,
}

/// Session object as returned by the session endpoints, and as embedded by
/// the test script in its `/execute/sync` response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AutomationSession {
    pub hashed_id: Option<String>,
    pub name: Option<String>,
    pub build_name: Option<String>,
    pub status: Option<String>,
    pub reason: Option<String>,
    pub device: Option<String>,
    pub os: Option<String>,
    pub os_version: Option<String>,
    pub browser: Option<String>,
    pub browser_version: Option<String>,
    pub public_url: Option<String>,
}
