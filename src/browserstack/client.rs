use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::time::Duration;

use super::types::{AutomationSession, Build, BuildEnvelope, PlanStatus, SessionEnvelope};
use crate::config::types::ApiConfig;
use crate::core::errors::PhishError;

const USERNAME_VAR: &str = "BROWSERSTACK_USERNAME";
const ACCESS_KEY_VAR: &str = "BROWSERSTACK_ACCESS_KEY";

/// The Automate REST calls this tool depends on.
#[async_trait]
pub trait AutomateApi: Send + Sync {
    /// Raw browser-matrix entries, nulls still present.
    async fn browsers(&self) -> Result<Vec<Map<String, Value>>>;
    async fn plan(&self) -> Result<PlanStatus>;
    /// Most recent builds first, at most `limit`.
    async fn builds(&self, limit: u32) -> Result<Vec<Build>>;
    async fn build_sessions(&self, build_id: &str) -> Result<Vec<AutomationSession>>;
    async fn session(&self, session_id: &str) -> Result<AutomationSession>;
    /// Newline-delimited text log of the session.
    async fn session_logs(&self, session_id: &str) -> Result<String>;
    /// HAR document captured for the session.
    async fn network_logs(&self, session_id: &str) -> Result<Value>;
}

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub access_key: String,
}

impl Credentials {
    pub fn from_env() -> Result<Self, PhishError> {
        let username = std::env::var(USERNAME_VAR)
            .map_err(|_| PhishError::MissingCredential(USERNAME_VAR))?;
        let access_key = std::env::var(ACCESS_KEY_VAR)
            .map_err(|_| PhishError::MissingCredential(ACCESS_KEY_VAR))?;
        Ok(Self { username, access_key })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("access_key", &"<redacted>")
            .finish()
    }
}

pub struct BrowserStackClient {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

impl BrowserStackClient {
    pub fn new(config: &ApiConfig, credentials: Credentials) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("mobile-phish/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| PhishError::Http { endpoint: config.base_url.clone(), source })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/automate/{}", self.base_url, path)
    }

    async fn get_text(&self, path: &str) -> Result<String> {
        let endpoint = self.endpoint(path);
        tracing::debug!("GET {}", endpoint);

        let http_err = |source| PhishError::Http { endpoint: endpoint.clone(), source };
        let response = self
            .client
            .get(&endpoint)
            .basic_auth(&self.credentials.username, Some(&self.credentials.access_key))
            .send()
            .await
            .map_err(http_err)?
            .error_for_status()
            .map_err(http_err)?;

        Ok(response.text().await.map_err(http_err)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.get_text(path).await?;
        serde_json::from_str(&body)
            .map_err(|source| PhishError::Payload { endpoint: self.endpoint(path), source }.into())
    }
}

#[async_trait]
impl AutomateApi for BrowserStackClient {
    async fn browsers(&self) -> Result<Vec<Map<String, Value>>> {
        self.get_json("browsers.json").await
    }

    async fn plan(&self) -> Result<PlanStatus> {
        self.get_json("plan.json").await
    }

    async fn builds(&self, limit: u32) -> Result<Vec<Build>> {
        let builds: Vec<BuildEnvelope> = self.get_json(&format!("builds.json?limit={}", limit)).await?;
        Ok(builds.into_iter().map(|b| b.automation_build).collect())
    }

    async fn build_sessions(&self, build_id: &str) -> Result<Vec<AutomationSession>> {
        let sessions: Vec<SessionEnvelope> =
            self.get_json(&format!("builds/{}/sessions.json", build_id)).await?;
        Ok(sessions.into_iter().map(|s| s.automation_session).collect())
    }

    async fn session(&self, session_id: &str) -> Result<AutomationSession> {
        let envelope: SessionEnvelope = self.get_json(&format!("sessions/{}.json", session_id)).await?;
        Ok(envelope.automation_session)
    }

    async fn session_logs(&self, session_id: &str) -> Result<String> {
        self.get_text(&format!("sessions/{}/logs", session_id)).await
    }

    async fn network_logs(&self, session_id: &str) -> Result<Value> {
        self.get_json(&format!("sessions/{}/networklogs", session_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> BrowserStackClient {
        let config = ApiConfig { base_url: base_url.to_string(), timeout_secs: 5 };
        let credentials = Credentials { username: "user".into(), access_key: "secret".into() };
        BrowserStackClient::new(&config, credentials).unwrap()
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let c = client("https://api.browserstack.com/");
        assert_eq!(c.endpoint("plan.json"), "https://api.browserstack.com/automate/plan.json");
        assert_eq!(
            c.endpoint("sessions/abc/logs"),
            "https://api.browserstack.com/automate/sessions/abc/logs"
        );
    }

    #[test]
    fn test_debug_redacts_access_key() {
        let credentials = Credentials { username: "user".into(), access_key: "secret".into() };
        let printed = format!("{:?}", credentials);
        assert!(printed.contains("user"));
        assert!(!printed.contains("secret"));
    }
}
