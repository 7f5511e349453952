use thiserror::Error;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecError {
    pub tool: String,
    pub args: Vec<String>,
    pub cwd: String,
    pub exit_code: Option<i32>,
    pub stderr_tail: String,
    pub duration_ms: u128,
}

#[derive(Error, Debug)]
pub enum PhishError {
    #[error("execution failed: {0:?}")]
    Exec(ExecError),

    #[error("missing credential: environment variable {0} is not set")]
    MissingCredential(&'static str),

    #[error("request to {endpoint} failed: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected payload from {endpoint}: {source}")]
    Payload {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("session config {path}: {reason}")]
    SessionConfig { path: String, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a single log line could not contribute to a session record.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("malformed JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("navigation payload has no string `url` field")]
    MissingUrl,

    #[error("response payload has no string `value` field")]
    MissingValue,

    #[error("response value has no \"automation_session\": marker")]
    MissingMarker,

    #[error("automation session has no `status`")]
    MissingStatus,

    #[error("outcome arrived before any navigation request")]
    NoCurrentUrl,
}
