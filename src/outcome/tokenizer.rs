use serde_json::Value;

use crate::browserstack::types::AutomationSession;
use crate::core::errors::ScanError;

const REQUEST_MARKER: &str = "REQUEST";
const RESPONSE_MARKER: &str = "RESPONSE";
const NAVIGATION_PATH: &str = "/url";
const EXECUTE_SYNC_PATH: &str = "/execute/sync";
const SESSION_MARKER: &str = "\"automation_session\":";

/// `date time REQUEST [date time] METHOD path {json}`
const REQUEST_PAYLOAD_OFFSET: usize = 7;
/// `date time RESPONSE {json}`
const RESPONSE_PAYLOAD_OFFSET: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    NavigationRequested { url: String },
    /// The script pushed its result through `/execute/sync`; the next
    /// response carries it.
    OutcomeArmed,
    Response { payload: String },
}

/// Map one session-log line to at most one event.
pub fn tokenize(line: &str) -> Option<Result<LogEvent, ScanError>> {
    if let Some(at) = line.find(REQUEST_MARKER) {
        let rest = &line[at + REQUEST_MARKER.len()..];
        if rest.contains(NAVIGATION_PATH) {
            // `GET .../url` reads the current URL and carries no body
            let payload = payload_from(line, REQUEST_PAYLOAD_OFFSET);
            if payload.trim().is_empty() {
                return None;
            }
            return Some(navigation(&payload));
        }
        if rest.contains(EXECUTE_SYNC_PATH) {
            return Some(Ok(LogEvent::OutcomeArmed));
        }
        return None;
    }

    if line.contains(RESPONSE_MARKER) {
        return Some(Ok(LogEvent::Response {
            payload: payload_from(line, RESPONSE_PAYLOAD_OFFSET),
        }));
    }

    None
}

fn payload_from(line: &str, offset: usize) -> String {
    line.split(' ').skip(offset).collect::<Vec<_>>().join(" ")
}

fn navigation(payload: &str) -> Result<LogEvent, ScanError> {
    let body: Value = serde_json::from_str(payload)?;
    let url = body
        .get("url")
        .and_then(Value::as_str)
        .ok_or(ScanError::MissingUrl)?;
    Ok(LogEvent::NavigationRequested { url: url.to_string() })
}

/// Pull the automation session the test script embedded in an
/// `/execute/sync` response.
///
/// The response `value` is a string ending in `"automation_session":{...}}`;
/// everything after the last marker, minus the closing brace of the outer
/// object, is the session.
pub fn decode_outcome(payload: &str) -> Result<AutomationSession, ScanError> {
    let body: Value = serde_json::from_str(payload)?;
    let value = body
        .get("value")
        .and_then(Value::as_str)
        .ok_or(ScanError::MissingValue)?;

    let (_, tail) = value.rsplit_once(SESSION_MARKER).ok_or(ScanError::MissingMarker)?;
    let mut chars = tail.chars();
    chars.next_back();
    let session: AutomationSession = serde_json::from_str(chars.as_str())?;

    if session.status.is_none() {
        return Err(ScanError::MissingStatus);
    }
    Ok(session)
}
