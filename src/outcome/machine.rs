use std::collections::BTreeMap;

use crate::browserstack::types::AutomationSession;
use crate::core::errors::ScanError;
use crate::core::models::Outcome;

use super::tokenizer::{self, LogEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Idle,
    AwaitingOutcome,
}

/// Everything a session log yielded.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Last reported outcome per visited URL.
    pub outcomes: BTreeMap<String, Outcome>,
    /// First decoded session payload; source of the device header.
    pub first_session: Option<AutomationSession>,
    /// Lines that looked relevant but could not be used.
    pub skipped: usize,
}

pub struct LogScanner {
    state: ScanState,
    current_url: Option<String>,
    result: ScanResult,
}

impl Default for LogScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl LogScanner {
    pub fn new() -> Self {
        Self {
            state: ScanState::Idle,
            current_url: None,
            result: ScanResult::default(),
        }
    }

    pub fn feed_line(&mut self, line: &str) {
        match tokenizer::tokenize(line) {
            None => {}
            Some(Ok(event)) => self.apply(event),
            Some(Err(e)) => self.skip(e),
        }
    }

    pub fn apply(&mut self, event: LogEvent) {
        match (self.state, event) {
            (_, LogEvent::NavigationRequested { url }) => {
                self.current_url = Some(url);
            }
            (_, LogEvent::OutcomeArmed) => {
                self.state = ScanState::AwaitingOutcome;
            }
            (ScanState::Idle, LogEvent::Response { .. }) => {}
            (ScanState::AwaitingOutcome, LogEvent::Response { payload }) => {
                self.state = ScanState::Idle;
                if let Err(e) = self.record(&payload) {
                    self.skip(e);
                }
            }
        }
    }

    fn record(&mut self, payload: &str) -> Result<(), ScanError> {
        let session = tokenizer::decode_outcome(payload)?;
        let url = self.current_url.clone().ok_or(ScanError::NoCurrentUrl)?;

        let outcome = Outcome {
            status: session.status.clone().unwrap_or_default(),
            reason: session.reason.clone().unwrap_or_default(),
        };
        tracing::debug!("{} -> {}", url, outcome.status);
        self.result.outcomes.insert(url, outcome);

        if self.result.first_session.is_none() {
            self.result.first_session = Some(session);
        }
        Ok(())
    }

    fn skip(&mut self, reason: ScanError) {
        tracing::warn!("Skipping log line: {}", reason);
        self.result.skipped += 1;
    }

    pub fn finish(self) -> ScanResult {
        self.result
    }
}

/// Run a whole session log through a fresh scanner.
pub fn scan(logs: &str) -> ScanResult {
    let mut scanner = LogScanner::new();
    for line in logs.lines() {
        scanner.feed_line(line);
    }
    scanner.finish()
}
