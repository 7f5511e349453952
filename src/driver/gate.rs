use anyhow::{Context, Result};
use std::time::Duration;

use crate::browserstack::AutomateApi;
use crate::ui::printer;

/// Block until the account reports no running parallel sessions.
///
/// Polls forever at a fixed interval; returns how many times it had to wait.
pub async fn wait_until_idle(api: &dyn AutomateApi, interval: Duration) -> Result<u64> {
    let mut waited = 0u64;
    loop {
        let plan = api.plan().await.context("Failed to poll plan status")?;
        if plan.parallel_sessions_running == 0 {
            return Ok(waited);
        }
        printer::print_gate_wait(plan.parallel_sessions_running, waited);
        tokio::time::sleep(interval).await;
        waited += 1;
    }
}
