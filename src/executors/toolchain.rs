use anyhow::{bail, Result};
use which::which;

pub fn verify_or_bail(tools: &[&str]) -> Result<()> {
    let mut missing = Vec::new();

    for tool in tools {
        match which(tool) {
            Ok(path) => {
                tracing::debug!("Found {}: {:?}", tool, path);
            }
            Err(_) => {
                missing.push(*tool);
            }
        }
    }

    if !missing.is_empty() {
        bail!(
            "Missing required tools: {}. Install them (e.g. `pip install browserstack-sdk`) or set browserstack_runner.command",
            missing.join(", ")
        );
    }

    tracing::info!("All required tools found");
    Ok(())
}
