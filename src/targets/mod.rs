//! Target catalog generation from the Automate browser matrix.

pub mod catalog;
pub mod versions;
pub mod writer;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::browserstack::AutomateApi;
use crate::config::TargetGeneratorConfig;
use crate::core::models::Platform;
use crate::utils::fs::write_generated_yaml;
use versions::VersionRanges;

#[derive(Debug)]
pub struct GenerationReport {
    pub platform: Platform,
    pub fetched: usize,
    pub kept: usize,
    pub files: Vec<PathBuf>,
}

/// Fetch the matrix, filter it for `platform`, and write it out as configured.
///
/// `versions_override` takes precedence over the configured browser versions file.
pub async fn generate_targets(
    api: &dyn AutomateApi,
    config: &TargetGeneratorConfig,
    platform: Platform,
    versions_override: Option<&Path>,
) -> Result<GenerationReport> {
    let ranges = versions_override
        .or(config.browser_versions_file.as_deref())
        .and_then(|path| match VersionRanges::load(path) {
            Ok(ranges) => Some(ranges),
            Err(e) => {
                tracing::warn!("{:#}; keeping all browser versions", e);
                None
            }
        });

    let entries = api.browsers().await.context("Failed to fetch the browser matrix")?;
    let fetched = entries.len();
    let targets = catalog::build_catalog(entries, platform, ranges.as_ref());
    tracing::info!("{} of {} matrix entries kept for {}", targets.len(), fetched, platform);

    let location = config
        .custom_outfile
        .clone()
        .unwrap_or_else(|| config.targets_directory.join(platform.output_name()));

    let files = if config.output_as_file {
        vec![writer::write_single(&targets, &location)?]
    } else {
        writer::write_batches(&targets, &location, config.entries_per_file)?
    };

    Ok(GenerationReport { platform, fetched, kept: targets.len(), files })
}

/// Derive a browser versions file from the latest releases in the matrix.
pub async fn scope_versions(api: &dyn AutomateApi, config: &TargetGeneratorConfig) -> Result<(PathBuf, VersionRanges)> {
    let entries = api.browsers().await.context("Failed to fetch the browser matrix")?;
    let targets = catalog::parse_entries(entries);
    let ranges = VersionRanges::latest_releases(&targets);

    let path = config.targets_directory.join("browser_versions.yml");
    write_generated_yaml(&path, "scope-versions", &ranges)?;
    Ok((path, ranges))
}
