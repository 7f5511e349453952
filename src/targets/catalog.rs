use serde_json::{Map, Value};

use super::versions::VersionRanges;
use crate::core::models::{Platform, Target};

/// Turn raw matrix entries into targets, in fetch order.
///
/// Entries missing `os`, `os_version` or `browser` cannot be launched and are skipped.
pub fn parse_entries(entries: Vec<Map<String, Value>>) -> Vec<Target> {
    entries
        .into_iter()
        .filter_map(|entry| match Target::from_raw(entry) {
            Ok(target) => Some(target),
            Err(e) => {
                tracing::warn!("Skipping malformed matrix entry: {}", e);
                None
            }
        })
        .collect()
}

pub fn filter_platform(targets: Vec<Target>, platform: Platform) -> Vec<Target> {
    match platform.os_sentinel() {
        None => targets,
        Some(os) => targets.into_iter().filter(|t| t.os == os).collect(),
    }
}

pub fn scope_versions(targets: Vec<Target>, ranges: &VersionRanges) -> Vec<Target> {
    targets.into_iter().filter(|t| ranges.admits(t)).collect()
}

/// Full pipeline from raw entries to the ordered target list.
pub fn build_catalog(
    entries: Vec<Map<String, Value>>,
    platform: Platform,
    ranges: Option<&VersionRanges>,
) -> Vec<Target> {
    let targets = filter_platform(parse_entries(entries), platform);
    match ranges {
        Some(ranges) => scope_versions(targets, ranges),
        None => targets,
    }
}
