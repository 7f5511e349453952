use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::models::Target;

const TRACKED_RELEASES: u32 = 10;
const OPERA_VERSIONS: &[f64] = &[12.16, 12.15];

/// Desktop browser versions to keep, per browser.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct VersionRanges {
    pub firefox_versions: Vec<f64>,
    pub chrome_versions: Vec<f64>,
    pub edge_versions: Vec<f64>,
    pub safari_versions: Vec<f64>,
    pub opera_versions: Vec<f64>,
}

impl VersionRanges {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read browser versions file: {:?}", path))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse browser versions file: {:?}", path))
    }

    /// Versions configured for `browser`; `None` means the browser is not in scope.
    pub fn for_browser(&self, browser: &str) -> Option<&[f64]> {
        match browser {
            "firefox" => Some(&self.firefox_versions),
            "chrome" => Some(&self.chrome_versions),
            "edge" => Some(&self.edge_versions),
            "safari" => Some(&self.safari_versions),
            "opera" => Some(&self.opera_versions),
            _ => None,
        }
    }

    /// Mobile targets are always in scope since their browser version cannot be pinned.
    pub fn admits(&self, target: &Target) -> bool {
        if target.is_mobile() {
            return true;
        }
        let Some(version) = target.browser_version.as_deref().and_then(|v| v.trim().parse::<f64>().ok())
        else {
            return false;
        };
        self.for_browser(&target.browser)
            .is_some_and(|versions| versions.contains(&version))
    }

    /// The latest ten releases of each desktop browser found in `targets`.
    pub fn latest_releases(targets: &[Target]) -> Self {
        let mut ranges = Self {
            opera_versions: OPERA_VERSIONS.to_vec(),
            ..Self::default()
        };

        for browser in ["firefox", "chrome", "edge", "safari"] {
            let latest = targets
                .iter()
                .filter(|t| t.browser == browser)
                .filter_map(|t| t.browser_version.as_deref()?.trim().parse::<f64>().ok())
                .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))));

            let Some(latest) = latest else {
                tracing::warn!("No parseable {} versions in the browser matrix", browser);
                continue;
            };
            tracing::info!("Latest {} version: {}", browser, latest);

            let versions = (0..TRACKED_RELEASES)
                .map(|i| ((latest - f64::from(i)) * 100.0).round() / 100.0)
                .collect();
            match browser {
                "firefox" => ranges.firefox_versions = versions,
                "chrome" => ranges.chrome_versions = versions,
                "edge" => ranges.edge_versions = versions,
                _ => ranges.safari_versions = versions,
            }
        }

        ranges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn desktop(browser: &str, version: Option<&str>) -> Target {
        Target {
            os: "Windows".into(),
            os_version: "11".into(),
            browser: browser.into(),
            device: None,
            browser_version: version.map(String::from),
            real_mobile: None,
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn test_admits_only_configured_versions() {
        let ranges: VersionRanges = serde_yaml::from_str(
            "chrome_versions: [120, 119.0]\nfirefox_versions: [121.0]\n",
        )
        .unwrap();

        assert!(ranges.admits(&desktop("chrome", Some("120.0"))));
        assert!(ranges.admits(&desktop("chrome", Some("119.0"))));
        assert!(!ranges.admits(&desktop("chrome", Some("118.0"))));
        assert!(!ranges.admits(&desktop("chrome", Some("121.0 beta"))));
        assert!(!ranges.admits(&desktop("chrome", None)));
        assert!(!ranges.admits(&desktop("yandex", Some("120.0"))));
        assert!(!ranges.admits(&desktop("edge", Some("120.0"))));
    }

    #[test]
    fn test_mobile_is_always_admitted() {
        let mut phone = desktop("chrome", None);
        phone.os = "ios".into();
        phone.device = Some("iPhone 15".into());
        assert!(VersionRanges::default().admits(&phone));
    }

    #[test]
    fn test_latest_releases() {
        let targets = vec![
            desktop("chrome", Some("120.0")),
            desktop("chrome", Some("122.0")),
            desktop("chrome", Some("123.0 beta")),
            desktop("safari", Some("17.3")),
            desktop("firefox", Some("latest")),
        ];

        let ranges = VersionRanges::latest_releases(&targets);
        assert_eq!(ranges.chrome_versions.len(), 10);
        assert_eq!(ranges.chrome_versions[0], 122.0);
        assert_eq!(ranges.chrome_versions[9], 113.0);
        assert_eq!(ranges.safari_versions[1], 16.3);
        assert!(ranges.firefox_versions.is_empty());
        assert_eq!(ranges.opera_versions, vec![12.16, 12.15]);
    }
}
