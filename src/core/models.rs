use std::collections::BTreeMap;
use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Platform selector for target generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Platform {
    All,
    Android,
    Ios,
    Windows,
    Macosx,
}

impl Platform {
    /// Value of the matrix entry's `os` field for this platform. `None` for `All`.
    pub fn os_sentinel(self) -> Option<&'static str> {
        match self {
            Platform::All => None,
            Platform::Android => Some("android"),
            Platform::Ios => Some("ios"),
            Platform::Windows => Some("Windows"),
            Platform::Macosx => Some("OS X"),
        }
    }

    /// Default output name under the targets directory.
    pub fn output_name(self) -> &'static str {
        match self {
            Platform::All => "all_targets",
            Platform::Android => "android",
            Platform::Ios => "ios",
            Platform::Windows => "windows",
            Platform::Macosx => "macosx",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.output_name())
    }
}

/// One device/OS/browser combination from the browser matrix.
///
/// Absent values are never serialized: the SDK rejects `null` fields in
/// its `platforms` list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub os: String,
    pub os_version: String,
    pub browser: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_mobile: Option<bool>,
    /// Provider fields this crate does not interpret, kept verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Target {
    /// Build a target from a raw matrix entry, dropping null-valued fields first.
    pub fn from_raw(mut entry: Map<String, Value>) -> serde_json::Result<Self> {
        elide_nulls(&mut entry);
        serde_json::from_value(Value::Object(entry))
    }

    pub fn is_mobile(&self) -> bool {
        self.os == "android" || self.os == "ios"
    }
}

pub fn elide_nulls(entry: &mut Map<String, Value>) {
    entry.retain(|_, value| !value.is_null());
}

/// Outcome the test script reported for one visited URL.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub status: String,
    pub reason: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub device: Option<String>,
    pub os: Option<String>,
    pub os_version: Option<String>,
    pub browser: Option<String>,
    pub browser_version: Option<String>,
}

/// Structured result for one session, as persisted to JSON.
///
/// Single-session extraction leaves `public_url` and `device_info` unset so
/// the file holds only the URL map.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SessionRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_info: Option<DeviceInfo>,
    #[serde(flatten)]
    pub outcomes: BTreeMap<String, Outcome>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn raw(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn test_from_raw_drops_null_fields() {
        let target = Target::from_raw(raw(json!({
            "os": "Windows",
            "os_version": "11",
            "browser": "chrome",
            "device": null,
            "browser_version": "120.0",
            "real_mobile": null,
            "browser_flavor": null,
        })))
        .unwrap();

        assert_eq!(target.device, None);
        assert!(target.extra.is_empty());

        let yaml = serde_yaml::to_string(&target).unwrap();
        assert!(!yaml.contains("null"));
        assert!(!yaml.contains("device"));
        assert!(yaml.contains("browser_version: '120.0'"));
    }

    #[test]
    fn test_unknown_fields_survive() {
        let target = Target::from_raw(raw(json!({
            "os": "android",
            "os_version": "14.0",
            "browser": "chrome",
            "device": "Google Pixel 8",
            "real_mobile": true,
            "browser_version": null,
            "idle_timeout": 300,
        })))
        .unwrap();

        assert!(target.is_mobile());
        assert_eq!(target.extra.get("idle_timeout"), Some(&json!(300)));
        let back = serde_json::to_value(&target).unwrap();
        assert_eq!(back["device"], json!("Google Pixel 8"));
        assert!(back.get("browser_version").is_none());
    }

    #[test]
    fn test_single_session_record_is_plain_url_map() {
        let mut record = SessionRecord::default();
        record.outcomes.insert(
            "http://x".to_string(),
            Outcome { status: "passed".to_string(), reason: String::new() },
        );

        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"http://x": {"status": "passed", "reason": ""}})
        );
    }

    #[test]
    fn test_platform_sentinels() {
        assert_eq!(Platform::All.os_sentinel(), None);
        assert_eq!(Platform::Windows.os_sentinel(), Some("Windows"));
        assert_eq!(Platform::Macosx.os_sentinel(), Some("OS X"));
        assert_eq!(Platform::Macosx.output_name(), "macosx");
    }
}
