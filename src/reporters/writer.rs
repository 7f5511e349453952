use crate::core::models::SessionRecord;
use crate::driver::RunManifest;
use crate::utils::fs::{atomic_write, write_json_pretty};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Where extraction and run artifacts land under the output directory.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn session_outcome(&self, session_id: &str) -> PathBuf {
        self.root.join("outcomes").join(session_id).join("output.json")
    }

    pub fn build_outcome(&self, fragment: &str, session_id: &str) -> PathBuf {
        self.root.join("outcomes").join(fragment).join(format!("{}.json", session_id))
    }

    pub fn session_log(&self, session_id: &str) -> PathBuf {
        self.root.join("logs").join(format!("{}.log", session_id))
    }

    pub fn build_log(&self, fragment: &str, session_id: &str) -> PathBuf {
        self.root.join("logs").join(fragment).join(format!("{}.log", session_id))
    }

    pub fn run_manifest(&self, build_name: &str) -> PathBuf {
        self.root.join("runs").join(format!("{}.json", build_name))
    }
}

pub fn write_session_record(path: &Path, record: &SessionRecord) -> Result<()> {
    write_json_pretty(path, record)?;
    tracing::debug!("Wrote {} outcome(s) to {:?}", record.outcomes.len(), path);
    Ok(())
}

pub fn write_raw_log(path: &Path, logs: &str) -> Result<()> {
    atomic_write(path, logs.as_bytes())
}

pub fn write_run_manifest(layout: &OutputLayout, manifest: &RunManifest) -> Result<PathBuf> {
    let path = layout.run_manifest(&manifest.build_name);
    write_json_pretty(&path, manifest)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{DeviceInfo, Outcome};
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    #[test]
    fn test_layout_paths() {
        let layout = OutputLayout::new("output_data");
        assert_eq!(layout.session_outcome("abc"), PathBuf::from("output_data/outcomes/abc/output.json"));
        assert_eq!(layout.build_outcome("Xy12", "abc"), PathBuf::from("output_data/outcomes/Xy12/abc.json"));
        assert_eq!(layout.build_log("Xy12", "abc"), PathBuf::from("output_data/logs/Xy12/abc.log"));
        assert_eq!(layout.run_manifest("Xy12_Run"), PathBuf::from("output_data/runs/Xy12_Run.json"));
    }

    #[test]
    fn test_build_record_shape() -> Result<()> {
        let tmp = tempdir()?;
        let path = OutputLayout::new(tmp.path()).build_outcome("frag", "s1");
        let record = SessionRecord {
            public_url: Some("https://automate.example/s1".into()),
            device_info: Some(DeviceInfo {
                device: Some("Pixel 8".into()),
                os: Some("android".into()),
                os_version: Some("14.0".into()),
                browser: Some("chrome".into()),
                browser_version: None,
            }),
            outcomes: BTreeMap::from([(
                "http://x".to_string(),
                Outcome { status: "passed".into(), reason: "ok".into() },
            )]),
        };

        write_session_record(&path, &record)?;

        let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        assert_eq!(
            written,
            serde_json::json!({
                "public_url": "https://automate.example/s1",
                "device_info": {
                    "device": "Pixel 8",
                    "os": "android",
                    "os_version": "14.0",
                    "browser": "chrome",
                    "browser_version": null
                },
                "http://x": {"status": "passed", "reason": "ok"}
            })
        );
        Ok(())
    }

    #[test]
    fn test_run_manifest_lands_under_runs() -> Result<()> {
        let tmp = tempdir()?;
        let layout = OutputLayout::new(tmp.path());
        let now = Utc::now();
        let manifest = RunManifest {
            build_name: "AbCd1234_All_Targets".into(),
            unique_token: "AbCd1234".into(),
            base_name: "All_Targets".into(),
            targets_src: PathBuf::from("targets/all_targets"),
            resumed_from: None,
            batches: vec!["0.yml".into()],
            started_at: now,
            finished_at: now,
        };

        let path = write_run_manifest(&layout, &manifest)?;

        assert_eq!(path, tmp.path().join("runs/AbCd1234_All_Targets.json"));
        let back: RunManifest = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        assert_eq!(back.batches, manifest.batches);
        Ok(())
    }
}
