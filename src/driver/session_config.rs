//! The SDK's session configuration file, held as an explicit value for the
//! duration of a run.
//!
//! Only the two keys the driver owns (`buildName`, `platforms`) are rewritten;
//! every other line, comments included, is carried over untouched. The
//! original bytes are written back by [`SessionConfig::restore`], or on drop
//! when a run ends early.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};

use crate::core::errors::PhishError;
use crate::core::models::Target;
use crate::utils::fs::atomic_write;

pub const BUILD_NAME_KEY: &str = "buildName";
pub const PLATFORMS_KEY: &str = "platforms";

pub struct SessionConfig {
    path: PathBuf,
    original: String,
    current: String,
    restored: bool,
}

impl SessionConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let original = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read session config: {:?}", path))?;
        parse_mapping(path, &original)?;

        Ok(Self {
            path: path.to_path_buf(),
            current: original.clone(),
            original,
            restored: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Point the configuration at one batch and persist it for the SDK.
    pub fn apply_batch(&mut self, build_name: &str, platforms: &[Target]) -> Result<()> {
        let edited = set_top_level(&self.current, BUILD_NAME_KEY, &build_name)?;
        let edited = set_top_level(&edited, PLATFORMS_KEY, &platforms)?;

        self.current = if self.holds(&edited, build_name, platforms) {
            edited
        } else {
            tracing::warn!(
                "In-place edit of {:?} did not round-trip; rewriting it without comments",
                self.path
            );
            self.rewrite_whole(build_name, platforms)?
        };

        atomic_write(&self.path, self.current.as_bytes())
    }

    /// Write the snapshot taken at load time back to disk.
    pub fn restore(mut self) -> Result<()> {
        self.write_original()?;
        self.restored = true;
        Ok(())
    }

    fn write_original(&self) -> Result<()> {
        if self.current == self.original {
            return Ok(());
        }
        atomic_write(&self.path, self.original.as_bytes())
            .with_context(|| format!("Failed to restore session config: {:?}", self.path))
    }

    fn holds(&self, text: &str, build_name: &str, platforms: &[Target]) -> bool {
        let Ok(doc) = parse_mapping(&self.path, text) else {
            return false;
        };
        let name_ok = doc.get(BUILD_NAME_KEY).and_then(Value::as_str) == Some(build_name);
        let platforms_ok = doc
            .get(PLATFORMS_KEY)
            .cloned()
            .and_then(|v| serde_yaml::from_value::<Vec<Target>>(v).ok())
            .is_some_and(|parsed| parsed == platforms);
        name_ok && platforms_ok
    }

    fn rewrite_whole(&self, build_name: &str, platforms: &[Target]) -> Result<String> {
        let mut doc = parse_mapping(&self.path, &self.current)?;
        doc.insert(BUILD_NAME_KEY.into(), Value::String(build_name.to_string()));
        doc.insert(PLATFORMS_KEY.into(), serde_yaml::to_value(platforms)?);
        Ok(serde_yaml::to_string(&doc)?)
    }
}

impl Drop for SessionConfig {
    fn drop(&mut self) {
        if self.restored || self.current == self.original {
            return;
        }
        match self.write_original() {
            Ok(()) => tracing::warn!("Run ended early; restored {:?}", self.path),
            Err(e) => tracing::error!("{:#}; restore it by hand before the next run", e),
        }
    }
}

fn parse_mapping(path: &Path, text: &str) -> Result<Mapping> {
    let invalid = |reason: String| PhishError::SessionConfig { path: path.display().to_string(), reason };
    match serde_yaml::from_str::<Value>(text).map_err(|e| invalid(e.to_string()))? {
        Value::Mapping(map) => Ok(map),
        Value::Null => Ok(Mapping::new()),
        _ => Err(invalid("top level is not a mapping".to_string()).into()),
    }
}

/// Replace (or append) the top-level `key` entry of a YAML document in place.
pub fn set_top_level<T: Serialize + ?Sized>(doc: &str, key: &str, value: &T) -> Result<String> {
    let entry = render_entry(key, value)?;
    let lines: Vec<&str> = doc.lines().collect();

    let Some(start) = lines.iter().position(|line| is_key_line(line, key)) else {
        let mut out = doc.to_string();
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&entry);
        return Ok(out);
    };

    let mut end = lines[start + 1..]
        .iter()
        .position(|line| starts_entry(line))
        .map_or(lines.len(), |offset| start + 1 + offset);
    // comments directly above the next key belong to it
    while end > start + 1 && is_trivia(lines[end - 1]) {
        end -= 1;
    }

    let mut out = String::with_capacity(doc.len() + entry.len());
    for line in &lines[..start] {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(&entry);
    for line in &lines[end..] {
        out.push_str(line);
        out.push('\n');
    }
    Ok(out)
}

fn render_entry<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<String> {
    let body = serde_yaml::to_string(value)?;
    if body.lines().count() == 1 && !body.starts_with("- ") {
        Ok(format!("{}: {}", key, body))
    } else {
        Ok(format!("{}:\n{}", key, body))
    }
}

fn is_key_line(line: &str, key: &str) -> bool {
    line.strip_prefix(key)
        .is_some_and(|rest| rest.trim_start().starts_with(':'))
}

fn starts_entry(line: &str) -> bool {
    !line.is_empty() && !line.starts_with([' ', '\t', '-', '#'])
}

fn is_trivia(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}
