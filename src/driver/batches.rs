use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::core::models::Target;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFile {
    pub index: u64,
    pub name: String,
    pub path: PathBuf,
}

impl BatchFile {
    pub fn load(&self) -> Result<Vec<Target>> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read batch file: {:?}", self.path))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse batch file: {:?}", self.path))
    }
}

/// Integer before the first `.` of a batch file name.
pub fn batch_index(name: &str) -> Option<u64> {
    name.split('.').next()?.parse().ok()
}

/// YAML files in `dir`, ascending by their numeric stem.
pub fn list_batches(dir: &Path) -> Result<Vec<BatchFile>> {
    let mut batches = Vec::new();

    for entry in std::fs::read_dir(dir).with_context(|| format!("Failed to list targets directory: {:?}", dir))? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == "yml" || ext == "yaml");
        let Some(name) = path.file_name().and_then(|n| n.to_str()).map(String::from) else {
            continue;
        };
        if !is_yaml {
            tracing::debug!("Ignoring non-YAML file in targets directory: {}", name);
            continue;
        }
        match batch_index(&name) {
            Some(index) => batches.push(BatchFile { index, name, path }),
            None => tracing::warn!("Skipping batch file without a numeric name: {}", name),
        }
    }

    batches.sort_by_key(|b| b.index);
    Ok(batches)
}

/// Drop every batch before `continue_point`; with no resume point everything runs.
pub fn select_from(batches: Vec<BatchFile>, continue_point: Option<&str>) -> Vec<BatchFile> {
    let Some(point) = continue_point else {
        return batches;
    };

    match batches.iter().position(|b| b.name == point) {
        Some(start) => {
            tracing::info!("Continuing from {} (skipping {} batches)", point, start);
            batches.into_iter().skip(start).collect()
        }
        None => {
            tracing::warn!("Continue point {} not found; nothing to run", point);
            Vec::new()
        }
    }
}
