use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::core::models::Target;
use crate::utils::fs::{recreate_dir, write_generated_yaml};

const SOURCE: &str = "generate-targets";

/// Consecutive slices of at most `per_batch` targets; the last may be shorter.
pub fn partition(targets: &[Target], per_batch: usize) -> Vec<&[Target]> {
    targets.chunks(per_batch.max(1)).collect()
}

/// Write every target to `{location}.yml`.
pub fn write_single(targets: &[Target], location: &Path) -> Result<PathBuf> {
    let mut path = location.as_os_str().to_owned();
    path.push(".yml");
    let path = PathBuf::from(path);
    write_generated_yaml(&path, SOURCE, targets)?;
    tracing::info!("Wrote {} targets to {:?}", targets.len(), path);
    Ok(path)
}

/// Replace the `location` directory with one `{index}.yml` file per batch.
pub fn write_batches(targets: &[Target], location: &Path, per_batch: usize) -> Result<Vec<PathBuf>> {
    recreate_dir(location)?;

    let mut files = Vec::new();
    for (index, batch) in partition(targets, per_batch).into_iter().enumerate() {
        let path = location.join(format!("{}.yml", index));
        write_generated_yaml(&path, SOURCE, batch)?;
        files.push(path);
    }

    tracing::info!("Wrote {} targets as {} batch files under {:?}", targets.len(), files.len(), location);
    Ok(files)
}
