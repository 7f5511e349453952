use std::fs;
use std::io::Write;
use std::path::Path;
use anyhow::{Result, Context};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

const HEADER_RULE: &str = "# =======================================";

pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let parent = path.parent()
        .ok_or_else(|| anyhow::anyhow!("Invalid path: no parent directory"))?;

    if !parent.as_os_str().is_empty() && !parent.exists() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create parent directory: {:?}", parent))?;
    }

    let tmp_path = path.with_extension("tmp");

    let mut file = fs::File::create(&tmp_path)
        .with_context(|| format!("Failed to create temp file: {:?}", tmp_path))?;

    file.write_all(content)
        .with_context(|| format!("Failed to write to temp file: {:?}", tmp_path))?;

    file.sync_all()
        .with_context(|| format!("Failed to sync temp file: {:?}", tmp_path))?;

    fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to rename {:?} to {:?}", tmp_path, path))?;

    Ok(())
}

/// Three-line banner marking a file as tool output.
pub fn generated_header(source: &str) -> String {
    format!("{HEADER_RULE}\n# THIS FILE WAS GENERATED BY mobile-phish {source}\n{HEADER_RULE}\n")
}

/// Serialize `value` as YAML under the generated-file header.
pub fn write_generated_yaml<T: Serialize + ?Sized>(path: &Path, source: &str, value: &T) -> Result<()> {
    let body = serde_yaml::to_string(value)
        .with_context(|| format!("Failed to serialize YAML for {:?}", path))?;
    let content = generated_header(source) + &body;
    atomic_write(path, content.as_bytes())
}

/// Pretty JSON with four-space indentation and a trailing newline.
pub fn write_json_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut ser)
        .with_context(|| format!("Failed to serialize JSON for {:?}", path))?;
    buf.push(b'\n');
    atomic_write(path, &buf)
}

/// Remove `dir` with everything below it, then create it empty.
pub fn recreate_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)
            .with_context(|| format!("Failed to clear directory: {:?}", dir))?;
    }
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {:?}", dir))?;
    Ok(())
}
