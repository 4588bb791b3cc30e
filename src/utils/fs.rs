//! File system helpers used by the provisioning engines.
//!
//! Everything here is synchronous std I/O: the engines await at process
//! boundaries, not at individual file operations, and the files involved
//! (JSON configs, single-file skill artifacts) are small.
//!
//! Writes that replace an existing file go through [`atomic_write`]
//! (write-then-rename) so a crash mid-write never leaves a half-written
//! config behind.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Creates a directory and all missing parents.
///
/// Succeeds if the directory already exists; fails if the path exists but
/// is not a directory.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    } else if !path.is_dir() {
        return Err(anyhow::anyhow!(
            "Path exists but is not a directory: {}",
            path.display()
        ));
    }
    Ok(())
}

/// Atomically writes bytes to a file using a write-then-rename strategy.
///
/// Content is written to a `.tmp` sibling, synced, and renamed over the
/// target, so readers never observe a partially written file. Parent
/// directories are created as needed.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let temp_path = path.with_extension("tmp");

    {
        let mut file = fs::File::create(&temp_path)
            .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

        file.write_all(content)
            .with_context(|| format!("Failed to write to temp file: {}", temp_path.display()))?;

        file.sync_all().with_context(|| "Failed to sync file to disk")?;
    }

    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;

    Ok(())
}

/// Reads a file into a string.
pub fn read_text_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Serializes a JSON value with 2-space indentation and a trailing newline,
/// then writes it atomically.
///
/// This is the one serialization format host config files are written in;
/// both the indentation and the trailing newline are part of the contract.
pub fn write_json_document(path: &Path, value: &serde_json::Value) -> Result<()> {
    let mut rendered = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize JSON for: {}", path.display()))?;
    rendered.push('\n');
    atomic_write(path, rendered.as_bytes())
}

/// Recursively copies a directory and all its contents.
///
/// Existing files at the destination are overwritten. Symlinks and other
/// special file types are skipped.
pub fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    ensure_dir(dst)?;

    for entry in walkdir::WalkDir::new(src).min_depth(1) {
        let entry = entry.with_context(|| format!("Failed to walk directory: {}", src.display()))?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .with_context(|| format!("Failed to relativize path: {}", entry.path().display()))?;
        let target = dst.join(rel);

        if entry.file_type().is_dir() {
            ensure_dir(&target)?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                ensure_dir(parent)?;
            }
            fs::copy(entry.path(), &target).with_context(|| {
                format!(
                    "Failed to copy file from {} to {}",
                    entry.path().display(),
                    target.display()
                )
            })?;
        }
    }

    Ok(())
}

/// Removes a directory if it exists and is empty.
///
/// Returns `true` if the directory was removed. Non-empty directories are
/// left alone: they may hold content this tool did not create.
pub fn remove_dir_if_empty(path: &Path) -> Result<bool> {
    if !path.is_dir() {
        return Ok(false);
    }

    let mut entries = fs::read_dir(path)
        .with_context(|| format!("Failed to read directory: {}", path.display()))?;
    if entries.next().is_some() {
        return Ok(false);
    }

    fs::remove_dir(path)
        .with_context(|| format!("Failed to remove directory: {}", path.display()))?;
    Ok(true)
}
