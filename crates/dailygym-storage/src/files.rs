//! Scoped file primitives over already-resolved paths
//!
//! Write and append create the containing directory on demand. Reads of a
//! missing file fail with `Error::NotFound`; every other failure carries the
//! path and the underlying cause. `exists` and the listings never fail on
//! absence.

use once_cell::sync::Lazy;
use regex::Regex;
use std::io::ErrorKind;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use dailygym_core::{Error, Result};

use crate::paths::LogRoot;

/// Month bucket directory names: exactly YYYY-MM
static MONTH_DIR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}$").expect("Invalid month dir regex"));

fn io_error(path: &Path, source: std::io::Error) -> Error {
    if source.kind() == ErrorKind::NotFound {
        Error::NotFound(path.to_path_buf())
    } else {
        Error::storage_io(path, source)
    }
}

async fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::storage_io(parent, e))?;
    }
    Ok(())
}

/// Read a UTF-8 file
pub async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| io_error(path, e))
}

/// Read a binary file
pub async fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|e| io_error(path, e))
}

/// Write a UTF-8 file, creating or truncating
pub async fn write_text(path: &Path, content: &str) -> Result<()> {
    ensure_parent(path).await?;
    tokio::fs::write(path, content)
        .await
        .map_err(|e| Error::storage_io(path, e))
}

/// Append to a UTF-8 file, creating it if missing
pub async fn append_text(path: &Path, content: &str) -> Result<()> {
    ensure_parent(path).await?;
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|e| Error::storage_io(path, e))?;
    file.write_all(content.as_bytes())
        .await
        .map_err(|e| Error::storage_io(path, e))?;
    file.flush().await.map_err(|e| Error::storage_io(path, e))
}

/// Write a binary file, overwriting if present
pub async fn write_bytes(path: &Path, content: &[u8]) -> Result<()> {
    ensure_parent(path).await?;
    tokio::fs::write(path, content)
        .await
        .map_err(|e| Error::storage_io(path, e))
}

/// Presence probe. A failed stat counts as absent; never fails.
pub async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

/// List file names in a directory, optionally filtered by suffix, sorted.
/// A missing directory yields an empty list.
pub async fn list_files(dir: &Path, suffix: Option<&str>) -> Result<Vec<String>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("Listing missing directory {}", dir.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(Error::storage_io(dir, e)),
    };

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| Error::storage_io(dir, e))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| Error::storage_io(dir, e))?;
        if !file_type.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if suffix.map(|s| name.ends_with(s)).unwrap_or(true) {
            names.push(name);
        }
    }

    names.sort();
    Ok(names)
}

/// List month bucket directories under the root, most recent first.
/// A missing root yields an empty list.
pub async fn list_month_dirs(root: &LogRoot) -> Result<Vec<String>> {
    let dir = root.path();
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::storage_io(dir, e)),
    };

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| Error::storage_io(dir, e))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| Error::storage_io(dir, e))?;
        if !file_type.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if MONTH_DIR_REGEX.is_match(&name) {
            names.push(name);
        }
    }

    names.sort_by(|a, b| b.cmp(a));
    Ok(names)
}
