use crate::error::{ContribError, Result};
use chrono::{NaiveDate, Utc};
use std::io::Write;
use std::path::{Component, Path};
use tempfile::NamedTempFile;

pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn parse_day(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|e| ContribError::Config(format!("Invalid date '{input}' (expected YYYY-MM-DD): {e}")))
}

/// Path of `target` as referenced from a document living in `document_dir`,
/// always with forward slashes.
pub fn link_from(document_dir: &Path, target: &Path) -> String {
    let Ok(relative) = target.strip_prefix(document_dir) else {
        return target.to_string_lossy().replace('\\', "/");
    };
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Write through a temporary sibling file and rename it into place, so a
/// reader never sees a half-written file.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| ContribError::Io(e.error))?;
    Ok(())
}
