//! Raw page artifacts: one JSON file per fetched API page, named
//! `page{N}-response.json` under `<data-dir>/fetched-data`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub fn page_artifact_name(page: u64) -> String {
    format!("page{page}-response.json")
}

/// Page number embedded in an artifact file name. Names without a parseable
/// `page{N}` marker sort as page 0.
pub fn page_number_from_name(name: &str) -> u64 {
    let mut rest = name;
    while let Some(idx) = rest.find("page") {
        let after = &rest[idx + 4..];
        let end = after.chars().take_while(|c| c.is_ascii_digit()).count();
        if end > 0
            && let Ok(page) = after[..end].parse()
        {
            return page;
        }
        rest = after;
    }
    0
}

/// All `.json` artifacts in the fetched-data directory, ordered by embedded
/// page number (file name breaks ties so the order is deterministic).
pub fn list_page_artifacts(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("list fetched data in {}", dir.display()))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("list fetched data in {}", dir.display()))?;
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort_by_key(|path| {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        (page_number_from_name(&name), name)
    });
    Ok(files)
}

/// Start/end page range applied positionally to the sorted artifact list:
/// the start page is a 1-based index, the end page clamps to the list length.
pub fn select_page_range(files: &[PathBuf], start_page: u64, end_page: Option<u64>) -> &[PathBuf] {
    let start = usize::try_from(start_page.saturating_sub(1))
        .unwrap_or(usize::MAX)
        .min(files.len());
    let end = end_page
        .map(|end| usize::try_from(end).unwrap_or(usize::MAX).min(files.len()))
        .unwrap_or(files.len());
    if start >= end { &[] } else { &files[start..end] }
}
