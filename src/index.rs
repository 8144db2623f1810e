// src/index.rs
//! Archive index written by the retrieval step.

use crate::error::{Result, read_json};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexEntry {
    file_name: String,
}

/// Archive names listed in `path`, or `None` when there is no index.
pub fn load_known_archives(path: &Path) -> Result<Option<Vec<String>>> {
    if !path.is_file() {
        log::debug!(
            "No archive index at {}; using the directory listing",
            path.display()
        );
        return Ok(None);
    }
    let entries: Vec<IndexEntry> = read_json(path)?;
    Ok(Some(entries.into_iter().map(|e| e.file_name).collect()))
}
