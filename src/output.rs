// src/output.rs
//! Result and audit files.

use crate::error::{AppError, Result};
use opsminer_engine::aggregate::ResultTable;
use opsminer_engine::audit::AuditReport;
use std::fs;
use std::path::{Path, PathBuf};

/// `<distribution>_<languages>.json`; the distribution is lowercased and the
/// language names are joined by `-` as given.
pub fn result_file_name(distribution: &str, languages: &[String]) -> String {
    format!(
        "{}_{}.json",
        distribution.to_lowercase(),
        languages.join("-")
    )
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| AppError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, contents).map_err(|source| AppError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the table as compact JSON into `dir`; returns the file written.
pub fn write_results(
    dir: &Path,
    distribution: &str,
    languages: &[String],
    table: &ResultTable,
) -> Result<PathBuf> {
    let path = dir.join(result_file_name(distribution, languages));
    let json = serde_json::to_vec(table)?;
    write_file(&path, &json)?;
    Ok(path)
}

/// Pretty-printed sampled file -> operator -> count map of an audited run.
pub fn write_audit(path: &Path, report: &AuditReport) -> Result<()> {
    let json = serde_json::to_vec_pretty(&report.file_counts)?;
    write_file(path, &json)
}
