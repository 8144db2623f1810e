// src/config.rs
use crate::error::{AppError, Result, read_json};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Contents of the JSON configuration file.
///
/// Keys belonging to the retrieval tools (tokens, star thresholds) are ignored.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub distribution: String,
    pub file_extensions: Vec<String>,
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,
    #[serde(default)]
    pub workers: Option<usize>,
    #[serde(default)]
    pub counter_workers: Option<usize>,
    #[serde(default)]
    pub queue_capacity: Option<usize>,
    #[serde(default)]
    pub backtrack_limit: Option<usize>,
    #[serde(default)]
    pub excluded_archives: Vec<String>,
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("assets")
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let config: Self = read_json(path)?;
        config.validate()?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.distribution.trim().is_empty() {
            return Err(AppError::Config("distribution must not be empty".into()));
        }
        if self.file_extensions.is_empty() {
            return Err(AppError::Config(
                "fileExtensions must name at least one language".into(),
            ));
        }
        if self.workers == Some(0) || self.counter_workers == Some(0) {
            return Err(AppError::Config("worker counts must be at least 1".into()));
        }
        if self.queue_capacity == Some(0) {
            return Err(AppError::Config("queueCapacity must be at least 1".into()));
        }
        Ok(())
    }

    pub fn layout(&self) -> Layout {
        Layout::new(&self.assets_dir, &self.distribution)
    }
}

/// Where inputs are read from and results written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub archives_dir: PathBuf,
    pub archive_index: PathBuf,
    pub operators_dir: PathBuf,
    pub languages_file: PathBuf,
    pub results_dir: PathBuf,
    pub false_positives_dir: PathBuf,
}

impl Layout {
    pub fn new(assets: &Path, distribution: &str) -> Self {
        let retrieval = assets.join("repo-retrieval").join(distribution);
        Self {
            archives_dir: retrieval.join("archives"),
            archive_index: retrieval.join("list_of_files.json"),
            operators_dir: assets.join("operators"),
            languages_file: assets.join("Programming_Languages_Extensions.json"),
            results_dir: assets.join("operators-search"),
            false_positives_dir: assets.join("false-positives"),
        }
    }

    pub fn audit_sample(&self) -> PathBuf {
        self.false_positives_dir.join("collection-like_sample.txt")
    }

    pub fn audit_output(&self) -> PathBuf {
        self.false_positives_dir.join("collection-like_count.json")
    }
}
