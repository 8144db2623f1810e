use crate::audit::AuditConfig;
use crate::error::{EngineError, Result};
use crate::strip::DEFAULT_BACKTRACK_LIMIT;
use derive_builder::Builder;
use hashbrown::HashSet;
use std::path::PathBuf;

pub const DEFAULT_QUEUE_CAPACITY: usize = 16;

#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct PipelineConfig {
    /// Directory holding the `.tar.gz` archives.
    pub archives_dir: PathBuf,
    /// Library family; drives the import filter.
    pub distribution: String,
    /// Dotted extensions (`.java`) eligible for extraction.
    #[builder(default)]
    pub allowed_extensions: HashSet<String>,
    /// Archive names known up front; rows of the result table.
    /// `None` means every archive found in `archives_dir`.
    #[builder(default)]
    pub known_archives: Option<Vec<String>>,
    #[builder(default)]
    pub excluded_archives: HashSet<String>,
    /// Workers per extraction, stripping and filter pool.
    #[builder(default = "num_cpus::get()")]
    pub workers: usize,
    /// Workers per operator pool; `None` spreads `workers` over the pools.
    #[builder(default)]
    pub counter_workers: Option<usize>,
    #[builder(default = "DEFAULT_QUEUE_CAPACITY")]
    pub queue_capacity: usize,
    #[builder(default = "DEFAULT_BACKTRACK_LIMIT")]
    pub backtrack_limit: usize,
    #[builder(default, setter(strip_option))]
    pub audit: Option<AuditConfig>,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(EngineError::Config("workers must be at least 1".into()));
        }
        if self.counter_workers == Some(0) {
            return Err(EngineError::Config(
                "counter workers must be at least 1".into(),
            ));
        }
        if self.distribution.trim().is_empty() {
            return Err(EngineError::Config("distribution is empty".into()));
        }
        Ok(())
    }

    /// Per-pool counter workers: explicit value, or ceil(workers / operators).
    pub fn counter_workers_for(&self, operators: usize) -> usize {
        self.counter_workers
            .unwrap_or_else(|| self.workers.div_ceil(operators.max(1)))
            .max(1)
    }
}
