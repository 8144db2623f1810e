//! False-positive auditing.
//!
//! Java collection-like libraries expose methods named like reactive
//! operators (`map`, `filter`, ...). When auditing is enabled the import
//! filter tallies files importing one of them, and the aggregator keeps the
//! per-file counts of a pre-declared sample so they can be reviewed by hand.

use crate::error::{EngineError, Result};
use crate::record::CountMessage;
use hashbrown::HashSet;
use log::info;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;

/// A library whose imports are tallied while auditing.
#[derive(Debug, Clone)]
pub struct InspectedLib {
    pub name: &'static str,
    pub pattern: Regex,
}

const INSPECTED: &[(&str, &str)] = &[
    ("Stream", r"java\.util\.stream"),
    ("Eclipse", r"org\.eclipse\.collections"),
    (
        "CollectionUtils",
        r"org\.apache\.commons\.collections4\.CollectionUtils",
    ),
    (
        "Guava",
        r"com\.google\.common\.collect\.Collections2|com\.google\.guava",
    ),
];

pub fn inspected_libs() -> Result<Vec<InspectedLib>> {
    INSPECTED
        .iter()
        .map(|&(name, pattern)| {
            Ok(InspectedLib {
                name,
                pattern: Regex::new(pattern)?,
            })
        })
        .collect()
}

/// Inner file names whose operator counts are reported.
#[derive(Debug, Clone, Default)]
pub struct AuditConfig {
    pub sample_files: HashSet<String>,
}

impl AuditConfig {
    /// One file name per line; blank lines are ignored.
    pub fn parse_sample(text: &str) -> Self {
        let sample_files = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_owned)
            .collect();
        Self { sample_files }
    }

    pub fn load_sample(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::AuditSample {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse_sample(&text);
        info!(
            "Total of collection-like sample files: {}",
            config.sample_files.len()
        );
        Ok(config)
    }
}

/// Outcome of an audited run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditReport {
    /// Library name -> number of import-matching files referencing it.
    /// Logged at the end of the run, not written out.
    pub import_counts: BTreeMap<String, usize>,
    /// Sampled inner file -> operator -> non-zero count. This is the
    /// written report.
    pub file_counts: BTreeMap<String, BTreeMap<String, u64>>,
}

impl AuditReport {
    pub fn new(config: &AuditConfig) -> Self {
        let file_counts = config
            .sample_files
            .iter()
            .map(|f| (f.clone(), BTreeMap::new()))
            .collect();
        Self {
            import_counts: BTreeMap::new(),
            file_counts,
        }
    }

    pub fn record(&mut self, msg: &CountMessage) {
        if msg.count.total == 0 {
            return;
        }
        if let Some(ops) = self.file_counts.get_mut(&msg.inner_file) {
            ops.insert(msg.count.operator.clone(), msg.count.total);
        }
    }

    pub fn add_import_tallies(&mut self, libs: &[InspectedLib], tallies: &[usize]) {
        for (lib, n) in libs.iter().zip(tallies) {
            *self.import_counts.entry(lib.name.to_owned()).or_default() += n;
        }
    }
}
