use crate::error::{EngineError, Result};
use log::warn;
use std::path::Path;

/// Operator names tracked for one distribution, fixed for the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operators {
    distribution: String,
    names: Vec<String>,
}

impl Operators {
    /// Build the operator set, dropping duplicate names (first occurrence wins).
    ///
    /// # Errors
    /// Returns `EngineError::Config` when no operator remains.
    pub fn new(distribution: impl Into<String>, names: Vec<String>) -> Result<Self> {
        let distribution = distribution.into();
        let mut seen = hashbrown::HashSet::with_capacity(names.len());
        let mut unique = Vec::with_capacity(names.len());
        for name in names {
            let name = name.trim().to_owned();
            if name.is_empty() {
                continue;
            }
            if seen.insert(name.clone()) {
                unique.push(name);
            } else {
                warn!("Duplicate operator '{name}' ignored for {distribution}");
            }
        }

        if unique.is_empty() {
            return Err(EngineError::Config(format!(
                "operator list for '{distribution}' is empty"
            )));
        }

        Ok(Self {
            distribution,
            names: unique,
        })
    }

    /// Parse a JSON array of operator names.
    pub fn from_json(distribution: impl Into<String>, json: &str) -> Result<Self> {
        let names: Vec<String> = serde_json::from_str(json)?;
        Self::new(distribution, names)
    }

    /// Load the operator file whose name matches `distribution` case-insensitively.
    ///
    /// Directory entries are visited in name order so the choice is stable.
    pub fn load_from_dir(dir: &Path, distribution: &str) -> Result<Self> {
        let read_err = |source| EngineError::OperatorRead {
            path: dir.to_path_buf(),
            source,
        };
        let matcher = regex::RegexBuilder::new(&regex::escape(distribution))
            .case_insensitive(true)
            .build()?;

        let mut candidates = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(read_err)? {
            let entry = entry.map_err(read_err)?;
            if entry.file_type().map_err(read_err)?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if matcher.is_match(&name) {
                candidates.push(entry.path());
            }
        }
        candidates.sort();

        let path = candidates
            .into_iter()
            .next()
            .ok_or_else(|| EngineError::OperatorsNotFound(distribution.to_owned()))?;
        let json = std::fs::read_to_string(&path).map_err(|source| EngineError::OperatorRead {
            path: path.clone(),
            source,
        })?;
        Self::from_json(distribution, &json)
    }

    pub fn distribution(&self) -> &str {
        &self.distribution
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
