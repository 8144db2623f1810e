//! Messages flowing between pipeline stages.

/// Text of one extracted file together with its identity.
///
/// Each stripping stage rewrites `content` in place before handing the
/// record to the next stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRecord {
    pub archive: String,
    pub inner_file: String,
    pub content: String,
}

impl ContentRecord {
    pub fn new(
        archive: impl Into<String>,
        inner_file: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            archive: archive.into(),
            inner_file: inner_file.into(),
            content: content.into(),
        }
    }
}

/// Occurrences of one operator within one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorCount {
    pub operator: String,
    pub total: u64,
}

/// Unit of work sent from the counters to the aggregator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountMessage {
    pub archive: String,
    /// Only consulted by the audit mode.
    pub inner_file: String,
    pub count: OperatorCount,
}

impl CountMessage {
    pub fn new(record: &ContentRecord, operator: &str, total: u64) -> Self {
        Self {
            archive: record.archive.clone(),
            inner_file: record.inner_file.clone(),
            count: OperatorCount {
                operator: operator.to_owned(),
                total,
            },
        }
    }
}
