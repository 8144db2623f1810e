use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to read archive directory '{path}': {source}")]
    ArchiveDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open archive '{path}': {source}")]
    ArchiveOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read archive '{archive}': {source}")]
    ArchiveRead {
        archive: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read '{inner}' from archive '{archive}': {source}")]
    EntryRead {
        archive: String,
        inner: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read operator list '{path}': {source}")]
    OperatorRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read audit sample '{path}': {source}")]
    AuditSample {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No operator list matching distribution '{0}'")]
    OperatorsNotFound(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Pattern error: {0}")]
    Pattern(#[from] fancy_regex::Error),

    #[error("No result cell for archive '{archive}' and operator '{operator}'")]
    MissingCell { archive: String, operator: String },

    #[error("Stage '{0}' lost its downstream consumer")]
    Disconnected(&'static str),

    #[error("A worker of stage '{0}' panicked")]
    WorkerPanic(&'static str),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
