// src/error.rs
use thiserror::Error;

// --- Error Types ---

/// Errors raised at the edges of the engine: configuration, record loading
/// and window parsing. The allocation core itself never fails; degraded
/// inputs resolve to zero-valued results instead.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Failed to read environment configuration: {0}")]
    Env(#[from] envy::Error),
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV processing failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid scheduling record at row {row}: {reason}")]
    InvalidRecord { row: usize, reason: String },
    #[error("Invalid reporting window: {0}")]
    InvalidWindow(String),
    #[error("Unsupported record file format: {0}")]
    UnsupportedFormat(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
