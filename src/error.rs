//! Error types for crack-bench

use thiserror::Error;

/// Main error type for benchmark operations
#[derive(Debug, Error)]
pub enum BenchError {
    /// Rejected before any search starts
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The worker pool for a concurrent search could not be built
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Remote upload failed; computed records are unaffected
    #[error("Upload error: {0}")]
    Upload(String),
}

/// Result type alias for benchmark operations
pub type Result<T> = std::result::Result<T, BenchError>;
