// Error types for the emotion stabilizer

use thiserror::Error;

/// Main error type for steady-emotion
#[derive(Debug, Error)]
pub enum SteadyEmotionError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Timestamp {now:.3}s is earlier than previous timestamp {previous:.3}s")]
    NonMonotonicTime { previous: f64, now: f64 },

    #[error("Label stream parse error on line {line}: {reason}")]
    LabelParse { line: usize, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for steady-emotion operations
pub type Result<T> = std::result::Result<T, SteadyEmotionError>;
