// Error types for bordado.
// Covers the local cache store, the remote API, and settings loading.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BordadoError {
    #[error("Cache database used before initialization")]
    NotInitialized,

    #[error("Cache storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error! status: {status} ({url})")]
    Http { status: u16, url: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl BordadoError {
    /// Returns `true` if issuing the same request again might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            BordadoError::Network(_) => true,
            BordadoError::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, BordadoError>;
