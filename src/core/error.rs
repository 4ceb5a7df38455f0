//! Error types for the Sylva library

use thiserror::Error;

/// Main error type for the library
#[derive(Debug, Error)]
pub enum Error {
    #[error("stale stem handle")]
    StaleStem,

    #[error("stem is still attached to the tree")]
    StemAttached,

    #[error("operation not valid for the root stem")]
    RootStem,

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
