//! Error types for schema-migrate

use std::io;

use thiserror::Error;

/// Result type alias for schema-migrate
pub type Result<T> = std::result::Result<T, Error>;

/// schema-migrate errors
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration-tree parse failure, terminal for the file
    #[error("Parse error in {filename}: {detail}")]
    Parse {
        /// File the parser was reading
        filename: String,
        /// Parser-reported detail
        detail: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal invariant violation (nil tree, empty state document)
    #[error("Internal error: {0}")]
    Internal(String),
}
