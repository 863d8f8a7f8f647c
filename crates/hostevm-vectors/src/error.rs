//! Error types for vector loading

use std::path::PathBuf;
use thiserror::Error;

/// Vector loading error
#[derive(Error, Debug)]
pub enum VectorError {
    /// Directory or file could not be read
    #[error("IO error at {path}: {source}")]
    Io {
        /// Offending path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File is not a valid vector mapping
    #[error("cannot parse {path}: {source}")]
    Parse {
        /// Offending file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// The same identifier was yielded twice
    #[error("duplicate test identifier: {0}")]
    DuplicateId(String),
}

/// Result type for vector loading
pub type VectorResult<T> = Result<T, VectorError>;
