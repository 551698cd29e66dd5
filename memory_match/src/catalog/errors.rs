//! Catalog error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while fetching the card catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Catalog file could not be read
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Catalog is not a JSON array of card templates
    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    /// A template is missing a required field
    #[error("Malformed card template: {0}")]
    Malformed(String),

    /// Catalog parsed but holds no templates
    #[error("Catalog contains no card templates")]
    Empty,

    /// Every fetch attempt failed
    #[error("Catalog unavailable after {attempts} attempt(s): {reason}")]
    Unavailable { attempts: u32, reason: String },
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;
