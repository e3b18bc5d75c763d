//! I/O error types.

use hexanode_core::ShapeError;
use thiserror::Error;

/// Result type for I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

/// I/O error types.
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A shot line is not valid JSON.
    #[error("line {line}: invalid JSON: {message}")]
    Json { line: usize, message: String },

    /// A shot line is valid JSON but not a valid shot record.
    #[error("line {line}: {source}")]
    Shape {
        line: usize,
        #[source]
        source: ShapeError,
    },
}

impl Error {
    /// True for errors confined to a single shot record.
    #[must_use]
    pub fn is_per_shot(&self) -> bool {
        matches!(self, Self::Json { .. } | Self::Shape { .. })
    }
}
