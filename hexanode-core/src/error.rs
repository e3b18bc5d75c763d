//! Error types for hexanode-core.

use thiserror::Error;

/// Result type alias for hexanode operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Invalid detector configuration.
///
/// Raised once, at construction time. No partially built parameter set
/// survives a configuration error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A required parameter is absent.
    #[error("missing parameter: {0}")]
    Missing(String),

    /// A parameter is present but is not a number.
    #[error("parameter {name} is not numeric: {found}")]
    NonNumeric { name: String, found: String },

    /// A diagnostics flag is present but is not a boolean.
    #[error("flag {name} must be a boolean, found {found}")]
    InvalidFlag { name: String, found: String },

    /// A parameter is NaN or infinite.
    #[error("parameter {name} must be finite, got {value}")]
    NonFinite { name: String, value: f64 },

    /// A width-like parameter is negative.
    #[error("parameter {name} must be non-negative, got {value}")]
    Negative { name: String, value: f64 },

    /// The configuration document could not be parsed.
    #[error("invalid configuration document: {0}")]
    Document(String),

    /// The configuration file could not be read.
    #[error("cannot read configuration: {0}")]
    Io(String),
}

/// Malformed per-shot input.
///
/// Local to a single shot: callers substitute an empty result and move on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// The shot record is not a key/value object.
    #[error("shot record is not an object")]
    NotAnObject,

    /// A pulse channel is absent from the shot record.
    #[error("missing channel: {0}")]
    MissingChannel(&'static str),

    /// A pulse channel is not a sequence.
    #[error("channel {0} is not an array")]
    NotAnArray(&'static str),

    /// A pulse entry is not a number.
    #[error("channel {channel} entry {index} is not numeric")]
    NonNumeric { channel: &'static str, index: usize },

    /// Packed layout declares the wrong number of channels.
    #[error("expected {expected} channel counts, found {found}")]
    ChannelCount { expected: usize, found: usize },

    /// Packed layout declares a negative channel length.
    #[error("channel {channel} has negative length {length}")]
    NegativeLength { channel: &'static str, length: i64 },

    /// Packed channel lengths do not add up to the number of values.
    #[error("channel counts sum to {declared}, but {found} values were supplied")]
    LengthMismatch { declared: usize, found: usize },
}

/// Core error types for hexanode operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Shape error.
    #[error("shape error: {0}")]
    Shape(#[from] ShapeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_offender() {
        let err = Error::from(ConfigError::Missing("tsum_hw_v".into()));
        assert_eq!(
            err.to_string(),
            "configuration error: missing parameter: tsum_hw_v"
        );

        let err = Error::from(ShapeError::NegativeLength {
            channel: "u2",
            length: -3,
        });
        assert!(err.to_string().contains("u2"));
        assert!(err.to_string().contains("-3"));
    }
}
