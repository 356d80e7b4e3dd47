use thiserror::Error;

/// Errors raised by the metadata codecs and quantity calculations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A record field is outside its permitted range
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Encoded output does not fit the available space
    #[error("Insufficient space: needed {needed} bytes, {available} available")]
    Capacity { needed: usize, available: usize },

    /// Encoded input is structurally invalid
    #[error("Malformed metadata: {0}")]
    Malformed(String),

    /// Encoded input ended before a field could be read
    #[error("Truncated metadata: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// The metadata buffer holds no record with this tag
    #[error("No record tagged '{0}' in metadata")]
    TagNotFound(char),

    /// The metadata buffer holds more than one record with this tag
    #[error("More than one record tagged '{0}' in metadata")]
    AmbiguousTag(char),

    /// Transfer list exceeds the configured practical cap
    #[error("Too many transfers: {count} exceeds limit of {max}")]
    TooManyTransfers { count: usize, max: usize },
}

impl CodecError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        CodecError::Validation(msg.into())
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        CodecError::Malformed(msg.into())
    }
}

/// Application-wide error type - single point of truth
#[derive(Error, Debug)]
pub enum AppError {
    /// Metadata encoding/decoding
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// File I/O operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration issues
    #[error("Configuration error: {0}")]
    Config(String),

    /// Hex input that could not be parsed
    #[error("Hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Command-line input that is not usable
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Application-wide result type - single point of truth
pub type AppResult<T> = Result<T, AppError>;

// Additional From implementations for common error types
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON error: {}", err))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(err: toml::ser::Error) -> Self {
        AppError::Config(format!("TOML error: {}", err))
    }
}
