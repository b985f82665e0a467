//! Error types for configuration loading.

use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A URL setting could not be parsed or used an unsupported scheme.
    #[error("invalid URL for {key}")]
    InvalidUrl {
        /// Setting name (environment variable or flag).
        key: String,
        /// Offending value.
        value: String,
        /// Reason the value was rejected.
        reason: String,
    },
    /// A numeric setting could not be parsed.
    #[error("invalid number for {key}")]
    InvalidNumber {
        /// Setting name.
        key: String,
        /// Offending value.
        value: String,
    },
    /// A setting was outside its accepted range.
    #[error("value out of range for {key}")]
    OutOfRange {
        /// Setting name.
        key: String,
        /// Offending value.
        value: String,
        /// Accepted range description.
        expected: &'static str,
    },
    /// A setting held a value outside its accepted set.
    #[error("unsupported value for {key}")]
    Unsupported {
        /// Setting name.
        key: String,
        /// Offending value.
        value: String,
        /// Accepted values.
        expected: &'static str,
    },
}

impl ConfigError {
    /// Human-readable description including the offending value.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::InvalidUrl { key, value, reason } => {
                format!("{key}: '{value}' is not a usable URL ({reason})")
            }
            Self::InvalidNumber { key, value } => format!("{key}: '{value}' is not a number"),
            Self::OutOfRange {
                key,
                value,
                expected,
            } => format!("{key}: {value} is out of range (expected {expected})"),
            Self::Unsupported {
                key,
                value,
                expected,
            } => format!("{key}: '{value}' is not supported (expected {expected})"),
        }
    }
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
