//! Error types for data parsing in airwatch-types.

use thiserror::Error;

/// Errors that can occur when parsing telemetry values from text.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The string does not name an AQI level.
    #[error("Unknown AQI level: {0}")]
    UnknownAqiLevel(String),
    /// The string is neither RFC 3339 nor `YYYY-MM-DD`.
    #[error("Invalid timestamp '{0}': use RFC 3339 (e.g. 2024-01-15T10:30:00Z) or YYYY-MM-DD")]
    InvalidTimestamp(String),
}

/// Result type alias using airwatch-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
