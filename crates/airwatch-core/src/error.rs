//! Error types for airwatch-core.
//!
//! Only the reading sources can fail. The classification, aggregation,
//! freshness and snapshot functions are total and never return an error.
//!
//! | Error | Cause | Typical handling |
//! |-------|-------|------------------|
//! | [`Error::Io`] | Data file missing or unreadable | Report path to the user |
//! | [`Error::Json`] | Data file is not a valid dataset | Report path and parse position |
//! | [`Error::DeviceNotFound`] | Unknown device id | List known devices |

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when loading telemetry from a reading source.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The data file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The data file could not be decoded.
    #[error("Invalid data in {}: {source}", path.display())]
    Json {
        /// File that was being decoded.
        path: PathBuf,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// No device with the given identifier is known to the source.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),
}

impl Error {
    /// Create a [`Error::DeviceNotFound`] for the given identifier.
    pub fn device_not_found(device_id: impl Into<String>) -> Self {
        Self::DeviceNotFound(device_id.into())
    }
}

/// Result type alias using airwatch-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_not_found_display() {
        let err = Error::device_not_found("AQM-042");
        assert_eq!(err.to_string(), "Device not found: AQM-042");
    }

    #[test]
    fn test_io_error_display_includes_path() {
        let err = Error::Io {
            path: PathBuf::from("/tmp/missing.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/missing.json"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_json_error_has_source() {
        use std::error::Error as _;

        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = Error::Json {
            path: PathBuf::from("data.json"),
            source,
        };
        assert!(err.to_string().starts_with("Invalid data in data.json"));
        assert!(err.source().is_some());
    }
}
