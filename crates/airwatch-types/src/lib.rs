//! Platform-agnostic types for air-quality sensor telemetry.
//!
//! This crate provides the shared data model used by `airwatch-core` and
//! front ends that display its results.
//!
//! # Features
//!
//! - Sensor reading records with particulate, gas and climate channels
//! - Device records with a reported status flag
//! - AQI severity levels with labels and color tokens
//! - Error types for parsing text input
//!
//! # Example
//!
//! ```
//! use airwatch_types::{AqiLevel, Device, DeviceStatus};
//!
//! let device = Device::new("AQM-001", "Living Room Monitor")
//!     .with_status(DeviceStatus::from("online"));
//! assert!(device.raw_status.is_online());
//! assert_eq!(AqiLevel::Moderate.color(), "#ffff00");
//! ```

pub mod error;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use types::{AqiLevel, Device, DeviceStatus, Reading, ReadingBuilder, parse_timestamp};
