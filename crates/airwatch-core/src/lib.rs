//! Air Quality Index computation and telemetry summaries for air-quality
//! sensor fleets.
//!
//! This crate turns raw particulate readings into the values a device list
//! and a per-device dashboard display.
//!
//! # Features
//!
//! - **AQI classification**: PM2.5 to index value, label and color via a
//!   static EPA breakpoint table ([`aqi`])
//! - **Window summaries**: max, mean and peak time over the last 24 hours or
//!   an explicit date range, plus a per-point chart series ([`aggregate`])
//! - **Freshness**: "5 min ago" labels and online/offline status with an
//!   explicit policy for stale devices ([`freshness`])
//! - **Snapshots**: everything above composed per device ([`snapshot`])
//! - **Sources**: a JSON file source and a seeded demo fleet ([`source`],
//!   [`mock`])
//!
//! Everything except the sources is pure: no I/O, no shared state, and the
//! current time is always passed in (directly or through a [`Clock`]), so
//! identical inputs give identical output.
//!
//! # Quick Start
//!
//! ```
//! use airwatch_core::{FixedClock, MockSource, ReadingSource, SnapshotBuilder, Window};
//! use time::macros::datetime;
//!
//! # fn main() -> airwatch_core::Result<()> {
//! let now = datetime!(2024-01-15 12:00 UTC);
//! let source = MockSource::new(now);
//! let builder = SnapshotBuilder::new(FixedClock::new(now));
//!
//! for device in source.devices()? {
//!     let latest = source.latest_reading(&device.device_id)?;
//!     let history = source.readings(&device.device_id, Window::default(), now)?;
//!     let snapshot = builder.build(&device, latest.as_ref(), &history);
//!     println!(
//!         "{}: AQI {} ({}), {}",
//!         device.name, snapshot.aqi.value, snapshot.aqi.label, snapshot.recency_label
//!     );
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod aqi;
pub mod clock;
pub mod error;
pub mod freshness;
pub mod mock;
pub mod snapshot;
pub mod source;

pub use airwatch_types::types;

// Core exports
pub use aggregate::{ChartPoint, PeakTime, ReadingAggregator, Summary, Window, aggregate, series};
pub use aqi::{AqiBadge, AqiResult, AqiScale, Breakpoint, classify, classify_opt, should_alert};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Error, Result};
pub use freshness::{Freshness, FreshnessEvaluator, FreshnessPolicy, Recency, evaluate};
pub use mock::MockSource;
pub use snapshot::{DeviceSnapshot, DisplayReading, FleetOverview, SnapshotBuilder};
pub use source::{Dataset, JsonFileSource, ReadingSource};

// Re-export from airwatch-types
pub use airwatch_types::{AqiLevel, Device, DeviceStatus, Reading};
