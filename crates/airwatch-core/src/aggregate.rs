//! Time-window aggregation of PM2.5 readings.
//!
//! [`aggregate`] folds one device's readings into a [`Summary`] (max, mean and
//! the time of the first peak). [`series`] produces the time-ordered chart
//! series with an AQI value computed for every point.
//!
//! Input does not need to be sorted. Readings without a usable PM2.5 value
//! are left out of the statistics but still appear in the chart series.
//!
//! # Example
//!
//! ```
//! use airwatch_core::aggregate::{aggregate, PeakTime, Window};
//! use airwatch_types::Reading;
//! use time::macros::datetime;
//!
//! let now = datetime!(2024-01-15 12:00 UTC);
//! let readings = vec![
//!     Reading::new("a", "AQM-001", datetime!(2024-01-15 09:00 UTC), 10.0),
//!     Reading::new("b", "AQM-001", datetime!(2024-01-15 10:00 UTC), 50.0),
//!     Reading::new("c", "AQM-001", datetime!(2024-01-15 11:00 UTC), 50.0),
//! ];
//!
//! let summary = aggregate(&readings, Window::default(), now);
//! assert_eq!(summary.max, 50.0);
//! assert_eq!(summary.peak_time, PeakTime::At(datetime!(2024-01-15 10:00 UTC)));
//! ```

use core::fmt;

use serde::{Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};
use tracing::debug;

use airwatch_types::Reading;

use crate::aqi::{AqiResult, AqiScale};

/// Default trailing window length in hours.
pub const DEFAULT_WINDOW_HOURS: u32 = 24;

/// Text shown when there is no peak to report.
pub const NOT_AVAILABLE: &str = "N/A";

/// The span of time a summary covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// Everything from `now - span` up to and including `now`.
    Trailing(Duration),
    /// Everything from `start` to `end`, both inclusive.
    Between {
        start: OffsetDateTime,
        end: OffsetDateTime,
    },
}

impl Default for Window {
    fn default() -> Self {
        Self::last_hours(DEFAULT_WINDOW_HOURS)
    }
}

impl Window {
    /// A trailing window of the given number of hours.
    pub fn last_hours(hours: u32) -> Self {
        Self::Trailing(Duration::hours(i64::from(hours)))
    }

    /// An explicit date range.
    pub fn between(start: OffsetDateTime, end: OffsetDateTime) -> Self {
        Self::Between { start, end }
    }

    /// Whether `timestamp` falls inside this window relative to `now`.
    ///
    /// `now` is only consulted for [`Window::Trailing`].
    #[must_use]
    pub fn contains(&self, timestamp: OffsetDateTime, now: OffsetDateTime) -> bool {
        match *self {
            Window::Trailing(span) => timestamp <= now && now - timestamp <= span,
            Window::Between { start, end } => start <= timestamp && timestamp <= end,
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Window::Trailing(span) => write!(f, "last {} h", span.whole_hours()),
            Window::Between { start, end } => {
                let start = start.format(&Rfc3339).map_err(|_| fmt::Error)?;
                let end = end.format(&Rfc3339).map_err(|_| fmt::Error)?;
                write!(f, "{} to {}", start, end)
            }
        }
    }
}

/// When the maximum was first reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeakTime {
    /// Timestamp of the earliest reading holding the maximum.
    At(OffsetDateTime),
    /// No usable readings in the window.
    NotAvailable,
}

impl PeakTime {
    /// The peak timestamp, if any.
    pub fn timestamp(&self) -> Option<OffsetDateTime> {
        match self {
            PeakTime::At(at) => Some(*at),
            PeakTime::NotAvailable => None,
        }
    }
}

impl fmt::Display for PeakTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeakTime::At(at) => {
                let formatted = at.format(&Rfc3339).map_err(|_| fmt::Error)?;
                f.write_str(&formatted)
            }
            PeakTime::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

impl Serialize for PeakTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Summary statistics over a window of readings.
///
/// Values are not rounded; rounding is left to presentation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    /// Highest PM2.5 in µg/m³ (0 when empty).
    pub max: f64,
    /// Mean PM2.5 in µg/m³ (0 when empty).
    pub avg: f64,
    /// When `max` was first reached.
    pub peak_time: PeakTime,
    /// Number of readings that contributed.
    pub count: usize,
}

impl Summary {
    /// The summary of an empty window.
    pub const EMPTY: Summary = Summary {
        max: 0.0,
        avg: 0.0,
        peak_time: PeakTime::NotAvailable,
        count: 0,
    };

    /// Whether no reading contributed.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl Default for Summary {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// One point of the chart series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub pm1: Option<f64>,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub nh3: Option<f64>,
    pub no2: Option<f64>,
    pub so2: Option<f64>,
    pub voc: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    /// Index computed from this point's own `pm25`.
    pub aqi: AqiResult,
}

impl ChartPoint {
    fn from_reading(reading: &Reading, scale: &AqiScale) -> Self {
        Self {
            timestamp: reading.timestamp,
            pm1: finite(reading.pm1),
            pm25: reading.pm25_value(),
            pm10: finite(reading.pm10),
            nh3: reading.nh3.and_then(finite),
            no2: reading.no2.and_then(finite),
            so2: reading.so2.and_then(finite),
            voc: reading.voc.and_then(finite),
            temperature: reading.temperature.and_then(finite),
            humidity: reading.humidity.and_then(finite),
            aqi: scale.classify(reading.pm25),
        }
    }
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Aggregates readings over a configured window.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReadingAggregator {
    window: Window,
    scale: AqiScale,
}

impl ReadingAggregator {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            scale: AqiScale::default(),
        }
    }

    /// Use a different breakpoint table for the chart series.
    #[must_use]
    pub fn with_scale(mut self, scale: AqiScale) -> Self {
        self.scale = scale;
        self
    }

    pub fn window(&self) -> Window {
        self.window
    }

    /// Readings inside the window, sorted by timestamp.
    ///
    /// The sort is stable, so readings sharing a timestamp keep their input
    /// order.
    pub fn in_window<'a>(&self, readings: &'a [Reading], now: OffsetDateTime) -> Vec<&'a Reading> {
        let mut selected: Vec<&Reading> = readings
            .iter()
            .filter(|r| self.window.contains(r.timestamp, now))
            .collect();
        selected.sort_by_key(|r| r.timestamp);

        debug!(
            total = readings.len(),
            selected = selected.len(),
            window = %self.window,
            "Filtered readings to window"
        );
        selected
    }

    /// Max, mean and peak time of PM2.5 within the window.
    #[must_use]
    pub fn summarize(&self, readings: &[Reading], now: OffsetDateTime) -> Summary {
        summarize_sorted(&self.in_window(readings, now))
    }

    /// The chart series for the window, oldest first.
    #[must_use]
    pub fn series(&self, readings: &[Reading], now: OffsetDateTime) -> Vec<ChartPoint> {
        self.in_window(readings, now)
            .into_iter()
            .map(|r| ChartPoint::from_reading(r, &self.scale))
            .collect()
    }
}

/// Fold readings already in ascending timestamp order.
fn summarize_sorted(readings: &[&Reading]) -> Summary {
    let mut sum = 0.0;
    let mut count = 0usize;
    let mut peak: Option<(f64, OffsetDateTime)> = None;

    for reading in readings {
        let Some(pm25) = reading.pm25_value() else {
            continue;
        };
        sum += pm25;
        count += 1;
        // Strictly greater keeps the earliest reading on ties.
        if peak.is_none_or(|(max, _)| pm25 > max) {
            peak = Some((pm25, reading.timestamp));
        }
    }

    match peak {
        Some((max, at)) => Summary {
            max,
            avg: sum / count as f64,
            peak_time: PeakTime::At(at),
            count,
        },
        None => Summary::EMPTY,
    }
}

/// Summarize `readings` over `window` relative to `now`.
#[must_use]
pub fn aggregate(readings: &[Reading], window: Window, now: OffsetDateTime) -> Summary {
    ReadingAggregator::new(window).summarize(readings, now)
}

/// Chart series for `readings` over `window` relative to `now`.
#[must_use]
pub fn series(readings: &[Reading], window: Window, now: OffsetDateTime) -> Vec<ChartPoint> {
    ReadingAggregator::new(window).series(readings, now)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2024-01-15 12:00 UTC);

    fn arb_readings() -> impl Strategy<Value = Vec<Reading>> {
        prop::collection::vec((0i64..2 * 24 * 60, any::<f64>()), 0..64).prop_map(|items| {
            items
                .into_iter()
                .enumerate()
                .map(|(i, (minutes_ago, pm25))| {
                    Reading::new(
                        format!("r{}", i),
                        "AQM-001",
                        NOW - Duration::minutes(minutes_ago),
                        pm25,
                    )
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn aggregate_never_panics(readings in arb_readings()) {
            let _ = aggregate(&readings, Window::default(), NOW);
            let _ = series(&readings, Window::default(), NOW);
        }

        #[test]
        fn max_bounds_every_usable_value(readings in arb_readings()) {
            let summary = aggregate(&readings, Window::default(), NOW);
            for r in &readings {
                if let Some(pm25) = r.pm25_value()
                    && Window::default().contains(r.timestamp, NOW)
                {
                    prop_assert!(pm25 <= summary.max);
                }
            }
        }

        #[test]
        fn peak_time_is_none_only_when_empty(readings in arb_readings()) {
            let summary = aggregate(&readings, Window::default(), NOW);
            prop_assert_eq!(summary.is_empty(), summary.peak_time == PeakTime::NotAvailable);
        }
    }
}
