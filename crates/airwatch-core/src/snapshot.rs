//! Display-ready device snapshots.
//!
//! A [`DeviceSnapshot`] combines the AQI of the latest reading, the device's
//! freshness and the window summary. Snapshots are rebuilt on every query.

use core::fmt;

use serde::Serialize;
use time::OffsetDateTime;

use airwatch_types::{Device, DeviceStatus, Reading};

use crate::aggregate::{ChartPoint, ReadingAggregator, Summary, Window};
use crate::aqi::{AqiBadge, AqiResult, AqiScale, should_alert};
use crate::clock::{Clock, SystemClock};
use crate::freshness::{FreshnessEvaluator, FreshnessPolicy};

/// The latest reading with every channel defaulted to `0` when absent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DisplayReading {
    /// When the reading was taken; `None` if the device has no reading.
    #[serde(with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,
    pub pm1: f64,
    pub pm25: f64,
    pub pm10: f64,
    pub nh3: f64,
    pub no2: f64,
    pub so2: f64,
    pub voc: f64,
    pub temperature: f64,
    pub humidity: f64,
}

impl DisplayReading {
    pub fn from_reading(reading: Option<&Reading>) -> Self {
        let Some(r) = reading else {
            return Self::default();
        };
        Self {
            timestamp: Some(r.timestamp),
            pm1: or_zero(r.pm1),
            pm25: or_zero(r.pm25),
            pm10: or_zero(r.pm10),
            nh3: r.nh3.map_or(0.0, or_zero),
            no2: r.no2.map_or(0.0, or_zero),
            so2: r.so2.map_or(0.0, or_zero),
            voc: r.voc.map_or(0.0, or_zero),
            temperature: r.temperature.map_or(0.0, or_zero),
            humidity: r.humidity.map_or(0.0, or_zero),
        }
    }

    /// Whether this was built from an actual reading.
    pub fn has_reading(&self) -> bool {
        self.timestamp.is_some()
    }
}

fn or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Everything a device card or dashboard needs for one device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceSnapshot {
    pub device: Device,
    pub current: DisplayReading,
    /// Index of `current.pm25`.
    pub aqi: AqiResult,
    pub is_online: bool,
    /// Status flag as reported, kept next to the derived `is_online`.
    pub raw_status: DeviceStatus,
    pub is_stale: bool,
    pub recency_label: String,
    pub summary: Summary,
    /// The current reading warrants an air quality alert.
    pub alert: bool,
}

impl DeviceSnapshot {
    /// Badge for list views; "Unknown" when the device has no reading.
    pub fn badge(&self) -> AqiBadge {
        if self.current.has_reading() {
            AqiBadge::from(self.aqi)
        } else {
            AqiBadge::unknown()
        }
    }

    /// Reported status and derived status disagree.
    pub fn status_mismatch(&self) -> bool {
        self.raw_status.is_online() != self.is_online || (self.is_online && self.is_stale)
    }
}

/// Builds [`DeviceSnapshot`]s with an injected clock.
#[derive(Debug, Clone)]
pub struct SnapshotBuilder<C: Clock = SystemClock> {
    clock: C,
    aggregator: ReadingAggregator,
    freshness: FreshnessEvaluator,
    scale: AqiScale,
}

impl Default for SnapshotBuilder<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> SnapshotBuilder<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            aggregator: ReadingAggregator::default(),
            freshness: FreshnessEvaluator::default(),
            scale: AqiScale::default(),
        }
    }

    #[must_use]
    pub fn window(mut self, window: Window) -> Self {
        self.aggregator = ReadingAggregator::new(window).with_scale(self.scale);
        self
    }

    #[must_use]
    pub fn policy(mut self, policy: FreshnessPolicy) -> Self {
        self.freshness = FreshnessEvaluator::new(policy);
        self
    }

    #[must_use]
    pub fn scale(mut self, scale: AqiScale) -> Self {
        self.scale = scale;
        self.aggregator = self.aggregator.with_scale(scale);
        self
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn aggregator(&self) -> &ReadingAggregator {
        &self.aggregator
    }

    /// Compose a snapshot from a device, its latest reading and the readings
    /// of the summary window.
    #[must_use]
    pub fn build(
        &self,
        device: &Device,
        latest: Option<&Reading>,
        window_readings: &[Reading],
    ) -> DeviceSnapshot {
        let now = self.clock.now();
        let current = DisplayReading::from_reading(latest);
        let aqi = self.scale.classify(current.pm25);
        let freshness = self.freshness.evaluate(device, now);
        let summary = self.aggregator.summarize(window_readings, now);

        DeviceSnapshot {
            device: device.clone(),
            current,
            aqi,
            is_online: freshness.is_online,
            raw_status: freshness.raw_status,
            is_stale: freshness.is_stale,
            recency_label: freshness.recency_label,
            summary,
            alert: should_alert(current.pm25, &aqi),
        }
    }

    /// Chart series for the configured window.
    #[must_use]
    pub fn series(&self, readings: &[Reading]) -> Vec<ChartPoint> {
        self.aggregator.series(readings, self.clock.now())
    }
}

/// Fleet-level counts for the device list header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FleetOverview {
    pub total: usize,
    pub online: usize,
    pub stale: usize,
    pub alerts: usize,
}

impl FleetOverview {
    pub fn from_snapshots(snapshots: &[DeviceSnapshot]) -> Self {
        snapshots.iter().fold(Self::default(), |mut acc, s| {
            acc.total += 1;
            acc.online += usize::from(s.is_online);
            acc.stale += usize::from(s.is_stale);
            acc.alerts += usize::from(s.alert);
            acc
        })
    }
}

impl fmt::Display for FleetOverview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} devices online", self.online, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::PeakTime;
    use crate::aqi::classify;
    use crate::clock::FixedClock;
    use airwatch_types::AqiLevel;
    use time::Duration;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2024-01-15 12:00 UTC);

    fn builder() -> SnapshotBuilder<FixedClock> {
        SnapshotBuilder::new(FixedClock::new(NOW))
    }

    fn device() -> Device {
        Device::new("AQM-002", "Office Air Quality")
            .with_location("Delhi NCR")
            .with_status(DeviceStatus::Online)
            .with_last_seen(NOW - Duration::minutes(5))
    }

    #[test]
    fn test_build_composes_parts() {
        let latest = Reading::builder("latest-2", "AQM-002", NOW - Duration::minutes(5))
            .pm1(55.0)
            .pm25(85.0)
            .pm10(110.0)
            .temperature(28.2)
            .humidity(45.0)
            .build();
        let history = vec![
            Reading::new("a", "AQM-002", NOW - Duration::hours(3), 70.0),
            Reading::new("b", "AQM-002", NOW - Duration::hours(2), 90.0),
        ];

        let snapshot = builder().build(&device(), Some(&latest), &history);

        assert_eq!(snapshot.aqi, classify(85.0));
        assert_eq!(snapshot.aqi.level, AqiLevel::Unhealthy);
        assert!(snapshot.is_online);
        assert!(!snapshot.is_stale);
        assert_eq!(snapshot.recency_label, "5 min ago");
        assert_eq!(snapshot.summary.max, 90.0);
        assert_eq!(snapshot.summary.avg, 80.0);
        assert_eq!(snapshot.summary.peak_time, PeakTime::At(NOW - Duration::hours(2)));
        assert!(snapshot.alert);
        assert_eq!(snapshot.current.pm10, 110.0);
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let latest = Reading::new("r", "AQM-002", NOW, 15.0);
        let snapshot = builder().build(&device(), Some(&latest), &[]);

        assert_eq!(snapshot.current.pm25, 15.0);
        assert_eq!(snapshot.current.pm1, 0.0);
        assert_eq!(snapshot.current.pm10, 0.0);
        assert_eq!(snapshot.current.nh3, 0.0);
        assert_eq!(snapshot.current.temperature, 0.0);
        assert_eq!(snapshot.summary, Summary::EMPTY);
        assert!(!snapshot.alert);
    }

    #[test]
    fn test_no_reading_at_all() {
        let device = Device::new("AQM-009", "New Sensor");
        let snapshot = builder().build(&device, None, &[]);

        assert_eq!(snapshot.aqi, classify(0.0));
        assert_eq!(snapshot.current, DisplayReading::default());
        assert!(!snapshot.is_online);
        assert!(snapshot.is_stale);
        assert_eq!(snapshot.recency_label, "many days ago");
        assert_eq!(snapshot.badge(), AqiBadge::unknown());
    }

    #[test]
    fn test_badge_with_reading() {
        let latest = Reading::new("r", "AQM-002", NOW, 35.0);
        let snapshot = builder().build(&device(), Some(&latest), &[]);
        assert_eq!(snapshot.badge().level, Some(AqiLevel::Moderate));
    }

    #[test]
    fn test_policy_is_applied() {
        let old = device().with_last_seen(NOW - Duration::hours(2));

        let passthrough = builder().build(&old, None, &[]);
        assert!(passthrough.is_online);
        assert!(passthrough.is_stale);
        assert!(passthrough.status_mismatch());

        let strict = builder()
            .policy(FreshnessPolicy::StaleAfter(Duration::minutes(30)))
            .build(&old, None, &[]);
        assert!(!strict.is_online);
        assert_eq!(strict.raw_status, DeviceStatus::Online);
        assert!(strict.status_mismatch());
    }

    #[test]
    fn test_window_is_applied() {
        let history = vec![
            Reading::new("a", "AQM-002", NOW - Duration::hours(3), 70.0),
            Reading::new("b", "AQM-002", NOW - Duration::minutes(30), 20.0),
        ];
        let snapshot = builder()
            .window(Window::last_hours(1))
            .build(&device(), None, &history);
        assert_eq!(snapshot.summary.count, 1);
        assert_eq!(snapshot.summary.max, 20.0);
    }

    #[test]
    fn test_scale_is_applied_to_current_and_series() {
        let latest = Reading::new("r", "AQM-002", NOW, 10.0);
        let builder = builder().scale(AqiScale::epa_2024());

        assert_eq!(builder.build(&device(), Some(&latest), &[]).aqi.level, AqiLevel::Moderate);
        assert_eq!(builder.series(&[latest])[0].aqi.level, AqiLevel::Moderate);
    }

    #[test]
    fn test_idempotent() {
        let latest = Reading::new("r", "AQM-002", NOW, 42.0);
        let history = vec![Reading::new("a", "AQM-002", NOW - Duration::hours(1), 40.0)];
        let b = builder();
        assert_eq!(
            b.build(&device(), Some(&latest), &history),
            b.build(&device(), Some(&latest), &history)
        );
    }

    #[test]
    fn test_fleet_overview() {
        let b = builder();
        let online = b.build(&device(), Some(&Reading::new("r", "AQM-002", NOW, 85.0)), &[]);
        let offline = b.build(
            &Device::new("AQM-003", "Bedroom").with_status(DeviceStatus::Offline),
            None,
            &[],
        );

        let overview = FleetOverview::from_snapshots(&[online, offline]);
        assert_eq!(overview.total, 2);
        assert_eq!(overview.online, 1);
        assert_eq!(overview.stale, 1);
        assert_eq!(overview.alerts, 1);
        assert_eq!(overview.to_string(), "1 of 2 devices online");
        assert_eq!(FleetOverview::from_snapshots(&[]).to_string(), "0 of 0 devices online");
    }

    #[test]
    fn test_snapshot_serialization() {
        let snapshot = builder().build(&device(), None, &[]);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["raw_status"], "online");
        assert_eq!(json["summary"]["peak_time"], "N/A");
        assert!(json["current"]["timestamp"].is_null());
        assert_eq!(json["aqi"]["label"], "Good");
    }
}
