//! Demo fleet for previews and tests.
//!
//! [`MockSource`] is a [`ReadingSource`] with four devices, a fixed latest
//! reading for each, and 24 hours of history at 30 minute spacing. History
//! is generated from a seeded RNG, so a given `(now, seed)` pair always
//! yields the same data.
//!
//! | Device | Name | Location | Base PM2.5 | Status |
//! |--------|------|----------|-----------:|--------|
//! | AQM-001 | Living Room Monitor | Mumbai, Maharashtra | 35 | online |
//! | AQM-002 | Office Air Quality | Delhi NCR | 85 | online |
//! | AQM-003 | Bedroom Sensor | Bangalore, Karnataka | 15 | offline |
//! | AQM-004 | Industrial Zone | Pune, Maharashtra | 150 | online |
//!
//! # Example
//!
//! ```
//! use airwatch_core::mock::MockSource;
//! use airwatch_core::source::ReadingSource;
//! use time::macros::datetime;
//!
//! let source = MockSource::new(datetime!(2024-01-15 12:00 UTC));
//! assert_eq!(source.devices().unwrap().len(), 4);
//! let latest = source.latest_reading("AQM-004").unwrap().unwrap();
//! assert_eq!(latest.pm25, 150.0);
//! ```

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use time::{Duration, OffsetDateTime};

use airwatch_types::{Device, DeviceStatus, Reading};

use crate::aggregate::Window;
use crate::error::{Error, Result};
use crate::source::{Dataset, ReadingSource};

/// Seed used by [`MockSource::new`].
pub const DEFAULT_SEED: u64 = 0x00A1_2025;

/// Hours of history generated per device.
pub const HISTORY_HOURS: i64 = 24;

/// Spacing between generated readings.
pub const HISTORY_INTERVAL_MINUTES: i64 = 30;

/// Baseline values a device's history varies around.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceProfile {
    pub pm25: f64,
    pub temperature: f64,
    pub humidity: f64,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self {
            pm25: 50.0,
            temperature: 25.0,
            humidity: 50.0,
        }
    }
}

struct MockDevice {
    id: &'static str,
    name: &'static str,
    location: &'static str,
    status: DeviceStatus,
    battery: u8,
    seen_minutes_ago: i64,
    profile: DeviceProfile,
    latest: LatestValues,
}

struct LatestValues {
    pm1: f64,
    pm25: f64,
    pm10: f64,
    temperature: f64,
    humidity: f64,
    nh3: f64,
    no2: f64,
    so2: f64,
    voc: f64,
}

const FLEET: [MockDevice; 4] = [
    MockDevice {
        id: "AQM-001",
        name: "Living Room Monitor",
        location: "Mumbai, Maharashtra",
        status: DeviceStatus::Online,
        battery: 85,
        seen_minutes_ago: 2,
        profile: DeviceProfile {
            pm25: 35.0,
            temperature: 24.0,
            humidity: 55.0,
        },
        latest: LatestValues {
            pm1: 18.0,
            pm25: 35.0,
            pm10: 45.0,
            temperature: 24.5,
            humidity: 55.0,
            nh3: 12.0,
            no2: 25.0,
            so2: 8.0,
            voc: 120.0,
        },
    },
    MockDevice {
        id: "AQM-002",
        name: "Office Air Quality",
        location: "Delhi NCR",
        status: DeviceStatus::Online,
        battery: 92,
        seen_minutes_ago: 5,
        profile: DeviceProfile {
            pm25: 85.0,
            temperature: 28.0,
            humidity: 45.0,
        },
        latest: LatestValues {
            pm1: 55.0,
            pm25: 85.0,
            pm10: 110.0,
            temperature: 28.2,
            humidity: 45.0,
            nh3: 35.0,
            no2: 48.0,
            so2: 22.0,
            voc: 280.0,
        },
    },
    MockDevice {
        id: "AQM-003",
        name: "Bedroom Sensor",
        location: "Bangalore, Karnataka",
        status: DeviceStatus::Offline,
        battery: 45,
        seen_minutes_ago: 45,
        profile: DeviceProfile {
            pm25: 15.0,
            temperature: 22.0,
            humidity: 60.0,
        },
        latest: LatestValues {
            pm1: 8.0,
            pm25: 15.0,
            pm10: 20.0,
            temperature: 22.1,
            humidity: 60.0,
            nh3: 5.0,
            no2: 12.0,
            so2: 3.0,
            voc: 65.0,
        },
    },
    MockDevice {
        id: "AQM-004",
        name: "Industrial Zone",
        location: "Pune, Maharashtra",
        status: DeviceStatus::Online,
        battery: 78,
        seen_minutes_ago: 1,
        profile: DeviceProfile {
            pm25: 150.0,
            temperature: 32.0,
            humidity: 40.0,
        },
        latest: LatestValues {
            pm1: 95.0,
            pm25: 150.0,
            pm10: 195.0,
            temperature: 32.5,
            humidity: 40.0,
            nh3: 68.0,
            no2: 92.0,
            so2: 45.0,
            voc: 450.0,
        },
    },
];

/// In-memory demo fleet anchored at a reference time.
#[derive(Debug, Clone)]
pub struct MockSource {
    data: Dataset,
    latest: HashMap<String, Reading>,
}

impl MockSource {
    /// The demo fleet with history ending at `now`.
    pub fn new(now: OffsetDateTime) -> Self {
        Self::with_seed(now, DEFAULT_SEED)
    }

    /// The demo fleet with a custom history seed.
    pub fn with_seed(now: OffsetDateTime, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut data = Dataset::default();
        let mut latest = HashMap::new();

        for (index, mock) in FLEET.iter().enumerate() {
            let last_seen = now - Duration::minutes(mock.seen_minutes_ago);
            data.devices.push(
                Device::new(mock.id, mock.name)
                    .with_location(mock.location)
                    .with_status(mock.status)
                    .with_battery(mock.battery)
                    .with_last_seen(last_seen),
            );
            data.readings
                .extend(generate_history(mock.id, mock.profile, now, &mut rng));

            let values = &mock.latest;
            let reading = Reading::builder(format!("latest-{}", index + 1), mock.id, last_seen)
                .pm1(values.pm1)
                .pm25(values.pm25)
                .pm10(values.pm10)
                .temperature(values.temperature)
                .humidity(values.humidity)
                .nh3(values.nh3)
                .no2(values.no2)
                .so2(values.so2)
                .voc(values.voc)
                .build();
            latest.insert(mock.id.to_string(), reading);
        }

        Self { data, latest }
    }

    /// The devices and generated history.
    pub fn dataset(&self) -> &Dataset {
        &self.data
    }

    /// Baseline profile for a device id; unknown ids get the default profile.
    pub fn profile(device_id: &str) -> DeviceProfile {
        FLEET
            .iter()
            .find(|m| m.id == device_id)
            .map(|m| m.profile)
            .unwrap_or_default()
    }
}

impl ReadingSource for MockSource {
    fn devices(&self) -> Result<Vec<Device>> {
        self.data.devices()
    }

    fn latest_reading(&self, device_id: &str) -> Result<Option<Reading>> {
        match self.latest.get(device_id) {
            Some(reading) => Ok(Some(reading.clone())),
            None => Err(Error::device_not_found(device_id)),
        }
    }

    fn readings(
        &self,
        device_id: &str,
        window: Window,
        now: OffsetDateTime,
    ) -> Result<Vec<Reading>> {
        self.data.readings(device_id, window, now)
    }
}

/// Generate [`HISTORY_HOURS`] of readings ending at `now`, oldest first.
pub fn generate_history<R: Rng>(
    device_id: &str,
    profile: DeviceProfile,
    now: OffsetDateTime,
    rng: &mut R,
) -> Vec<Reading> {
    let count = HISTORY_HOURS * 60 / HISTORY_INTERVAL_MINUTES;
    let mut readings: Vec<Reading> = (0..count)
        .map(|i| {
            let timestamp = now - Duration::minutes(i * HISTORY_INTERVAL_MINUTES);
            let pm_variation = (rng.random::<f64>() - 0.5) * 30.0;
            let temp_variation = (rng.random::<f64>() - 0.5) * 4.0;
            let humidity_variation = (rng.random::<f64>() - 0.5) * 15.0;

            let mut builder = Reading::builder(format!("reading-{}-{}", device_id, i), device_id, timestamp)
                .pm1((profile.pm25 * 0.6 + pm_variation * 0.6).max(0.0))
                .pm25((profile.pm25 + pm_variation).max(0.0))
                .pm10((profile.pm25 * 1.3 + pm_variation * 1.3).max(0.0))
                .temperature(profile.temperature + temp_variation)
                .humidity((profile.humidity + humidity_variation).clamp(20.0, 90.0));

            // Gas channels are reported intermittently
            if rng.random_bool(0.5) {
                builder = builder.nh3(rng.random_range(0.0..50.0));
            }
            if rng.random_bool(0.5) {
                builder = builder.no2(rng.random_range(0.0..80.0));
            }
            if rng.random_bool(0.5) {
                builder = builder.so2(rng.random_range(0.0..60.0));
            }
            if rng.random_bool(0.5) {
                builder = builder.voc(rng.random_range(0.0..200.0));
            }
            builder.build()
        })
        .collect();

    readings.reverse();
    readings
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2024-01-15 12:00 UTC);

    #[test]
    fn test_fleet_devices() {
        let source = MockSource::new(NOW);
        let devices = source.devices().unwrap();
        let ids: Vec<_> = devices.iter().map(|d| d.device_id.as_str()).collect();
        assert_eq!(ids, ["AQM-001", "AQM-002", "AQM-003", "AQM-004"]);

        let bedroom = &devices[2];
        assert_eq!(bedroom.raw_status, DeviceStatus::Offline);
        assert_eq!(bedroom.battery, Some(45));
        assert_eq!(bedroom.last_seen_at, Some(NOW - Duration::minutes(45)));
    }

    #[test]
    fn test_latest_readings_are_fixed() {
        let source = MockSource::new(NOW);
        let latest = source.latest_reading("AQM-002").unwrap().unwrap();
        assert_eq!(latest.id, "latest-2");
        assert_eq!(latest.pm25, 85.0);
        assert_eq!(latest.pm10, 110.0);
        assert_eq!(latest.voc, Some(280.0));
        assert_eq!(latest.timestamp, NOW - Duration::minutes(5));
    }

    #[test]
    fn test_history_shape() {
        let source = MockSource::new(NOW);
        let history = source.readings("AQM-001", Window::default(), NOW).unwrap();
        assert_eq!(history.len(), 48);
        assert!(history.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert_eq!(history.last().unwrap().timestamp, NOW);
        assert_eq!(history.first().unwrap().timestamp, NOW - Duration::minutes(47 * 30));
    }

    #[test]
    fn test_history_values_stay_near_profile() {
        let source = MockSource::new(NOW);
        for device in source.devices().unwrap() {
            let profile = MockSource::profile(&device.device_id);
            for r in source.readings(&device.device_id, Window::default(), NOW).unwrap() {
                assert!(r.pm25 >= 0.0);
                assert!(r.pm25 <= profile.pm25 + 15.0);
                assert!(r.pm25 >= (profile.pm25 - 15.0).max(0.0));
                let humidity = r.humidity.unwrap();
                assert!((20.0..=90.0).contains(&humidity));
            }
        }
    }

    #[test]
    fn test_same_seed_same_data() {
        let a = MockSource::with_seed(NOW, 7);
        let b = MockSource::with_seed(NOW, 7);
        assert_eq!(a.dataset(), b.dataset());

        let c = MockSource::with_seed(NOW, 8);
        assert_ne!(a.dataset(), c.dataset());
    }

    #[test]
    fn test_unknown_device() {
        let source = MockSource::new(NOW);
        assert!(matches!(source.latest_reading("AQM-404"), Err(Error::DeviceNotFound(_))));
        assert!(source.readings("AQM-404", Window::default(), NOW).is_err());
    }

    #[test]
    fn test_default_profile_for_unknown_id() {
        assert_eq!(MockSource::profile("AQM-404"), DeviceProfile::default());
        assert_eq!(MockSource::profile("AQM-004").pm25, 150.0);
    }
}
