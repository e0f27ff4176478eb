//! Reading sources.
//!
//! A [`ReadingSource`] supplies device records and already-decoded readings
//! to the pure core. Sources are synchronous and owned by the caller.
//!
//! [`JsonFileSource`] loads a [`Dataset`] from a JSON file of the form:
//!
//! ```json
//! {
//!   "devices": [
//!     { "device_id": "AQM-001", "name": "Living Room Monitor", "status": "online",
//!       "last_seen_at": "2024-01-15T11:58:00Z" }
//!   ],
//!   "readings": [
//!     { "id": "r1", "device_id": "AQM-001", "timestamp": "2024-01-15T11:30:00Z",
//!       "pm1": 18.0, "pm25": 35.0, "pm10": 45.0 }
//!   ]
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use tracing::{debug, warn};

use airwatch_types::{Device, Reading};

use crate::aggregate::Window;
use crate::error::{Error, Result};

/// Supplies devices and their readings.
pub trait ReadingSource {
    /// All known devices, in display order.
    fn devices(&self) -> Result<Vec<Device>>;

    /// One device by identifier.
    fn device(&self, device_id: &str) -> Result<Device> {
        self.devices()?
            .into_iter()
            .find(|d| d.device_id == device_id)
            .ok_or_else(|| Error::device_not_found(device_id))
    }

    /// The most recent reading of a device, if it has any.
    fn latest_reading(&self, device_id: &str) -> Result<Option<Reading>>;

    /// Readings of a device that fall inside `window`.
    fn readings(&self, device_id: &str, window: Window, now: OffsetDateTime)
    -> Result<Vec<Reading>>;
}

impl<S: ReadingSource + ?Sized> ReadingSource for Box<S> {
    fn devices(&self) -> Result<Vec<Device>> {
        (**self).devices()
    }

    fn device(&self, device_id: &str) -> Result<Device> {
        (**self).device(device_id)
    }

    fn latest_reading(&self, device_id: &str) -> Result<Option<Reading>> {
        (**self).latest_reading(device_id)
    }

    fn readings(
        &self,
        device_id: &str,
        window: Window,
        now: OffsetDateTime,
    ) -> Result<Vec<Reading>> {
        (**self).readings(device_id, window, now)
    }
}

/// Devices and readings held in memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    pub devices: Vec<Device>,
    pub readings: Vec<Reading>,
}

/// File layout before each entry is decoded on its own.
#[derive(Deserialize)]
struct RawDataset {
    #[serde(default)]
    devices: Vec<Value>,
    #[serde(default)]
    readings: Vec<Value>,
}

impl Dataset {
    /// Decode a `{devices, readings}` document.
    ///
    /// Only a malformed document is an error. A device or reading that
    /// cannot be decoded is skipped with a warning, and a device whose
    /// `last_seen_at` is unreadable is kept with no last-seen time.
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        let raw: RawDataset = serde_json::from_str(content)?;

        let devices = raw
            .devices
            .into_iter()
            .filter_map(|value| {
                let reported_last_seen = value
                    .get("last_seen_at")
                    .filter(|v| !v.is_null())
                    .map(Value::to_string);
                match serde_json::from_value::<Device>(value) {
                    Ok(device) => {
                        if let (Some(raw), None) = (reported_last_seen, device.last_seen_at) {
                            warn!(
                                device = %device.device_id,
                                last_seen_at = %raw,
                                "Unreadable last_seen_at, device treated as never seen"
                            );
                        }
                        Some(device)
                    }
                    Err(e) => {
                        warn!("Skipped malformed device: {}", e);
                        None
                    }
                }
            })
            .collect();

        let total = raw.readings.len();
        let readings: Vec<Reading> = raw
            .readings
            .into_iter()
            .filter_map(|value| {
                let id = value.get("id").map(Value::to_string).unwrap_or_default();
                match serde_json::from_value::<Reading>(value) {
                    Ok(reading) => Some(reading),
                    Err(e) => {
                        debug!(reading = %id, "Malformed reading: {}", e);
                        None
                    }
                }
            })
            .collect();
        let skipped = total - readings.len();
        if skipped > 0 {
            warn!("Skipped {} malformed readings", skipped);
        }

        Ok(Self { devices, readings })
    }

    fn has_device(&self, device_id: &str) -> bool {
        self.devices.iter().any(|d| d.device_id == device_id)
    }

    fn ensure_device(&self, device_id: &str) -> Result<()> {
        if self.has_device(device_id) {
            Ok(())
        } else {
            Err(Error::device_not_found(device_id))
        }
    }

    /// Drop readings that belong to no known device.
    fn prune_orphans(&mut self) {
        let before = self.readings.len();
        let devices = &self.devices;
        self.readings.retain(|r| {
            let known = devices.iter().any(|d| d.device_id == r.device_id);
            if !known {
                debug!(reading = %r.id, device = %r.device_id, "Unknown device id");
            }
            known
        });
        let skipped = before - self.readings.len();
        if skipped > 0 {
            warn!("Skipped {} readings with unknown device ids", skipped);
        }
    }
}

impl ReadingSource for Dataset {
    fn devices(&self) -> Result<Vec<Device>> {
        Ok(self.devices.clone())
    }

    fn latest_reading(&self, device_id: &str) -> Result<Option<Reading>> {
        self.ensure_device(device_id)?;
        Ok(self
            .readings
            .iter()
            .filter(|r| r.device_id == device_id)
            .max_by_key(|r| r.timestamp)
            .cloned())
    }

    fn readings(
        &self,
        device_id: &str,
        window: Window,
        now: OffsetDateTime,
    ) -> Result<Vec<Reading>> {
        self.ensure_device(device_id)?;
        Ok(self
            .readings
            .iter()
            .filter(|r| r.device_id == device_id && window.contains(r.timestamp, now))
            .cloned()
            .collect())
    }
}

/// A dataset loaded from a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
    data: Dataset,
}

impl JsonFileSource {
    /// Read and decode `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = fs::read_to_string(&path).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        let mut data = Dataset::from_json(&content).map_err(|source| Error::Json {
            path: path.clone(),
            source,
        })?;
        data.prune_orphans();

        debug!(
            path = %path.display(),
            devices = data.devices.len(),
            readings = data.readings.len(),
            "Loaded dataset"
        );
        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dataset(&self) -> &Dataset {
        &self.data
    }
}

impl ReadingSource for JsonFileSource {
    fn devices(&self) -> Result<Vec<Device>> {
        self.data.devices()
    }

    fn latest_reading(&self, device_id: &str) -> Result<Option<Reading>> {
        self.data.latest_reading(device_id)
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
