//! Core types for air-quality sensor data.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::ParseError;

/// Severity category of an Air Quality Index value.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new levels
/// in future versions without breaking downstream code.
///
/// # Ordering
///
/// Levels are ordered by severity: `Good < Moderate < ... < Hazardous`.
/// This allows comparisons like `if level >= AqiLevel::Unhealthy { ... }`.
///
/// # Display vs Serialization
///
/// **Note:** The `Display` trait returns the human-readable label
/// ("Unhealthy for Sensitive Groups"), while serde serialization uses the
/// variant names ("UnhealthyForSensitiveGroups").
///
/// ```
/// use airwatch_types::AqiLevel;
///
/// assert_eq!(format!("{}", AqiLevel::VeryUnhealthy), "Very Unhealthy");
/// assert!(AqiLevel::Hazardous > AqiLevel::Unhealthy);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub enum AqiLevel {
    /// Index 0-50.
    Good,
    /// Index 51-100.
    Moderate,
    /// Index 101-150.
    UnhealthyForSensitiveGroups,
    /// Index 151-200.
    Unhealthy,
    /// Index 201-300.
    VeryUnhealthy,
    /// Index 301 and above.
    Hazardous,
}

impl AqiLevel {
    /// All levels, from least to most severe.
    pub const ALL: [AqiLevel; 6] = [
        AqiLevel::Good,
        AqiLevel::Moderate,
        AqiLevel::UnhealthyForSensitiveGroups,
        AqiLevel::Unhealthy,
        AqiLevel::VeryUnhealthy,
        AqiLevel::Hazardous,
    ];

    /// Human-readable label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            AqiLevel::Good => "Good",
            AqiLevel::Moderate => "Moderate",
            AqiLevel::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            AqiLevel::Unhealthy => "Unhealthy",
            AqiLevel::VeryUnhealthy => "Very Unhealthy",
            AqiLevel::Hazardous => "Hazardous",
        }
    }

    /// Display color token (hex RGB) from the EPA color scale.
    #[must_use]
    pub fn color(&self) -> &'static str {
        match self {
            AqiLevel::Good => "#00e400",
            AqiLevel::Moderate => "#ffff00",
            AqiLevel::UnhealthyForSensitiveGroups => "#ff7e00",
            AqiLevel::Unhealthy => "#ff0000",
            AqiLevel::VeryUnhealthy => "#8f3f97",
            AqiLevel::Hazardous => "#7e0023",
        }
    }

    /// RGB components of [`color`](Self::color), for terminal rendering.
    #[must_use]
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            AqiLevel::Good => (0x00, 0xe4, 0x00),
            AqiLevel::Moderate => (0xff, 0xff, 0x00),
            AqiLevel::UnhealthyForSensitiveGroups => (0xff, 0x7e, 0x00),
            AqiLevel::Unhealthy => (0xff, 0x00, 0x00),
            AqiLevel::VeryUnhealthy => (0x8f, 0x3f, 0x97),
            AqiLevel::Hazardous => (0x7e, 0x00, 0x23),
        }
    }

    /// Suggested action for this level.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            AqiLevel::Good => "No action needed",
            AqiLevel::Moderate => "Unusually sensitive people should limit prolonged exertion",
            AqiLevel::UnhealthyForSensitiveGroups => {
                "Sensitive groups should limit outdoor activities"
            }
            AqiLevel::Unhealthy => "Consider limiting outdoor activities",
            AqiLevel::VeryUnhealthy => "Avoid outdoor activities",
            AqiLevel::Hazardous => "Stay indoors and keep windows closed",
        }
    }
}

impl fmt::Display for AqiLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AqiLevel {
    type Err = ParseError;

    /// Parse a level from its label or a short name (case-insensitive).
    ///
    /// ```
    /// use airwatch_types::AqiLevel;
    ///
    /// assert_eq!("moderate".parse::<AqiLevel>().unwrap(), AqiLevel::Moderate);
    /// assert_eq!("usg".parse::<AqiLevel>().unwrap(), AqiLevel::UnhealthyForSensitiveGroups);
    /// assert_eq!("Very Unhealthy".parse::<AqiLevel>().unwrap(), AqiLevel::VeryUnhealthy);
    /// assert!("bogus".parse::<AqiLevel>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "good" => Ok(AqiLevel::Good),
            "moderate" => Ok(AqiLevel::Moderate),
            "usg" | "sensitive" | "unhealthyforsensitivegroups" => {
                Ok(AqiLevel::UnhealthyForSensitiveGroups)
            }
            "unhealthy" => Ok(AqiLevel::Unhealthy),
            "veryunhealthy" => Ok(AqiLevel::VeryUnhealthy),
            "hazardous" => Ok(AqiLevel::Hazardous),
            _ => Err(ParseError::UnknownAqiLevel(s.to_string())),
        }
    }
}

/// Status flag reported by the device or its gateway.
///
/// This is an external claim, not a judgment derived from reading age.
/// Unrecognized strings map to [`DeviceStatus::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase", from = "String"))]
pub enum DeviceStatus {
    Online,
    Offline,
    #[default]
    Unknown,
}

impl DeviceStatus {
    #[must_use]
    pub fn is_online(&self) -> bool {
        matches!(self, DeviceStatus::Online)
    }
}

impl From<&str> for DeviceStatus {
    fn from(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "online" => DeviceStatus::Online,
            "offline" => DeviceStatus::Offline,
            _ => DeviceStatus::Unknown,
        }
    }
}

impl From<String> for DeviceStatus {
    fn from(value: String) -> Self {
        DeviceStatus::from(value.as_str())
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceStatus::Online => write!(f, "online"),
            DeviceStatus::Offline => write!(f, "offline"),
            DeviceStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// A single measurement record from a sensor device.
///
/// `pm1`, `pm25` and `pm10` are always present but may be `NaN` when the
/// sensor did not report them; a JSON `null`, a missing field or a
/// non-numeric value decodes to `NaN`. Numeric strings are accepted. All
/// other channels are optional.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reading {
    /// Record identifier.
    pub id: String,
    /// Identifier of the device that produced the reading.
    pub device_id: String,
    /// When the reading was taken.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub timestamp: OffsetDateTime,
    /// PM1 concentration in µg/m³.
    #[cfg_attr(feature = "serde", serde(default = "nan", deserialize_with = "lenient::f64_or_nan"))]
    pub pm1: f64,
    /// PM2.5 concentration in µg/m³.
    #[cfg_attr(feature = "serde", serde(default = "nan", deserialize_with = "lenient::f64_or_nan"))]
    pub pm25: f64,
    /// PM10 concentration in µg/m³.
    #[cfg_attr(feature = "serde", serde(default = "nan", deserialize_with = "lenient::f64_or_nan"))]
    pub pm10: f64,
    /// Ammonia in ppm.
    #[cfg_attr(feature = "serde", serde(default, deserialize_with = "lenient::option_f64"))]
    pub nh3: Option<f64>,
    /// Nitrogen dioxide in ppm.
    #[cfg_attr(feature = "serde", serde(default, deserialize_with = "lenient::option_f64"))]
    pub no2: Option<f64>,
    /// Sulfur dioxide in ppm.
    #[cfg_attr(feature = "serde", serde(default, deserialize_with = "lenient::option_f64"))]
    pub so2: Option<f64>,
    /// Volatile organic compounds in ppb.
    #[cfg_attr(feature = "serde", serde(default, deserialize_with = "lenient::option_f64"))]
    pub voc: Option<f64>,
    /// Temperature in degrees Celsius.
    #[cfg_attr(feature = "serde", serde(default, deserialize_with = "lenient::option_f64"))]
    pub temperature: Option<f64>,
    /// Relative humidity percentage.
    #[cfg_attr(feature = "serde", serde(default, deserialize_with = "lenient::option_f64"))]
    pub humidity: Option<f64>,
}

#[cfg(feature = "serde")]
fn nan() -> f64 {
    f64::NAN
}

/// Field decoders that never reject a record over one bad value.
///
/// Sensor payloads are loosely typed: numbers may arrive as strings and
/// timestamps may be garbage. A value that cannot be read decodes as
/// missing (`NaN` or `None`) instead of failing the whole record.
#[cfg(feature = "serde")]
mod lenient {
    use core::fmt;

    use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
    use serde::{Deserialize, Deserializer};
    use time::OffsetDateTime;

    /// Any JSON-like scalar, reduced to what the decoders care about.
    enum Loose {
        Number(f64),
        Text(String),
        Nothing,
    }

    impl Loose {
        fn number(self) -> Option<f64> {
            match self {
                Loose::Number(n) => Some(n),
                Loose::Text(s) => s.trim().parse().ok(),
                Loose::Nothing => None,
            }
        }
    }

    struct LooseVisitor;

    impl<'de> Visitor<'de> for LooseVisitor {
        type Value = Loose;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("any value")
        }

        fn visit_bool<E: de::Error>(self, _: bool) -> Result<Loose, E> {
            Ok(Loose::Nothing)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Loose, E> {
            Ok(Loose::Number(v as f64))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Loose, E> {
            Ok(Loose::Number(v as f64))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Loose, E> {
            Ok(Loose::Number(v))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Loose, E> {
            Ok(Loose::Text(v.to_string()))
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<Loose, E> {
            Ok(Loose::Text(v))
        }

        fn visit_none<E: de::Error>(self) -> Result<Loose, E> {
            Ok(Loose::Nothing)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Loose, E> {
            Ok(Loose::Nothing)
        }

        fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Loose, D::Error> {
            deserializer.deserialize_any(self)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Loose, A::Error> {
            while seq.next_element::<IgnoredAny>()?.is_some() {}
            Ok(Loose::Nothing)
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Loose, A::Error> {
            while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
            Ok(Loose::Nothing)
        }
    }

    impl<'de> Deserialize<'de> for Loose {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_any(LooseVisitor)
        }
    }

    /// A concentration; `null` and non-numeric values become `NaN`.
    pub(super) fn f64_or_nan<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Loose::deserialize(deserializer)?
            .number()
            .unwrap_or(f64::NAN))
    }

    /// An optional channel; non-numeric values become `None`.
    pub(super) fn option_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Loose::deserialize(deserializer)?.number())
    }

    /// A timestamp in any form [`parse_timestamp`](super::parse_timestamp)
    /// accepts; anything else becomes `None`.
    pub(super) fn option_timestamp<'de, D>(
        deserializer: D,
    ) -> Result<Option<OffsetDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Loose::deserialize(deserializer)? {
            Loose::Text(s) => super::parse_timestamp(&s).ok(),
            _ => None,
        })
    }
}

impl Reading {
    /// Create a reading with only the particulate channels set.
    pub fn new(
        id: impl Into<String>,
        device_id: impl Into<String>,
        timestamp: OffsetDateTime,
        pm25: f64,
    ) -> Self {
        Self {
            id: id.into(),
            device_id: device_id.into(),
            timestamp,
            pm1: f64::NAN,
            pm25,
            pm10: f64::NAN,
            nh3: None,
            no2: None,
            so2: None,
            voc: None,
            temperature: None,
            humidity: None,
        }
    }

    /// PM2.5 if it holds a usable value.
    #[must_use]
    pub fn pm25_value(&self) -> Option<f64> {
        self.pm25.is_finite().then_some(self.pm25)
    }

    /// Create a builder for constructing a reading field by field.
    pub fn builder(
        id: impl Into<String>,
        device_id: impl Into<String>,
        timestamp: OffsetDateTime,
    ) -> ReadingBuilder {
        ReadingBuilder {
            reading: Reading::new(id, device_id, timestamp, f64::NAN),
        }
    }
}

/// Builder for [`Reading`].
#[derive(Debug, Clone)]
#[must_use]
pub struct ReadingBuilder {
    reading: Reading,
}

impl ReadingBuilder {
    pub fn pm1(mut self, value: f64) -> Self {
        self.reading.pm1 = value;
        self
    }

    pub fn pm25(mut self, value: f64) -> Self {
        self.reading.pm25 = value;
        self
    }

    pub fn pm10(mut self, value: f64) -> Self {
        self.reading.pm10 = value;
        self
    }

    pub fn nh3(mut self, value: f64) -> Self {
        self.reading.nh3 = Some(value);
        self
    }

    pub fn no2(mut self, value: f64) -> Self {
        self.reading.no2 = Some(value);
        self
    }

    pub fn so2(mut self, value: f64) -> Self {
        self.reading.so2 = Some(value);
        self
    }

    pub fn voc(mut self, value: f64) -> Self {
        self.reading.voc = Some(value);
        self
    }

    pub fn temperature(mut self, value: f64) -> Self {
        self.reading.temperature = Some(value);
        self
    }

    pub fn humidity(mut self, value: f64) -> Self {
        self.reading.humidity = Some(value);
        self
    }

    #[must_use]
    pub fn build(self) -> Reading {
        self.reading
    }
}

/// A sensor device as known to the data provider.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Device {
    /// Stable device identifier (e.g. `AQM-001`).
    pub device_id: String,
    /// Friendly name.
    pub name: String,
    /// Free-form location text.
    #[cfg_attr(feature = "serde", serde(default))]
    pub location: String,
    /// When the device last reported. `None` if it never has, or if the
    /// reported value is not a readable timestamp.
    #[cfg_attr(
        feature = "serde",
        serde(
            default,
            serialize_with = "time::serde::rfc3339::option::serialize",
            deserialize_with = "lenient::option_timestamp"
        )
    )]
    pub last_seen_at: Option<OffsetDateTime>,
    /// Status flag as reported by the device.
    #[cfg_attr(feature = "serde", serde(default, alias = "status"))]
    pub raw_status: DeviceStatus,
    /// Battery level percentage, if reported.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub battery: Option<u8>,
}

impl Device {
    pub fn new(device_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            name: name.into(),
            location: String::new(),
            last_seen_at: None,
            raw_status: DeviceStatus::Unknown,
            battery: None,
        }
    }

    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    #[must_use]
    pub fn with_last_seen(mut self, at: OffsetDateTime) -> Self {
        self.last_seen_at = Some(at);
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: DeviceStatus) -> Self {
        self.raw_status = status;
        self
    }

    #[must_use]
    pub fn with_battery(mut self, percent: u8) -> Self {
        self.battery = Some(percent);
        self
    }
}

/// Parse a timestamp in RFC 3339 or `YYYY-MM-DD` form (start of day, UTC).
///
/// ```
/// use airwatch_types::parse_timestamp;
///
/// assert!(parse_timestamp("2024-01-15T10:30:00Z").is_ok());
/// assert!(parse_timestamp("2024-01-15").is_ok());
/// assert!(parse_timestamp("yesterday").is_err());
/// ```
pub fn parse_timestamp(s: &str) -> Result<OffsetDateTime, ParseError> {
    use time::format_description::well_known::Rfc3339;
    use time::macros::format_description;

    if let Ok(dt) = OffsetDateTime::parse(s, &Rfc3339) {
        return Ok(dt);
    }

    let format = format_description!("[year]-[month]-[day]");
    if let Ok(date) = time::Date::parse(s, &format) {
        return Ok(date.midnight().assume_utc());
    }

    Err(ParseError::InvalidTimestamp(s.to_string()))
}
