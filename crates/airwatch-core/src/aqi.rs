//! PM2.5 to Air Quality Index classification.
//!
//! The index is computed by piecewise-linear interpolation over a static
//! breakpoint table. Each band is lower-bound inclusive and ends where the
//! next band begins; the last band is unbounded above.
//!
//! # Example
//!
//! ```
//! use airwatch_core::aqi::{classify, AqiScale};
//! use airwatch_core::AqiLevel;
//!
//! let aqi = classify(35.0);
//! assert_eq!(aqi.level, AqiLevel::Moderate);
//! assert_eq!(aqi.value, 99);
//!
//! // The 2024 table is stricter at the low end
//! assert_eq!(classify(10.0).level, AqiLevel::Good);
//! assert_eq!(AqiScale::epa_2024().classify(10.0).level, AqiLevel::Moderate);
//! ```

use serde::Serialize;

use airwatch_types::AqiLevel;

/// Upper limit for reported index values above the Hazardous band.
pub const AQI_CEILING: u32 = 999;

/// PM2.5 above this concentration raises the dashboard alert banner.
pub const ALERT_PM25: f64 = 35.0;

/// Index values above this raise the dashboard alert banner.
pub const ALERT_INDEX: u32 = 100;

/// Full scale used for gauge rendering.
pub const GAUGE_MAX: u32 = 500;

/// One row of a breakpoint table.
///
/// `conc_low..=conc_high` is the interpolation range that maps onto
/// `index_low..=index_high`. Band membership is decided by `conc_low` alone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    pub conc_low: f64,
    pub conc_high: f64,
    pub index_low: u32,
    pub index_high: u32,
    pub level: AqiLevel,
}

const fn bp(conc_low: f64, conc_high: f64, index_low: u32, index_high: u32, level: AqiLevel) -> Breakpoint {
    Breakpoint {
        conc_low,
        conc_high,
        index_low,
        index_high,
        level,
    }
}

/// US EPA PM2.5 breakpoints (2012 revision).
pub const EPA_2012_PM25: [Breakpoint; 6] = [
    bp(0.0, 12.0, 0, 50, AqiLevel::Good),
    bp(12.1, 35.4, 51, 100, AqiLevel::Moderate),
    bp(35.5, 55.4, 101, 150, AqiLevel::UnhealthyForSensitiveGroups),
    bp(55.5, 150.4, 151, 200, AqiLevel::Unhealthy),
    bp(150.5, 250.4, 201, 300, AqiLevel::VeryUnhealthy),
    bp(250.5, 500.4, 301, 500, AqiLevel::Hazardous),
];

/// US EPA PM2.5 breakpoints (2024 revision).
pub const EPA_2024_PM25: [Breakpoint; 6] = [
    bp(0.0, 9.0, 0, 50, AqiLevel::Good),
    bp(9.1, 35.4, 51, 100, AqiLevel::Moderate),
    bp(35.5, 55.4, 101, 150, AqiLevel::UnhealthyForSensitiveGroups),
    bp(55.5, 125.4, 151, 200, AqiLevel::Unhealthy),
    bp(125.5, 225.4, 201, 300, AqiLevel::VeryUnhealthy),
    bp(225.5, 325.4, 301, 500, AqiLevel::Hazardous),
];

/// Computed index for one concentration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AqiResult {
    /// Index value (0 and up, capped at [`AQI_CEILING`]).
    pub value: u32,
    /// Severity category.
    pub level: AqiLevel,
    /// Label of `level`.
    pub label: &'static str,
    /// Color token of `level`.
    pub color: &'static str,
}

impl AqiResult {
    fn new(value: u32, level: AqiLevel) -> Self {
        Self {
            value,
            level,
            label: level.label(),
            color: level.color(),
        }
    }

    /// Fill fraction for a 0-500 gauge, as a percentage clamped to 100.
    #[must_use]
    pub fn gauge_percent(&self) -> f64 {
        (f64::from(self.value) * 100.0 / f64::from(GAUGE_MAX)).min(100.0)
    }
}

/// Badge shown for a device, which may have no reading at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AqiBadge {
    pub value: u32,
    pub level: Option<AqiLevel>,
    pub label: &'static str,
    pub color: &'static str,
}

impl AqiBadge {
    pub const UNKNOWN_LABEL: &'static str = "Unknown";
    pub const UNKNOWN_COLOR: &'static str = "#94a3b8";

    /// Placeholder for devices without any reading.
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            value: 0,
            level: None,
            label: Self::UNKNOWN_LABEL,
            color: Self::UNKNOWN_COLOR,
        }
    }
}

impl From<AqiResult> for AqiBadge {
    fn from(aqi: AqiResult) -> Self {
        Self {
            value: aqi.value,
            level: Some(aqi.level),
            label: aqi.label,
            color: aqi.color,
        }
    }
}

/// A breakpoint table with its classification function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AqiScale {
    breakpoints: &'static [Breakpoint],
}

impl Default for AqiScale {
    fn default() -> Self {
        Self::epa_2012()
    }
}

impl AqiScale {
    /// The 2012 EPA table (12.0 µg/m³ Good/Moderate boundary).
    pub fn epa_2012() -> Self {
        Self {
            breakpoints: &EPA_2012_PM25,
        }
    }

    /// The 2024 EPA table (9.0 µg/m³ Good/Moderate boundary).
    pub fn epa_2024() -> Self {
        Self {
            breakpoints: &EPA_2024_PM25,
        }
    }

    /// The breakpoint rows, ordered by concentration.
    pub fn breakpoints(&self) -> &'static [Breakpoint] {
        self.breakpoints
    }

    /// Classify a PM2.5 concentration in µg/m³.
    ///
    /// Negative and `NaN` input is treated as `0`. This never fails.
    #[must_use]
    pub fn classify(&self, pm25: f64) -> AqiResult {
        let pm25 = normalize(pm25);

        // First row has conc_low == 0, so the partition point is at least 1.
        let idx = self
            .breakpoints
            .partition_point(|bp| bp.conc_low <= pm25)
            .saturating_sub(1);
        let band = &self.breakpoints[idx];

        let slope = f64::from(band.index_high - band.index_low) / (band.conc_high - band.conc_low);
        let raw = slope * (pm25 - band.conc_low) + f64::from(band.index_low);
        let value = raw.round().clamp(0.0, f64::from(AQI_CEILING)) as u32;

        AqiResult::new(value, band.level)
    }

    /// Classify an optional concentration; `None` is treated as `0`.
    #[must_use]
    pub fn classify_opt(&self, pm25: Option<f64>) -> AqiResult {
        self.classify(pm25.unwrap_or(0.0))
    }
}

fn normalize(pm25: f64) -> f64 {
    if pm25.is_nan() || pm25 < 0.0 {
        0.0
    } else {
        pm25
    }
}

/// Classify with the default (2012 EPA) scale.
#[must_use]
pub fn classify(pm25: f64) -> AqiResult {
    AqiScale::default().classify(pm25)
}

/// Classify an optional concentration with the default scale.
#[must_use]
pub fn classify_opt(pm25: Option<f64>) -> AqiResult {
    AqiScale::default().classify_opt(pm25)
}

/// Whether the current reading warrants an air quality alert.
#[must_use]
pub fn should_alert(pm25: f64, aqi: &AqiResult) -> bool {
    pm25 > ALERT_PM25 || aqi.value > ALERT_INDEX
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_good() {
        let aqi = classify(0.0);
        assert_eq!(aqi.value, 0);
        assert_eq!(aqi.level, AqiLevel::Good);
        assert_eq!(aqi.label, "Good");
        assert_eq!(aqi.color, "#00e400");
    }

    #[test]
    fn test_known_values() {
        // Cross-checked against the AirNow concentration calculator (2012 table)
        assert_eq!(classify(6.0).value, 25);
        assert_eq!(classify(12.0).value, 50);
        assert_eq!(classify(12.1).value, 51);
        assert_eq!(classify(35.4).value, 100);
        assert_eq!(classify(35.5).value, 101);
        assert_eq!(classify(55.4).value, 150);
        assert_eq!(classify(55.5).value, 151);
        assert_eq!(classify(150.4).value, 200);
        assert_eq!(classify(150.5).value, 201);
        assert_eq!(classify(250.4).value, 300);
        assert_eq!(classify(250.5).value, 301);
        assert_eq!(classify(500.4).value, 500);
    }

    #[test]
    fn test_moderate_vs_unhealthy() {
        let moderate = classify(35.0);
        let unhealthy = classify(150.0);

        assert_eq!(moderate.level, AqiLevel::Moderate);
        assert_eq!(moderate.value, 99);
        assert_eq!(unhealthy.level, AqiLevel::Unhealthy);
        assert_eq!(unhealthy.value, 200);
        assert!(unhealthy.value > moderate.value);
        assert_ne!(unhealthy.color, moderate.color);
    }

    #[test]
    fn test_boundary_belongs_to_upper_band() {
        assert_eq!(classify(12.1).level, AqiLevel::Moderate);
        assert_eq!(classify(35.5).level, AqiLevel::UnhealthyForSensitiveGroups);
        assert_eq!(classify(55.5).level, AqiLevel::Unhealthy);
        assert_eq!(classify(150.5).level, AqiLevel::VeryUnhealthy);
        assert_eq!(classify(250.5).level, AqiLevel::Hazardous);
    }

    #[test]
    fn test_gap_between_published_ranges() {
        // 12.05 is between the published 12.0 and 12.1 rows; it stays Good.
        let aqi = classify(12.05);
        assert_eq!(aqi.level, AqiLevel::Good);
        assert_eq!(aqi.value, 50);

        let aqi = classify(35.45);
        assert_eq!(aqi.level, AqiLevel::Moderate);
        assert_eq!(aqi.value, 100);
    }

    #[test]
    fn test_boundary_continuity() {
        let below = classify(12.0);
        let above = classify(12.1);
        assert_eq!(above.value - below.value, 1);
    }

    #[test]
    fn test_negative_and_nan_clamp_to_zero() {
        assert_eq!(classify(-5.0), classify(0.0));
        assert_eq!(classify(f64::NAN), classify(0.0));
        assert_eq!(classify(f64::NEG_INFINITY), classify(0.0));
    }

    #[test]
    fn test_above_table_stays_hazardous() {
        let aqi = classify(1000.0);
        assert_eq!(aqi.level, AqiLevel::Hazardous);
        assert_eq!(aqi.value, 898);

        let aqi = classify(5000.0);
        assert_eq!(aqi.level, AqiLevel::Hazardous);
        assert_eq!(aqi.value, AQI_CEILING);

        let aqi = classify(f64::INFINITY);
        assert_eq!(aqi.level, AqiLevel::Hazardous);
        assert_eq!(aqi.value, AQI_CEILING);
    }

    #[test]
    fn test_classify_opt() {
        assert_eq!(classify_opt(None), classify(0.0));
        assert_eq!(classify_opt(Some(85.0)), classify(85.0));
    }

    #[test]
    fn test_epa_2024_scale() {
        let scale = AqiScale::epa_2024();
        assert_eq!(scale.classify(9.0).value, 50);
        assert_eq!(scale.classify(9.1).value, 51);
        assert_eq!(scale.classify(9.1).level, AqiLevel::Moderate);
        assert_eq!(scale.classify(125.5).level, AqiLevel::VeryUnhealthy);
        assert_eq!(scale.classify(225.5).value, 301);
        assert_eq!(scale.classify(325.4).value, 500);
    }

    #[test]
    fn test_tables_are_contiguous() {
        for table in [&EPA_2012_PM25, &EPA_2024_PM25] {
            assert_eq!(table[0].conc_low, 0.0);
            assert_eq!(table[0].index_low, 0);
            for pair in table.windows(2) {
                assert!(pair[0].conc_low < pair[1].conc_low);
                assert!(pair[0].conc_high < pair[1].conc_low);
                assert_eq!(pair[0].index_high + 1, pair[1].index_low);
                assert!(pair[0].level < pair[1].level);
            }
        }
    }

    #[test]
    fn test_gauge_percent() {
        assert_eq!(classify(0.0).gauge_percent(), 0.0);
        assert_eq!(classify(150.0).gauge_percent(), 40.0);
        assert_eq!(classify(5000.0).gauge_percent(), 100.0);
    }

    #[test]
    fn test_should_alert() {
        let moderate = classify(35.0);
        assert!(!should_alert(35.0, &moderate));
        assert!(should_alert(35.1, &classify(35.1)));
        assert!(should_alert(85.0, &classify(85.0)));
        assert!(!should_alert(15.0, &classify(15.0)));
        assert!(!should_alert(f64::NAN, &classify(f64::NAN)));
    }

    #[test]
    fn test_badge() {
        let unknown = AqiBadge::unknown();
        assert_eq!(unknown.label, "Unknown");
        assert_eq!(unknown.color, "#94a3b8");
        assert!(unknown.level.is_none());

        let badge = AqiBadge::from(classify(85.0));
        assert_eq!(badge.level, Some(AqiLevel::Unhealthy));
        assert_eq!(badge.value, 166);
    }

    #[test]
    fn test_idempotent() {
        for pm in [0.0, 7.3, 12.05, 35.0, 99.9, 420.0] {
            assert_eq!(classify(pm), classify(pm));
        }
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&classify(35.0)).unwrap();
        assert_eq!(
            json,
            r##"{"value":99,"level":"Moderate","label":"Moderate","color":"#ffff00"}"##
        );
    }
}

/// Property-based tests for the classifier.
///
/// Run with: `cargo test -p airwatch-core aqi::proptests`
#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn classify_never_panics(pm in any::<f64>()) {
            let _ = classify(pm);
        }

        #[test]
        fn classify_is_monotonic(a in 0.0f64..2000.0, b in 0.0f64..2000.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let lo_aqi = classify(lo);
            let hi_aqi = classify(hi);
            prop_assert!(lo_aqi.value <= hi_aqi.value);
            prop_assert!(lo_aqi.level <= hi_aqi.level);
        }

        #[test]
        fn classify_value_within_level_range(pm in 0.0f64..500.4) {
            let aqi = classify(pm);
            let band = EPA_2012_PM25.iter().find(|bp| bp.level == aqi.level).unwrap();
            prop_assert!(aqi.value >= band.index_low);
            prop_assert!(aqi.value <= band.index_high);
        }

        #[test]
        fn negative_input_matches_zero(pm in f64::MIN..0.0) {
            prop_assert_eq!(classify(pm), classify(0.0));
        }
    }
}
