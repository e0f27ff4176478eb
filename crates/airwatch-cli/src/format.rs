//! Output formatting utilities for text, JSON, and CSV output.

use anyhow::{Context, Result};
use serde::Serialize;
use tabled::builder::Builder;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

use airwatch_core::aggregate::NOT_AVAILABLE;
use airwatch_core::{ChartPoint, DeviceSnapshot, FleetOverview, PeakTime, Summary, Window};

use crate::cli::StyleMode;
use crate::style;

/// Formatting options for output.
#[derive(Debug, Clone, Copy)]
pub struct FormatOptions {
    /// Disable colored output.
    pub no_color: bool,
    /// Omit header row in CSV output.
    pub no_header: bool,
    /// Use compact JSON output (no pretty-printing).
    pub compact: bool,
    /// Visual styling mode.
    pub style: StyleMode,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            no_color: false,
            no_header: false,
            compact: false,
            style: StyleMode::Rich,
        }
    }
}

impl FormatOptions {
    pub fn new(no_color: bool, style: StyleMode) -> Self {
        // Plain mode automatically disables colors for pipe-friendliness
        let effective_no_color = no_color || style == StyleMode::Plain;
        Self {
            no_color: effective_no_color,
            no_header: false,
            compact: false,
            style,
        }
    }

    /// Check if rich styling is enabled.
    pub fn is_rich(&self) -> bool {
        self.style == StyleMode::Rich
    }

    /// Check if plain styling is enabled (no decorations).
    pub fn is_plain(&self) -> bool {
        self.style == StyleMode::Plain
    }

    /// Create with no_header option for CSV output.
    pub fn with_no_header(mut self, no_header: bool) -> Self {
        self.no_header = no_header;
        self
    }

    /// Create with compact JSON option.
    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    /// Serialize value to JSON string, respecting compact option.
    pub fn as_json<T: Serialize>(&self, value: &T) -> Result<String> {
        let json = if self.compact {
            serde_json::to_string(value)?
        } else {
            serde_json::to_string_pretty(value)?
        };
        Ok(json + "\n")
    }

    /// Unit suffix for particulate concentrations.
    /// Uses ASCII-only output for Plain mode (pipe-friendly).
    pub fn pm_unit(&self) -> &'static str {
        if self.is_plain() { "ug/m3" } else { "µg/m³" }
    }

    fn temp_unit(&self) -> &'static str {
        if self.is_plain() { "C" } else { "°C" }
    }
}

/// RFC3339 timestamp, or an empty string if it cannot be formatted.
pub fn format_timestamp(ts: OffsetDateTime) -> String {
    ts.format(&Rfc3339).unwrap_or_default()
}

/// Compact `YYYY-MM-DD HH:MM` timestamp for tables.
pub fn format_timestamp_short(ts: OffsetDateTime) -> String {
    ts.format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .unwrap_or_else(|_| "Unknown".to_string())
}

fn format_peak(peak: PeakTime) -> String {
    match peak {
        PeakTime::At(ts) => format_timestamp_short(ts),
        PeakTime::NotAvailable => NOT_AVAILABLE.to_string(),
    }
}

fn format_optional(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.*}", precision, v))
}

/// Write serializable rows as CSV, with a header unless `no_header`.
fn write_csv<T: Serialize>(rows: impl IntoIterator<Item = T>, opts: &FormatOptions) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(!opts.no_header)
        .from_writer(Vec::new());
    for row in rows {
        writer.serialize(row).context("Failed to write CSV row")?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV output: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

// ============================================================================
// Device list
// ============================================================================

#[must_use]
pub fn format_devices_text(
    snapshots: &[DeviceSnapshot],
    overview: &FleetOverview,
    opts: &FormatOptions,
) -> String {
    if snapshots.is_empty() {
        return "No devices found.\n".to_string();
    }

    let mut output = String::new();
    if !opts.is_plain() {
        output.push_str(&style::format_title("Devices", opts.no_color));
        output.push('\n');
    }
    output.push_str(&format!("{}\n\n", overview));

    let mut builder = Builder::default();
    builder.push_record(["Device", "ID", "Location", "AQI", "Status", "Last update", "Battery"]);
    for snapshot in snapshots {
        let device = &snapshot.device;
        builder.push_record([
            device.name.clone(),
            device.device_id.clone(),
            device.location.clone(),
            style::format_badge(&snapshot.badge(), opts.no_color),
            style::format_status_badge(
                snapshot.is_online,
                snapshot.is_stale,
                opts.style,
                opts.no_color,
            ),
            snapshot.recency_label.clone(),
            device
                .battery
                .map_or_else(|| "-".to_string(), |b| style::format_battery_colored(b, opts.no_color)),
        ]);
    }

    let mut table = builder.build();
    style::apply_table_style(&mut table, opts.style);
    output.push_str(&table.to_string());
    output.push('\n');

    if overview.alerts > 0 {
        output.push('\n');
        output.push_str(&style::format_warning(
            &format!("{} of {} devices report poor air quality", overview.alerts, overview.total),
            opts.no_color,
        ));
        output.push('\n');
    }
    output
}

pub fn format_devices_json(
    snapshots: &[DeviceSnapshot],
    overview: &FleetOverview,
    opts: &FormatOptions,
) -> Result<String> {
    #[derive(Serialize)]
    struct DevicesJson<'a> {
        overview: &'a FleetOverview,
        devices: &'a [DeviceSnapshot],
    }

    opts.as_json(&DevicesJson {
        overview,
        devices: snapshots,
    })
}

#[derive(Serialize)]
struct DeviceRow<'a> {
    device_id: &'a str,
    name: &'a str,
    location: &'a str,
    aqi: u32,
    level: &'a str,
    color: &'a str,
    pm25: f64,
    status: String,
    is_online: bool,
    is_stale: bool,
    last_seen_at: String,
    recency: &'a str,
    battery: Option<u8>,
    alert: bool,
}

pub fn format_devices_csv(snapshots: &[DeviceSnapshot], opts: &FormatOptions) -> Result<String> {
    write_csv(
        snapshots.iter().map(|s| {
            let badge = s.badge();
            DeviceRow {
                device_id: &s.device.device_id,
                name: &s.device.name,
                location: &s.device.location,
                aqi: badge.value,
                level: badge.label,
                color: badge.color,
                pm25: s.current.pm25,
                status: s.raw_status.to_string(),
                is_online: s.is_online,
                is_stale: s.is_stale,
                last_seen_at: s.device.last_seen_at.map(format_timestamp).unwrap_or_default(),
                recency: &s.recency_label,
                battery: s.device.battery,
                alert: s.alert,
            }
        }),
        opts,
    )
}

// ============================================================================
// Dashboard
// ============================================================================

fn summary_title(window: &Window) -> String {
    match window {
        Window::Trailing(_) => format!("Summary ({})", window),
        Window::Between { .. } => format!("Summary {}", window),
    }
}

#[must_use]
pub fn format_dashboard_text(snapshot: &DeviceSnapshot, window: &Window, opts: &FormatOptions) -> String {
    let device = &snapshot.device;
    let current = &snapshot.current;
    let mut output = String::new();

    output.push_str(&style::format_title(
        &format!("{} ({})", device.name, device.device_id),
        opts.no_color,
    ));
    output.push('\n');

    let mut meta = Vec::new();
    if !device.location.is_empty() {
        meta.push(device.location.clone());
    }
    meta.push(style::format_status_badge(
        snapshot.is_online,
        snapshot.is_stale,
        opts.style,
        opts.no_color,
    ));
    meta.push(format!("Last update: {}", snapshot.recency_label));
    if let Some(battery) = device.battery {
        meta.push(format!(
            "Battery: {}",
            style::format_battery_colored(battery, opts.no_color)
        ));
    }
    output.push_str(&meta.join("  "));
    output.push_str("\n\n");

    if !current.has_reading() {
        output.push_str(&style::format_info("No readings recorded yet", opts.no_color));
        output.push_str("\n\n");
    }

    // AQI card
    output.push_str(&format!(
        "AQI  {}\n",
        style::format_aqi_colored(&snapshot.aqi, opts.no_color)
    ));
    if opts.is_rich() || opts.is_plain() {
        output.push_str(&format!(
            "     {}\n",
            style::format_aqi_gauge(&snapshot.aqi, opts.style, opts.no_color)
        ));
    }
    output.push_str(&format!("     {}\n", snapshot.aqi.level.advice()));

    if snapshot.alert {
        output.push('\n');
        output.push_str(&style::format_warning(
            &format!(
                "Air quality alert: PM2.5 at {:.1} {} (AQI {})",
                current.pm25,
                opts.pm_unit(),
                snapshot.aqi.value
            ),
            opts.no_color,
        ));
        output.push('\n');
    }
    output.push('\n');

    // Live readings
    let pm = opts.pm_unit();
    let mut builder = Builder::default();
    builder.push_record(["Sensor", "Value", "Unit"]);
    builder.push_record(["PM1".to_string(), format!("{:.1}", current.pm1), pm.to_string()]);
    builder.push_record(["PM2.5".to_string(), format!("{:.1}", current.pm25), pm.to_string()]);
    builder.push_record(["PM10".to_string(), format!("{:.1}", current.pm10), pm.to_string()]);
    builder.push_record(["NH3".to_string(), format!("{:.2}", current.nh3), "ppm".to_string()]);
    builder.push_record(["NO2".to_string(), format!("{:.2}", current.no2), "ppm".to_string()]);
    builder.push_record(["SO2".to_string(), format!("{:.2}", current.so2), "ppm".to_string()]);
    builder.push_record(["VOC".to_string(), format!("{:.0}", current.voc), "ppb".to_string()]);
    builder.push_record([
        "Temperature".to_string(),
        format!("{:.1}", current.temperature),
        opts.temp_unit().to_string(),
    ]);
    builder.push_record([
        "Humidity".to_string(),
        style::format_humidity_colored(current.humidity, opts.no_color),
        "RH".to_string(),
    ]);
    let mut table = builder.build();
    style::apply_table_style(&mut table, opts.style);
    output.push_str(&table.to_string());
    output.push_str("\n\n");

    // Window summary
    output.push_str(&format_summary_text(&snapshot.summary, window, opts));
    output
}

fn format_summary_text(summary: &Summary, window: &Window, opts: &FormatOptions) -> String {
    let pm = opts.pm_unit();
    let mut output = format!("{}\n", summary_title(window));

    let mut builder = Builder::default();
    builder.push_record(["Max PM2.5", "Avg PM2.5", "Peak time", "Readings"]);
    builder.push_record([
        format!("{:.1} {}", summary.max, pm),
        format!("{:.1} {}", summary.avg, pm),
        format_peak(summary.peak_time),
        summary.count.to_string(),
    ]);
    let mut table = builder.build();
    style::apply_table_style(&mut table, opts.style);
    output.push_str(&table.to_string());
    output.push('\n');
    output
}

pub fn format_dashboard_json(
    snapshot: &DeviceSnapshot,
    window: &Window,
    opts: &FormatOptions,
) -> Result<String> {
    #[derive(Serialize)]
    struct DashboardJson<'a> {
        window: String,
        #[serde(flatten)]
        snapshot: &'a DeviceSnapshot,
    }

    opts.as_json(&DashboardJson {
        window: window.to_string(),
        snapshot,
    })
}

#[derive(Serialize)]
struct DashboardRow<'a> {
    device_id: &'a str,
    name: &'a str,
    timestamp: String,
    aqi: u32,
    level: &'a str,
    alert: bool,
    pm1: f64,
    pm25: f64,
    pm10: f64,
    nh3: f64,
    no2: f64,
    so2: f64,
    voc: f64,
    temperature: f64,
    humidity: f64,
    window: String,
    max_pm25: f64,
    avg_pm25: f64,
    peak_time: String,
    readings: usize,
}

pub fn format_dashboard_csv(
    snapshot: &DeviceSnapshot,
    window: &Window,
    opts: &FormatOptions,
) -> Result<String> {
    let current = &snapshot.current;
    let summary = &snapshot.summary;
    write_csv(
        [DashboardRow {
            device_id: &snapshot.device.device_id,
            name: &snapshot.device.name,
            timestamp: current.timestamp.map(format_timestamp).unwrap_or_default(),
            aqi: snapshot.aqi.value,
            level: snapshot.aqi.label,
            alert: snapshot.alert,
            pm1: current.pm1,
            pm25: current.pm25,
            pm10: current.pm10,
            nh3: current.nh3,
            no2: current.no2,
            so2: current.so2,
            voc: current.voc,
            temperature: current.temperature,
            humidity: current.humidity,
            window: window.to_string(),
            max_pm25: summary.max,
            avg_pm25: summary.avg,
            peak_time: summary.peak_time.to_string(),
            readings: summary.count,
        }],
        opts,
    )
}

// ============================================================================
// History
// ============================================================================

#[must_use]
pub fn format_history_text(points: &[ChartPoint], window: &Window, opts: &FormatOptions) -> String {
    if points.is_empty() {
        return format!("No readings in {}.\n", window);
    }

    // Narrow terminals get fewer rows to avoid wrapping issues
    let term_width = style::terminal_width();
    let max_records = if term_width < 80 { 12 } else { 48 };

    let mut output = format!("History, {} ({} readings):\n\n", window, points.len());

    let pm = opts.pm_unit();
    let mut builder = Builder::default();
    builder.push_record([
        "Timestamp".to_string(),
        format!("PM1 ({})", pm),
        format!("PM2.5 ({})", pm),
        format!("PM10 ({})", pm),
        "NH3 (ppm)".to_string(),
        "NO2 (ppm)".to_string(),
        "SO2 (ppm)".to_string(),
        "VOC (ppb)".to_string(),
        format!("Temp ({})", opts.temp_unit()),
        "Humidity".to_string(),
        "AQI".to_string(),
    ]);

    // Newest last, so the tail is what gets shown
    let skip = points.len().saturating_sub(max_records);
    for point in &points[skip..] {
        builder.push_record([
            format_timestamp_short(point.timestamp),
            format_optional(point.pm1, 1),
            format_optional(point.pm25, 1),
            format_optional(point.pm10, 1),
            format_optional(point.nh3, 2),
            format_optional(point.no2, 2),
            format_optional(point.so2, 2),
            format_optional(point.voc, 0),
            format_optional(point.temperature, 1),
            point
                .humidity
                .map_or_else(|| "-".to_string(), |h| style::format_humidity_colored(h, opts.no_color)),
            style::paint_level(&point.aqi.value.to_string(), point.aqi.level, opts.no_color),
        ]);
    }

    let mut table = builder.build();
    style::apply_table_style(&mut table, opts.style);
    output.push_str(&table.to_string());
    output.push('\n');

    if skip > 0 {
        output.push_str(&format!("... and {} earlier readings\n", skip));
        output.push_str("(Use --format csv or --format json for full data)\n");
    }

    output
}

pub fn format_history_json(points: &[ChartPoint], opts: &FormatOptions) -> Result<String> {
    opts.as_json(&points)
}

#[derive(Serialize)]
struct HistoryRow<'a> {
    timestamp: String,
    pm1: Option<f64>,
    pm25: Option<f64>,
    pm10: Option<f64>,
    nh3: Option<f64>,
    no2: Option<f64>,
    so2: Option<f64>,
    voc: Option<f64>,
    temperature: Option<f64>,
    humidity: Option<f64>,
    aqi: u32,
    level: &'a str,
}

pub fn format_history_csv(points: &[ChartPoint], opts: &FormatOptions) -> Result<String> {
    write_csv(
        points.iter().map(|p| HistoryRow {
            timestamp: format_timestamp(p.timestamp),
            pm1: p.pm1,
            pm25: p.pm25,
            pm10: p.pm10,
            nh3: p.nh3,
            no2: p.no2,
            so2: p.so2,
            voc: p.voc,
            temperature: p.temperature,
            humidity: p.humidity,
            aqi: p.aqi.value,
            level: p.aqi.label,
        }),
        opts,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use airwatch_core::{FixedClock, MockSource, ReadingSource, SnapshotBuilder};
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2024-01-15 12:00 UTC);

    fn plain() -> FormatOptions {
        FormatOptions::new(true, StyleMode::Plain)
    }

    fn fleet() -> (Vec<DeviceSnapshot>, FleetOverview) {
        let source = MockSource::new(NOW);
        let builder = SnapshotBuilder::new(FixedClock::new(NOW));
        let snapshots: Vec<_> = source
            .devices()
            .unwrap()
            .iter()
            .map(|d| {
                let latest = source.latest_reading(&d.device_id).unwrap();
                let history = source.readings(&d.device_id, Window::default(), NOW).unwrap();
                builder.build(d, latest.as_ref(), &history)
            })
            .collect();
        let overview = FleetOverview::from_snapshots(&snapshots);
        (snapshots, overview)
    }

    fn history(device_id: &str) -> Vec<ChartPoint> {
        let source = MockSource::new(NOW);
        let builder = SnapshotBuilder::new(FixedClock::new(NOW));
        builder.series(&source.readings(device_id, Window::default(), NOW).unwrap())
    }

    #[test]
    fn test_plain_mode_disables_color() {
        let opts = FormatOptions::new(false, StyleMode::Plain);
        assert!(opts.no_color);
        assert_eq!(opts.pm_unit(), "ug/m3");
        assert!(!FormatOptions::new(false, StyleMode::Rich).no_color);
    }

    #[test]
    fn test_as_json_compact() {
        let opts = FormatOptions::default().with_compact(true);
        assert_eq!(opts.as_json(&[1, 2]).unwrap(), "[1,2]\n");
    }

    #[test]
    fn test_devices_text() {
        let (snapshots, overview) = fleet();
        let text = format_devices_text(&snapshots, &overview, &plain());
        assert!(text.starts_with("3 of 4 devices online\n"));
        assert!(text.contains("Living Room Monitor"));
        assert!(text.contains("[Offline]"));
        assert!(text.contains("45 min ago"));
        assert!(text.contains("2 of 4 devices report poor air quality"));
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn test_devices_text_empty() {
        let text = format_devices_text(&[], &FleetOverview::default(), &plain());
        assert_eq!(text, "No devices found.\n");
    }

    #[test]
    fn test_devices_json() {
        let (snapshots, overview) = fleet();
        let json = format_devices_json(&snapshots, &overview, &plain()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["overview"]["online"], 3);
        assert_eq!(value["devices"].as_array().unwrap().len(), 4);
        assert_eq!(value["devices"][1]["aqi"]["label"], "Unhealthy");
    }

    #[test]
    fn test_devices_csv() {
        let (snapshots, _) = fleet();
        let csv = format_devices_csv(&snapshots, &plain()).unwrap();
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("device_id,name,location,aqi,level"));
        assert!(lines.next().unwrap().starts_with("AQM-001,Living Room Monitor,"));
        assert_eq!(csv.lines().count(), 5);

        let no_header = format_devices_csv(&snapshots, &plain().with_no_header(true)).unwrap();
        assert_eq!(no_header.lines().count(), 4);
    }

    #[test]
    fn test_dashboard_text_with_alert() {
        let (snapshots, _) = fleet();
        let text = format_dashboard_text(&snapshots[3], &Window::default(), &plain());
        assert!(text.starts_with("Industrial Zone (AQM-004)\n"));
        assert!(text.contains("AQI  200 Unhealthy"));
        assert!(text.contains("Air quality alert: PM2.5 at 150.0 ug/m3 (AQI 200)"));
        assert!(text.contains("Summary (last 24 h)"));
        assert!(text.contains("48"));
    }

    #[test]
    fn test_dashboard_text_without_alert() {
        let (snapshots, _) = fleet();
        let text = format_dashboard_text(&snapshots[2], &Window::default(), &plain());
        assert!(!text.contains("Air quality alert"));
        assert!(text.contains("[Offline]"));
    }

    #[test]
    fn test_dashboard_json_flattens_snapshot() {
        let (snapshots, _) = fleet();
        let json = format_dashboard_json(&snapshots[0], &Window::default(), &plain()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["window"], "last 24 h");
        assert_eq!(value["device"]["device_id"], "AQM-001");
        assert_eq!(value["summary"]["count"], 48);
    }

    #[test]
    fn test_dashboard_csv_single_row() {
        let (snapshots, _) = fleet();
        let csv = format_dashboard_csv(&snapshots[0], &Window::default(), &plain()).unwrap();
        assert_eq!(csv.lines().count(), 2);
        assert!(csv.lines().nth(1).unwrap().starts_with("AQM-001,"));
    }

    #[test]
    fn test_history_csv_has_every_point() {
        let points = history("AQM-002");
        let csv = format_history_csv(&points, &plain()).unwrap();
        assert_eq!(
            csv.lines().next().unwrap(),
            "timestamp,pm1,pm25,pm10,nh3,no2,so2,voc,temperature,humidity,aqi,level"
        );
        assert_eq!(csv.lines().count(), points.len() + 1);
    }

    #[test]
    fn test_history_carries_gas_channels() {
        let points = history("AQM-004");
        let gases = points.iter().filter(|p| p.nh3.is_some() || p.voc.is_some()).count();
        assert!(gases > 0, "demo history reports gas sensors");

        let json = format_history_json(&points, &plain()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        for key in ["nh3", "no2", "so2", "voc"] {
            assert!(value[0].get(key).is_some(), "{}", key);
        }

        let text = format_history_text(&points, &Window::default(), &plain());
        assert!(text.contains("NH3 (ppm)"));
        assert!(text.contains("VOC (ppb)"));
    }

    #[test]
    fn test_history_text_empty_window() {
        let text = format_history_text(&[], &Window::last_hours(6), &plain());
        assert_eq!(text, "No readings in last 6 h.\n");
    }

    #[test]
    fn test_history_json_is_array() {
        let points = history("AQM-001");
        let json = format_history_json(&points, &plain()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().unwrap().len(), points.len());
        assert!(value[0]["aqi"]["value"].is_u64());
    }

    #[test]
    fn test_peak_not_available() {
        assert_eq!(format_peak(PeakTime::NotAvailable), "N/A");
        assert_eq!(format_peak(PeakTime::At(NOW)), "2024-01-15 12:00");
    }
}
