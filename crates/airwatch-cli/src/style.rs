//! Visual styling utilities for the CLI.
//!
//! This module provides consistent styling across all CLI output including:
//! - AQI colors taken from the level color tokens
//! - Status badges and the AQI gauge (Rich mode)
//! - Table formatting

use owo_colors::OwoColorize;

use airwatch_core::{AqiBadge, AqiLevel, AqiResult};

use crate::cli::StyleMode;

// ============================================================================
// Color Thresholds
// ============================================================================

/// Battery thresholds (percentage).
pub mod battery {
    pub const LOW: u8 = 20; // Red: < 20%
    pub const MEDIUM: u8 = 50; // Yellow: 20-50%
    // Green: >= 50%
}

/// Humidity thresholds (percentage) for comfort.
pub mod humidity {
    pub const LOW: f64 = 30.0; // Yellow: < 30% (too dry)
    pub const HIGH: f64 = 70.0; // Yellow: > 70% (too humid)
    // Green: 30-70%
}

/// Width of the AQI gauge in cells.
const GAUGE_CELLS: usize = 20;

// ============================================================================
// Colored Value Formatting
// ============================================================================

/// Paint `text` with the color token of an AQI level.
pub fn paint_level(text: &str, level: AqiLevel, no_color: bool) -> String {
    if no_color {
        return text.to_string();
    }
    let (r, g, b) = level.rgb();
    format!("{}", text.truecolor(r, g, b))
}

/// Format an AQI value with its label, e.g. `101 Unhealthy for Sensitive Groups`.
pub fn format_aqi_colored(aqi: &AqiResult, no_color: bool) -> String {
    let value = paint_level(&aqi.value.to_string(), aqi.level, no_color);
    if no_color {
        format!("{} {}", value, aqi.label)
    } else {
        format!("{} {}", value.bold(), aqi.label)
    }
}

/// Format a device badge; devices without readings show a dimmed "Unknown".
pub fn format_badge(badge: &AqiBadge, no_color: bool) -> String {
    match badge.level {
        Some(level) => paint_level(&format!("{} {}", badge.value, badge.label), level, no_color),
        None if no_color => badge.label.to_string(),
        None => format!("{}", badge.label.dimmed()),
    }
}

/// Format battery percentage with appropriate color.
pub fn format_battery_colored(percent: u8, no_color: bool) -> String {
    if no_color {
        return format!("{}%", percent);
    }

    if percent < battery::LOW {
        format!("{}%", percent.red())
    } else if percent < battery::MEDIUM {
        format!("{}%", percent.yellow())
    } else {
        format!("{}%", percent.green())
    }
}

/// Format humidity percentage with appropriate color.
pub fn format_humidity_colored(percent: f64, no_color: bool) -> String {
    let text = format!("{:.0}%", percent);
    if no_color {
        return text;
    }

    if !(humidity::LOW..=humidity::HIGH).contains(&percent) {
        format!("{}", text.yellow())
    } else {
        format!("{}", text.green())
    }
}

// ============================================================================
// Status Messages
// ============================================================================

/// Format a success message.
pub fn format_success(message: &str, no_color: bool) -> String {
    if no_color {
        format!("[OK] {}", message)
    } else {
        format!("{} {}", "[OK]".green(), message)
    }
}

/// Format an info message.
pub fn format_info(message: &str, no_color: bool) -> String {
    if no_color {
        format!("[--] {}", message)
    } else {
        format!("{} {}", "[--]".cyan(), message)
    }
}

/// Format a warning message.
pub fn format_warning(message: &str, no_color: bool) -> String {
    if no_color {
        format!("[!!] {}", message)
    } else {
        format!("{} {}", "[!!]".yellow(), message)
    }
}

// ============================================================================
// Section Headers
// ============================================================================

/// Format a title header.
pub fn format_title(title: &str, no_color: bool) -> String {
    let rule = "━".repeat(title.chars().count());
    if no_color {
        format!("{}\n{}", title, rule)
    } else {
        format!("{}\n{}", title.bold(), rule.dimmed())
    }
}

// ============================================================================
// Rich Mode Formatting
// ============================================================================

/// Get terminal width, defaulting to 80 if detection fails.
pub fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
}

/// Format the online/offline badge of a device.
///
/// A device that is online but has not reported recently is flagged as stale.
pub fn format_status_badge(
    is_online: bool,
    is_stale: bool,
    style: StyleMode,
    no_color: bool,
) -> String {
    let label = match (is_online, is_stale) {
        (true, false) => "Online",
        (true, true) => "Online (stale)",
        (false, _) => "Offline",
    };
    if style == StyleMode::Plain || no_color {
        return format!("[{}]", label);
    }

    match (is_online, is_stale) {
        (true, false) => format!("[{}]", label.green().bold()),
        (true, true) => format!("[{}]", label.yellow().bold()),
        (false, _) => format!("[{}]", label.red().bold()),
    }
}

/// Format the AQI gauge (Rich mode) - a 0-500 bar in the level color.
pub fn format_aqi_gauge(aqi: &AqiResult, style: StyleMode, no_color: bool) -> String {
    let filled = ((aqi.gauge_percent() / 100.0) * GAUGE_CELLS as f64).round() as usize;
    let filled = filled.min(GAUGE_CELLS);

    let (full, empty) = if style == StyleMode::Plain {
        ("#", ".")
    } else {
        ("█", "░")
    };
    let bar = format!("{}{}", full.repeat(filled), empty.repeat(GAUGE_CELLS - filled));
    paint_level(&bar, aqi.level, no_color)
}

/// Apply table style based on StyleMode.
pub fn apply_table_style(table: &mut tabled::Table, style: StyleMode) {
    use tabled::settings::Style;
    match style {
        StyleMode::Rich | StyleMode::Minimal => {
            table.with(Style::rounded());
        }
        StyleMode::Plain => {
            table.with(Style::blank());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airwatch_core::classify;

    #[test]
    fn test_plain_aqi_has_no_escape_codes() {
        let text = format_aqi_colored(&classify(35.0), true);
        assert_eq!(text, "99 Moderate");
    }

    #[test]
    fn test_colored_aqi_uses_level_color() {
        let text = format_aqi_colored(&classify(150.0), false);
        // Unhealthy: #ff0000
        assert!(text.contains("\u{1b}[38;2;255;0;0m"));
    }

    #[test]
    fn test_unknown_badge() {
        assert_eq!(format_badge(&AqiBadge::unknown(), true), "Unknown");
    }

    #[test]
    fn test_gauge_fill() {
        assert_eq!(
            format_aqi_gauge(&classify(0.0), StyleMode::Plain, true),
            "....................",
        );
        // 200 / 500 of 20 cells
        let gauge = format_aqi_gauge(&classify(150.0), StyleMode::Plain, true);
        assert_eq!(gauge.matches('#').count(), 8);
        assert_eq!(gauge.chars().count(), GAUGE_CELLS);
    }

    #[test]
    fn test_status_badge_labels() {
        assert_eq!(
            format_status_badge(true, false, StyleMode::Rich, true),
            "[Online]"
        );
        assert_eq!(
            format_status_badge(true, true, StyleMode::Rich, true),
            "[Online (stale)]"
        );
        assert_eq!(
            format_status_badge(false, true, StyleMode::Plain, false),
            "[Offline]"
        );
    }

    #[test]
    fn test_title_rule_matches_width() {
        assert_eq!(format_title("Devices", true), "Devices\n━━━━━━━");
    }
}
