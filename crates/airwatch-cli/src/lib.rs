//! Command-line dashboard for air-quality sensor fleets.
//!
//! This crate provides the `airwatch` binary, a terminal front end for the
//! AQI classification, window summaries and freshness labels computed by
//! [`airwatch_core`].
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `devices` | Device list with AQI badge, status and time since last update |
//! | `dashboard` | Current AQI card, alert banner, live readings and window summary |
//! | `history` | Chart series with the AQI of every point |
//! | `config` | Manage CLI configuration |
//! | `alias` | Friendly names for device ids |
//! | `completions` | Generate shell completions |
//!
//! # Output Formats
//!
//! The CLI supports three output formats:
//!
//! - **Text** (default): Human-readable colored output
//! - **JSON**: Machine-readable JSON format
//! - **CSV**: Comma-separated values for spreadsheets and data analysis
//!
//! # Data
//!
//! Readings come from a JSON file (`--data`, `AIRWATCH_DATA` or `data_file`
//! in the config) holding `devices` and `readings` arrays. Without one, a
//! deterministic demo fleet of four devices is used.
//!
//! # Configuration
//!
//! The CLI stores configuration in `~/.config/airwatch/config.toml` (or platform equivalent).
//! Configuration options include:
//!
//! - `data_file`: Default JSON data file
//! - `window_hours`: Trailing summary window (default 24)
//! - `stale_after_minutes`: Report devices silent for longer as offline
//! - `format`: Default output format
//! - `no_color`: Disable colored output
//!
//! # Environment Variables
//!
//! - `AIRWATCH_DATA`: Data file (overridden by `--data` flag)
//! - `AIRWATCH_STYLE`: Styling mode (`minimal`, `rich`, `plain`)
//! - `NO_COLOR`: Disable colored output when set
//!
//! # Examples
//!
//! List the demo fleet as of a fixed time:
//! ```bash
//! airwatch devices --now 2024-01-15T12:00:00Z
//! ```
//!
//! Dashboard of one device, treating devices silent for 30 minutes as offline:
//! ```bash
//! airwatch --data fleet.json dashboard AQM-002 --stale-after 30
//! ```
//!
//! Export a date range as CSV:
//! ```bash
//! airwatch history AQM-001 --since 2024-01-14 --until 2024-01-15 --format csv --output pm.csv
//! ```

// This crate is primarily a binary CLI application.
// The main entry point and command implementations are in main.rs.

// Re-export core dependencies for convenience
pub use airwatch_core;
pub use airwatch_types;
