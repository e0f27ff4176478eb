//! Utility functions for CLI operations.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use time::OffsetDateTime;
use tracing::debug;

use airwatch_core::{
    Clock, Error as CoreError, FixedClock, JsonFileSource, MockSource, ReadingSource, SystemClock,
    Window,
};
use airwatch_types::parse_timestamp;

use crate::cli::WindowArgs;

/// Parse a date/time string in RFC3339 or YYYY-MM-DD format.
pub fn parse_datetime(s: &str) -> Result<OffsetDateTime> {
    parse_timestamp(s).with_context(|| {
        format!(
            "Invalid date format '{}'. Use RFC3339 (e.g., 2024-01-15T10:30:00Z) or YYYY-MM-DD",
            s
        )
    })
}

/// The instant a command evaluates against: `--now` when given, the system
/// clock otherwise. It is read once so every part of the output agrees.
pub fn reference_clock(now: Option<&str>) -> Result<FixedClock> {
    let at = match now {
        Some(s) => parse_datetime(s)?,
        None => SystemClock.now(),
    };
    Ok(FixedClock::new(at))
}

/// Resolve the summary window from the command line, falling back to a
/// trailing window of `default_hours`.
pub fn resolve_window(args: &WindowArgs, default_hours: u32) -> Result<Window> {
    match (&args.since, &args.until) {
        (Some(since), Some(until)) => {
            let start = parse_datetime(since)?;
            let end = parse_datetime(until)?;
            if start > end {
                bail!("--since ({}) is after --until ({})", since, until);
            }
            Ok(Window::between(start, end))
        }
        _ => {
            let hours = args.hours.unwrap_or(default_hours);
            if hours == 0 {
                bail!("Window must be at least one hour");
            }
            Ok(Window::last_hours(hours))
        }
    }
}

/// Open the JSON data file, or the demo fleet when none is configured.
pub fn open_source(data: Option<&Path>, now: OffsetDateTime) -> Result<Box<dyn ReadingSource>> {
    match data {
        Some(path) => {
            let source = JsonFileSource::open(path)
                .with_context(|| format!("Failed to load data file {}", path.display()))?;
            Ok(Box::new(source))
        }
        None => {
            debug!("No data file configured, using the demo fleet");
            Ok(Box::new(MockSource::new(now)))
        }
    }
}

/// Turn a missing device into a message that points at `airwatch devices`.
pub fn device_context(err: CoreError) -> anyhow::Error {
    match err {
        CoreError::DeviceNotFound(id) => anyhow::anyhow!(
            "Device '{}' not found.\nRun 'airwatch devices' to list known devices.",
            id
        ),
        other => other.into(),
    }
}

pub fn write_output(output: Option<&PathBuf>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }
        None => {
            print!("{}", content);
            io::stdout().flush()?;
        }
    }
    Ok(())
}
