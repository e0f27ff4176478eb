//! Devices command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use airwatch_core::{FixedClock, FleetOverview, ReadingSource, SnapshotBuilder};

use super::snapshot_for;
use crate::cli::OutputFormat;
use crate::format::{FormatOptions, format_devices_csv, format_devices_json, format_devices_text};
use crate::util::write_output;

/// Arguments for the devices command.
pub struct DevicesArgs<'a> {
    pub source: &'a dyn ReadingSource,
    pub builder: &'a SnapshotBuilder<FixedClock>,
    pub format: OutputFormat,
    pub output: Option<&'a PathBuf>,
    pub opts: &'a FormatOptions,
}

pub fn cmd_devices(args: DevicesArgs<'_>) -> Result<()> {
    let DevicesArgs {
        source,
        builder,
        format,
        output,
        opts,
    } = args;

    let devices = source.devices().context("Failed to list devices")?;
    let snapshots = devices
        .iter()
        .map(|device| snapshot_for(source, builder, device))
        .collect::<Result<Vec<_>>>()?;

    let overview = FleetOverview::from_snapshots(&snapshots);
    debug!(
        total = overview.total,
        online = overview.online,
        stale = overview.stale,
        alerts = overview.alerts,
        "Built device list"
    );

    let content = match format {
        OutputFormat::Json => format_devices_json(&snapshots, &overview, opts)?,
        OutputFormat::Csv => format_devices_csv(&snapshots, opts)?,
        OutputFormat::Text => format_devices_text(&snapshots, &overview, opts),
    };

    write_output(output, &content)
}
