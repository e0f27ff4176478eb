//! Dashboard command implementation.

use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, info};

use airwatch_core::{FixedClock, ReadingSource, SnapshotBuilder};

use super::snapshot_for;
use crate::cli::OutputFormat;
use crate::format::{
    FormatOptions, format_dashboard_csv, format_dashboard_json, format_dashboard_text,
};
use crate::util::{device_context, write_output};

/// Arguments for the dashboard command.
pub struct DashboardArgs<'a> {
    pub source: &'a dyn ReadingSource,
    pub builder: &'a SnapshotBuilder<FixedClock>,
    pub device_id: &'a str,
    pub format: OutputFormat,
    pub output: Option<&'a PathBuf>,
    pub opts: &'a FormatOptions,
}

pub fn cmd_dashboard(args: DashboardArgs<'_>) -> Result<()> {
    let DashboardArgs {
        source,
        builder,
        device_id,
        format,
        output,
        opts,
    } = args;

    let device = source.device(device_id).map_err(device_context)?;
    let snapshot = snapshot_for(source, builder, &device)?;
    let window = builder.aggregator().window();

    if snapshot.status_mismatch() {
        debug!(
            device = %device.device_id,
            raw_status = %snapshot.raw_status,
            is_online = snapshot.is_online,
            is_stale = snapshot.is_stale,
            "Reported status disagrees with last update"
        );
    }
    if snapshot.alert {
        info!(
            device = %device.device_id,
            aqi = snapshot.aqi.value,
            "Air quality alert"
        );
    }

    let content = match format {
        OutputFormat::Json => format_dashboard_json(&snapshot, &window, opts)?,
        OutputFormat::Csv => format_dashboard_csv(&snapshot, &window, opts)?,
        OutputFormat::Text => format_dashboard_text(&snapshot, &window, opts),
    };

    write_output(output, &content)
}
