//! History command implementation.

use std::path::PathBuf;

use anyhow::Result;
use tracing::debug;

use airwatch_core::{Clock, FixedClock, ReadingSource, SnapshotBuilder};

use crate::cli::OutputFormat;
use crate::format::{FormatOptions, format_history_csv, format_history_json, format_history_text};
use crate::util::{device_context, write_output};

/// Arguments for the history command.
pub struct HistoryArgs<'a> {
    pub source: &'a dyn ReadingSource,
    pub builder: &'a SnapshotBuilder<FixedClock>,
    pub device_id: &'a str,
    /// Keep only the newest `count` points (0 keeps all).
    pub count: usize,
    pub format: OutputFormat,
    pub output: Option<&'a PathBuf>,
    pub opts: &'a FormatOptions,
}

pub fn cmd_history(args: HistoryArgs<'_>) -> Result<()> {
    let HistoryArgs {
        source,
        builder,
        device_id,
        count,
        format,
        output,
        opts,
    } = args;

    let device = source.device(device_id).map_err(device_context)?;
    let window = builder.aggregator().window();
    let readings = source
        .readings(&device.device_id, window, builder.clock().now())
        .map_err(device_context)?;

    let mut points = builder.series(&readings);
    if count > 0 && points.len() > count {
        let excess = points.len() - count;
        points.drain(..excess);
    }
    debug!(device = %device.device_id, points = points.len(), "Built chart series");

    let content = match format {
        OutputFormat::Json => format_history_json(&points, opts)?,
        OutputFormat::Csv => format_history_csv(&points, opts)?,
        OutputFormat::Text => format_history_text(&points, &window, opts),
    };

    write_output(output, &content)
}
