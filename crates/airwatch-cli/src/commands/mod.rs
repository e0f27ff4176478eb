//! Command implementations for the CLI.

mod alias;
mod config;
mod dashboard;
mod devices;
mod history;

pub use alias::{AliasAction, cmd_alias};
pub use config::cmd_config;
pub use dashboard::{DashboardArgs, cmd_dashboard};
pub use devices::{DevicesArgs, cmd_devices};
pub use history::{HistoryArgs, cmd_history};

use anyhow::Result;

use airwatch_core::{Clock, Device, DeviceSnapshot, ReadingSource, SnapshotBuilder};

use crate::util::device_context;

/// Fetch what a snapshot needs from `source` and build it.
pub(crate) fn snapshot_for<C: Clock>(
    source: &dyn ReadingSource,
    builder: &SnapshotBuilder<C>,
    device: &Device,
) -> Result<DeviceSnapshot> {
    let now = builder.clock().now();
    let latest = source
        .latest_reading(&device.device_id)
        .map_err(device_context)?;
    let history = source
        .readings(&device.device_id, builder.aggregator().window(), now)
        .map_err(device_context)?;
    Ok(builder.build(device, latest.as_ref(), &history))
}
