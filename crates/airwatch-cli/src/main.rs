use std::io;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use airwatch_core::{Clock, SnapshotBuilder, Window};

mod cli;
mod commands;
mod config;
mod format;
mod style;
mod util;

use cli::{AliasSubcommand, Cli, Commands};
use commands::{
    AliasAction, DashboardArgs, DevicesArgs, HistoryArgs, cmd_alias, cmd_config, cmd_dashboard,
    cmd_devices, cmd_history,
};
use config::{Config, print_alias_feedback, resolve_alias};
use format::FormatOptions;
use util::{open_source, reference_clock, resolve_window};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle completions command early (before tracing init)
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "airwatch", &mut io::stdout());
        return Ok(());
    }

    // When quiet mode is enabled, suppress info-level logging
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = Config::load();
    let no_color = cli.no_color || config.no_color;
    let base_opts = FormatOptions::new(no_color, cli.style).with_compact(cli.compact);

    if let Some(ref path) = cli.output {
        tracing::debug!("Output will be written to: {}", path.display());
    }

    match cli.command {
        Commands::Devices { output, freshness } => {
            let clock = reference_clock(cli.now.as_deref())?;
            let source = open_source(
                config.resolve_data_file(cli.data).as_deref(),
                clock.now(),
            )?;
            let builder = SnapshotBuilder::new(clock)
                .window(Window::last_hours(config.window_hours))
                .policy(config.freshness_policy(freshness.stale_after));
            let opts = base_opts.with_no_header(output.no_header);

            cmd_devices(DevicesArgs {
                source: source.as_ref(),
                builder: &builder,
                format: output.resolve_format(cli.json, config.format.as_deref()),
                output: cli.output.as_ref(),
                opts: &opts,
            })?;
        }
        Commands::Dashboard {
            device,
            output,
            window,
            freshness,
        } => {
            let device_id = resolve_alias(&device, &config);
            print_alias_feedback(&device, &device_id, cli.quiet);

            let clock = reference_clock(cli.now.as_deref())?;
            let source = open_source(
                config.resolve_data_file(cli.data).as_deref(),
                clock.now(),
            )?;
            let builder = SnapshotBuilder::new(clock)
                .window(resolve_window(&window, config.window_hours)?)
                .policy(config.freshness_policy(freshness.stale_after));
            let opts = base_opts.with_no_header(output.no_header);

            cmd_dashboard(DashboardArgs {
                source: source.as_ref(),
                builder: &builder,
                device_id: &device_id,
                format: output.resolve_format(cli.json, config.format.as_deref()),
                output: cli.output.as_ref(),
                opts: &opts,
            })?;
        }
        Commands::History {
            device,
            output,
            window,
            count,
        } => {
            let device_id = resolve_alias(&device, &config);
            print_alias_feedback(&device, &device_id, cli.quiet);

            let clock = reference_clock(cli.now.as_deref())?;
            let source = open_source(
                config.resolve_data_file(cli.data).as_deref(),
                clock.now(),
            )?;
            let builder =
                SnapshotBuilder::new(clock).window(resolve_window(&window, config.window_hours)?);
            let opts = base_opts.with_no_header(output.no_header);

            cmd_history(HistoryArgs {
                source: source.as_ref(),
                builder: &builder,
                device_id: &device_id,
                count,
                format: output.resolve_format(cli.json, config.format.as_deref()),
                output: cli.output.as_ref(),
                opts: &opts,
            })?;
        }
        Commands::Config { action } => {
            cmd_config(action, cli.quiet, no_color)?;
        }
        Commands::Alias { action } => {
            let action = match action {
                AliasSubcommand::List => AliasAction::List,
                AliasSubcommand::Set { name, device_id } => AliasAction::Set { name, device_id },
                AliasSubcommand::Remove { name } => AliasAction::Remove { name },
            };
            cmd_alias(action, cli.quiet)?;
        }
        Commands::Completions { .. } => {
            // Already handled above
            unreachable!()
        }
    }

    Ok(())
}
