//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl OutputFormat {
    /// Parse a format name as written in the config file.
    pub fn from_config(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name, true).ok()
    }
}

/// Visual styling mode for output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum StyleMode {
    /// Standard styling with colors
    Minimal,
    /// Rich styling with tables, gauges and full formatting (default)
    #[default]
    Rich,
    /// Plain text with no decorations (for scripting)
    Plain,
}

/// Reusable output format arguments
#[derive(Debug, Clone, Args)]
pub struct OutputArgs {
    /// Output format (defaults to the config value, then text)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Omit header row in CSV output (useful for appending)
    #[arg(long)]
    pub no_header: bool,
}

impl OutputArgs {
    /// Resolve the output format: `--json`, then `--format`, then config.
    pub fn resolve_format(&self, json: bool, config_format: Option<&str>) -> OutputFormat {
        if json {
            OutputFormat::Json
        } else if let Some(format) = self.format {
            format
        } else {
            config_format
                .and_then(OutputFormat::from_config)
                .unwrap_or_default()
        }
    }
}

/// Time window arguments shared by `dashboard` and `history`.
#[derive(Debug, Clone, Default, Args)]
pub struct WindowArgs {
    /// Trailing window length in hours (defaults to the config value, then 24)
    #[arg(long, conflicts_with_all = ["since", "until"])]
    pub hours: Option<u32>,

    /// Window start (RFC3339 or YYYY-MM-DD)
    #[arg(long, requires = "until")]
    pub since: Option<String>,

    /// Window end, inclusive (RFC3339 or YYYY-MM-DD)
    #[arg(long, requires = "since")]
    pub until: Option<String>,
}

/// Freshness arguments shared by `devices` and `dashboard`.
#[derive(Debug, Clone, Default, Args)]
pub struct FreshnessArgs {
    /// Report a device as offline when its last update is older than this
    /// many minutes, whatever its recorded status
    #[arg(long, value_name = "MINUTES")]
    pub stale_after: Option<u64>,
}

#[derive(Parser)]
#[command(name = "airwatch")]
#[command(author, version, about = "Air quality dashboard for sensor fleets", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as JSON (shorthand for --format json)
    #[arg(long, global = true)]
    pub json: bool,

    /// Output compact JSON (no pretty-printing)
    #[arg(long, global = true)]
    pub compact: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Visual styling mode (minimal, rich, plain)
    #[arg(
        long,
        global = true,
        value_enum,
        default_value = "rich",
        env = "AIRWATCH_STYLE"
    )]
    pub style: StyleMode,

    /// Write output to file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// JSON file with devices and readings (demo fleet when omitted)
    #[arg(long, global = true, env = "AIRWATCH_DATA")]
    pub data: Option<PathBuf>,

    /// Evaluate as of this time instead of the system clock (RFC3339 or YYYY-MM-DD)
    #[arg(long, global = true)]
    pub now: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List devices with their current AQI and status
    Devices {
        #[command(flatten)]
        output: OutputArgs,

        #[command(flatten)]
        freshness: FreshnessArgs,
    },

    /// Show the dashboard of one device
    Dashboard {
        /// Device id or alias
        device: String,

        #[command(flatten)]
        output: OutputArgs,

        #[command(flatten)]
        window: WindowArgs,

        #[command(flatten)]
        freshness: FreshnessArgs,
    },

    /// Show the chart series of one device
    History {
        /// Device id or alias
        device: String,

        #[command(flatten)]
        output: OutputArgs,

        #[command(flatten)]
        window: WindowArgs,

        /// Only show the newest N points (0 for all)
        #[arg(short, long, default_value = "0")]
        count: usize,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Manage device aliases (friendly names for device ids)
    Alias {
        #[command(subcommand)]
        action: AliasSubcommand,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Get a configuration value
    Get {
        #[arg(value_enum)]
        key: ConfigKey,
    },
    /// Set a configuration value
    Set {
        #[arg(value_enum)]
        key: ConfigKey,
        value: String,
    },
    /// Reset a configuration value to its default
    Unset {
        #[arg(value_enum)]
        key: ConfigKey,
    },
    /// Show config file path
    Path,
    /// Initialize config file with defaults
    Init,
}

/// Valid configuration keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigKey {
    /// Default JSON data file
    DataFile,
    /// Default trailing window in hours
    WindowHours,
    /// Minutes after which a device counts as offline
    StaleAfterMinutes,
    /// Default output format (text, json, csv)
    Format,
    /// Disable colored output (true/false)
    NoColor,
}

#[derive(Debug, Clone, Subcommand)]
pub enum AliasSubcommand {
    /// List all aliases
    List,
    /// Set an alias
    Set {
        /// Friendly name
        name: String,
        /// Device id
        device_id: String,
    },
    /// Remove an alias
    #[command(alias = "rm")]
    Remove {
        /// Alias to remove
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_dashboard_with_range() {
        let cli = Cli::try_parse_from([
            "airwatch",
            "dashboard",
            "AQM-001",
            "--since",
            "2024-01-14",
            "--until",
            "2024-01-15T12:00:00Z",
        ])
        .unwrap();
        match cli.command {
            Commands::Dashboard { device, window, .. } => {
                assert_eq!(device, "AQM-001");
                assert_eq!(window.since.as_deref(), Some("2024-01-14"));
                assert_eq!(window.until.as_deref(), Some("2024-01-15T12:00:00Z"));
                assert!(window.hours.is_none());
            }
            _ => panic!("expected dashboard"),
        }
    }

    #[test]
    fn test_hours_conflicts_with_range() {
        let result = Cli::try_parse_from([
            "airwatch", "history", "AQM-001", "--hours", "6", "--since", "2024-01-14", "--until",
            "2024-01-15",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_since_requires_until() {
        let result = Cli::try_parse_from(["airwatch", "history", "AQM-001", "--since", "2024-01-14"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "airwatch",
            "devices",
            "--json",
            "--now",
            "2024-01-15T12:00:00Z",
            "--stale-after",
            "30",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.now.as_deref(), Some("2024-01-15T12:00:00Z"));
        match cli.command {
            Commands::Devices { freshness, .. } => assert_eq!(freshness.stale_after, Some(30)),
            _ => panic!("expected devices"),
        }
    }

    #[test]
    fn test_resolve_format_precedence() {
        let args = OutputArgs {
            format: Some(OutputFormat::Csv),
            no_header: false,
        };
        assert_eq!(args.resolve_format(true, Some("text")), OutputFormat::Json);
        assert_eq!(args.resolve_format(false, Some("json")), OutputFormat::Csv);

        let args = OutputArgs {
            format: None,
            no_header: false,
        };
        assert_eq!(args.resolve_format(false, Some("JSON")), OutputFormat::Json);
        assert_eq!(args.resolve_format(false, Some("yaml")), OutputFormat::Text);
        assert_eq!(args.resolve_format(false, None), OutputFormat::Text);
    }
}
