//! Config command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use crate::cli::{ConfigAction, ConfigKey, OutputFormat};
use crate::config::Config;
use crate::style;

pub fn cmd_config(action: ConfigAction, quiet: bool, no_color: bool) -> Result<()> {
    let path = Config::path();

    match action {
        ConfigAction::Path => {
            println!("{}", path.display());
        }
        ConfigAction::Show => {
            let config = Config::load_from(&path);
            let content = toml::to_string_pretty(&config).context("Failed to serialize config")?;
            if !quiet && !path.exists() {
                eprintln!("# No config file at {}, showing defaults", path.display());
            }
            print!("{}", content);
        }
        ConfigAction::Get { key } => {
            let config = Config::load_from(&path);
            println!("{}", get_value(&config, key));
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load_from(&path);
            set_value(&mut config, key, &value)?;
            config.save_to(&path)?;
            if !quiet {
                println!(
                    "{}",
                    style::format_success(&format!("Set {} = {}", key_name(key), value), no_color)
                );
            }
        }
        ConfigAction::Unset { key } => {
            let mut config = Config::load_from(&path);
            unset_value(&mut config, key);
            config.save_to(&path)?;
            if !quiet {
                println!(
                    "{}",
                    style::format_success(&format!("Reset {}", key_name(key)), no_color)
                );
            }
        }
        ConfigAction::Init => {
            if path.exists() {
                bail!("Config file already exists at {}", path.display());
            }
            Config::default().save_to(&path)?;
            if !quiet {
                println!(
                    "{}",
                    style::format_success(
                        &format!("Created config file at {}", path.display()),
                        no_color
                    )
                );
            }
        }
    }

    Ok(())
}

/// Name of a key as it appears in the config file.
fn key_name(key: ConfigKey) -> &'static str {
    match key {
        ConfigKey::DataFile => "data_file",
        ConfigKey::WindowHours => "window_hours",
        ConfigKey::StaleAfterMinutes => "stale_after_minutes",
        ConfigKey::Format => "format",
        ConfigKey::NoColor => "no_color",
    }
}

fn get_value(config: &Config, key: ConfigKey) -> String {
    let unset = || "(not set)".to_string();
    match key {
        ConfigKey::DataFile => config
            .data_file
            .as_ref()
            .map_or_else(unset, |p| p.display().to_string()),
        ConfigKey::WindowHours => config.window_hours.to_string(),
        ConfigKey::StaleAfterMinutes => config
            .stale_after_minutes
            .map_or_else(unset, |m| m.to_string()),
        ConfigKey::Format => config.format.clone().unwrap_or_else(unset),
        ConfigKey::NoColor => config.no_color.to_string(),
    }
}

fn set_value(config: &mut Config, key: ConfigKey, value: &str) -> Result<()> {
    match key {
        ConfigKey::DataFile => config.data_file = Some(PathBuf::from(value)),
        ConfigKey::WindowHours => {
            let hours: u32 = value
                .parse()
                .with_context(|| format!("Invalid window_hours '{}': expected whole hours", value))?;
            if hours == 0 {
                bail!("window_hours must be at least 1");
            }
            config.window_hours = hours;
        }
        ConfigKey::StaleAfterMinutes => {
            let minutes: u64 = value.parse().with_context(|| {
                format!("Invalid stale_after_minutes '{}': expected whole minutes", value)
            })?;
            config.stale_after_minutes = Some(minutes);
        }
        ConfigKey::Format => {
            if OutputFormat::from_config(value).is_none() {
                bail!("Invalid format '{}'. Use text, json, or csv", value);
            }
            config.format = Some(value.to_lowercase());
        }
        ConfigKey::NoColor => {
            config.no_color = value
                .parse()
                .with_context(|| format!("Invalid no_color '{}': expected true or false", value))?;
        }
    }
    Ok(())
}

fn unset_value(config: &mut Config, key: ConfigKey) {
    let defaults = Config::default();
    match key {
        ConfigKey::DataFile => config.data_file = defaults.data_file,
        ConfigKey::WindowHours => config.window_hours = defaults.window_hours,
        ConfigKey::StaleAfterMinutes => config.stale_after_minutes = defaults.stale_after_minutes,
        ConfigKey::Format => config.format = defaults.format,
        ConfigKey::NoColor => config.no_color = defaults.no_color,
    }
}
