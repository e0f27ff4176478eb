//! Alias command implementation.
//!
//! Manages friendly device names (aliases) that map to device ids.

use anyhow::{Result, bail};
use tabled::{builder::Builder, settings::Style};

use crate::config::Config;

/// Alias subcommand actions
pub enum AliasAction {
    /// List all aliases
    List,
    /// Set an alias
    Set { name: String, device_id: String },
    /// Remove an alias
    Remove { name: String },
}

pub fn cmd_alias(action: AliasAction, quiet: bool) -> Result<()> {
    let mut config = Config::load();

    match action {
        AliasAction::List => {
            if config.aliases.is_empty() {
                if !quiet {
                    println!("No aliases configured.");
                    println!();
                    println!("Add an alias with: airwatch alias set <name> <device-id>");
                }
            } else {
                let mut builder = Builder::default();
                builder.push_record(["Alias", "Device ID"]);

                let mut aliases: Vec<_> = config.aliases.iter().collect();
                aliases.sort_by_key(|(name, _)| name.as_str());
                for (name, device_id) in aliases {
                    builder.push_record([name.as_str(), device_id.as_str()]);
                }

                let mut table = builder.build();
                table.with(Style::rounded());
                println!("{}", table);
            }
        }
        AliasAction::Set { name, device_id } => {
            // An alias that looks like an id would shadow the real device
            if looks_like_device_id(&name) {
                bail!(
                    "Alias name '{}' looks like a device id. \
                     Use a friendly name instead (e.g., 'living-room', 'office').",
                    name
                );
            }

            let was_update = config.aliases.contains_key(&name);
            config.aliases.insert(name.clone(), device_id.clone());
            config.save()?;

            if !quiet {
                if was_update {
                    println!("Updated alias '{}' → {}", name, device_id);
                } else {
                    println!("Added alias '{}' → {}", name, device_id);
                }
            }
        }
        AliasAction::Remove { name } => {
            if config.aliases.remove(&name).is_some() {
                config.save()?;
                if !quiet {
                    println!("Removed alias '{}'", name);
                }
            } else {
                bail!("Alias '{}' not found", name);
            }
        }
    }

    Ok(())
}

/// Check if a string looks like a device id: an upper-case prefix, a dash,
/// then digits (`AQM-001`).
fn looks_like_device_id(s: &str) -> bool {
    let Some((prefix, number)) = s.split_once('-') else {
        return false;
    };
    !prefix.is_empty()
        && !number.is_empty()
        && prefix.chars().all(|c| c.is_ascii_uppercase())
        && number.chars().all(|c| c.is_ascii_digit())
}
