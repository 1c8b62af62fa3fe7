//! Config CLI commands.
//!
//! Commands for inspecting the WallSpan configuration file.

use std::path::Path;

use clap::Subcommand;

use crate::cli::output;
use crate::config::{self, config_paths};
use crate::error::WallspanError;

const MASKED_KEY: &str = "********";

/// Config inspection commands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
#[command(next_display_order = None)]
pub enum ConfigCommands {
    /// Show the configuration file search paths.
    ///
    /// Lists every location WallSpan looks for a configuration file, in
    /// priority order, and marks the one in use.
    Path,

    /// Print the effective configuration as JSON.
    ///
    /// Missing options show their defaults. The access key is masked.
    Show,
}

/// Execute config subcommands.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cmd: &ConfigCommands, config_path: Option<&Path>) -> Result<(), WallspanError> {
    match cmd {
        ConfigCommands::Path => {
            show_config_path(config_path);
            Ok(())
        }
        ConfigCommands::Show => show_config(config_path),
    }
}

/// Show the configuration file path.
fn show_config_path(config_path: Option<&Path>) {
    if let Some(path) = config_path {
        let marker = if path.exists() { " (active)" } else { " (missing)" };
        println!("Configuration file (from --config):\n\n  {}{marker}", path.display());
        return;
    }

    println!("Configuration file search paths (in priority order):\n");

    let paths = config_paths();
    let mut found_config = false;

    for (i, path) in paths.iter().enumerate() {
        let exists = path.exists();
        let marker = if exists && !found_config {
            found_config = true;
            " (active)"
        } else if exists {
            " (exists)"
        } else {
            ""
        };

        println!("  {}. {}{}", i + 1, path.display(), marker);
    }

    if !found_config {
        println!("\nNo configuration file found, defaults are in use.");
    }
}

/// Print the effective configuration.
fn show_config(config_path: Option<&Path>) -> Result<(), WallspanError> {
    let loaded = config::load(config_path)?;
    let has_key = loaded.access_key().is_some();

    let mut value = serde_json::to_value(&loaded.config)?;
    if let Some(object) = value.as_object_mut() {
        if object.get("apiKey").and_then(serde_json::Value::as_str).is_some_and(|k| !k.is_empty()) {
            object.insert("apiKey".to_string(), serde_json::Value::from(MASKED_KEY));
        }
    }

    match &loaded.path {
        Some(path) => eprintln!("# {}", path.display()),
        None => eprintln!("# defaults (no configuration file)"),
    }
    if !has_key {
        eprintln!("# no Unsplash access key found");
    }
    output::print_highlighted_json(&value);
    Ok(())
}
