//! CLI command definitions using Clap.
//!
//! This module defines all CLI commands and their arguments, organized into
//! domain-specific submodules:
//!
//! - `config_cmd` - Configuration file inspection
//! - `daemon` - The long-running rotation daemon
//! - `types` - Shared types used across commands
//! - `wallpaper` - One-shot wallpaper commands

use std::io;
use std::path::PathBuf;

use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};

use crate::constants::APP_NAME;
use crate::error::WallspanError;
use crate::{logging, schema};

pub mod config_cmd;
pub mod daemon;
pub mod types;
pub mod wallpaper;

pub use config_cmd::ConfigCommands;
pub use types::ModeArg;

/// Application version from Cargo.toml.
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// WallSpan - one photo stretched across every display.
#[derive(Parser, Debug)]
#[command(name = "wallspan")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a custom configuration file.
    ///
    /// Overrides the default configuration file search paths.
    /// Supports JSONC format (JSON with comments).
    #[arg(long, short, global = true, value_name = "PATH", env = "WALLSPAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` overrides it.
    #[arg(long, short, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
#[command(next_display_order = None)]
pub enum Commands {
    /// Run the rotation daemon (default).
    ///
    /// Rotates on the configured interval, reloads the configuration when
    /// it changes and reads single key commands from stdin:
    /// n(ext), b(ack), f(orward), a(pply), p(ause), s(tatus), q(uit).
    Run,

    /// Fetch a new photo, apply it and exit.
    Next,

    /// Apply a local image.
    #[command(after_long_help = r#"Examples:
  wallspan set ~/Pictures/panorama.jpg                  # Span across all displays
  wallspan set ~/Pictures/photo.jpg --mode individual   # Whole image on each display"#)]
    Set {
        /// The path to the image.
        #[arg(value_name = "PATH")]
        path: String,

        /// Override the configured rotation mode.
        #[arg(long, short, value_enum)]
        mode: Option<ModeArg>,
    },

    /// List displays, the virtual desktop bounds and its aspect class.
    Displays {
        /// Print as JSON.
        #[arg(long, short)]
        json: bool,
    },

    /// Delete generated wallpaper files.
    Clean,

    /// Configuration file commands.
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Output the configuration JSON Schema.
    ///
    /// Outputs a JSON Schema to stdout that describes the structure of the
    /// configuration file. Can be redirected to a file for use with editors
    /// that support JSON Schema validation.
    Schema,

    /// Generate shell completions.
    ///
    /// Usage:
    ///   eval "$(wallspan completions --shell zsh)"
    ///   wallspan completions --shell fish > ~/.config/fish/completions/wallspan.fish
    Completions {
        /// The shell to generate completions for.
        #[arg(long, short, value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// The subcommand to run, defaulting to [`Commands::Run`].
    #[must_use]
    pub fn active_command(&self) -> &Commands { self.command.as_ref().unwrap_or(&Commands::Run) }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command execution fails.
    pub fn execute(&self) -> Result<(), WallspanError> {
        logging::init_logging(self.verbose);

        if let Some(path) = &self.config {
            if !path.exists() {
                return Err(WallspanError::ConfigError(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
        }
        let config_path = self.config.as_deref();

        match self.active_command() {
            Commands::Run => daemon::execute_run(config_path),
            Commands::Next => wallpaper::execute_next(config_path),
            Commands::Set { path, mode } => wallpaper::execute_set(config_path, path, *mode),
            Commands::Displays { json } => wallpaper::execute_displays(config_path, *json),
            Commands::Clean => wallpaper::execute_clean(),
            Commands::Config(cmd) => config_cmd::execute(cmd, config_path),

            Commands::Schema => {
                println!("{}", schema::print_schema());
                Ok(())
            }

            Commands::Completions { shell } => {
                Self::print_completions(*shell);
                Ok(())
            }
        }
    }

    /// Print shell completions to stdout.
    fn print_completions<G: Generator>(generator: G) {
        let mut cmd = Self::command();
        generate(generator, &mut cmd, APP_NAME, &mut io::stdout());
    }
}
