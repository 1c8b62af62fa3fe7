//! CLI module for WallSpan.
//!
//! Without a subcommand the rotation daemon runs in the foreground. The
//! other commands perform one action and exit.

mod commands;
mod output;

use clap::Parser;
pub use commands::daemon::DaemonCommand;
pub use commands::{Cli, Commands};

use crate::error::WallspanError;

/// Runs the CLI.
///
/// Parses command-line arguments and executes the appropriate command.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn run() -> Result<(), WallspanError> {
    let cli = Cli::parse();
    cli.execute()
}
