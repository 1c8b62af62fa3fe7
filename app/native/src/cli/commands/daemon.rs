//! The rotation daemon.
//!
//! Runs the controller with its timer, a configuration watcher and single
//! key commands read from stdin, until `q` or Ctrl-C. End of input only
//! stops the stdin reader.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use colored::Colorize;

use super::wallpaper::{runtime, system_displays, system_services};
use crate::cli::output;
use crate::config;
use crate::error::WallspanError;
use crate::platform::spawn_named_thread;
use crate::unsplash::UnsplashClient;
use crate::wallpaper::controller::{ControllerError, Reconfigured};
use crate::wallpaper::rotation::RotationFiles;
use crate::wallpaper::{ControlMessage, Controller, ControllerHandle, SystemDisplays};

const HELP: &str = "Commands: n(ext)  b(ack)  f(orward)  a(pply)  p(ause)  s(tatus)  q(uit)";

/// A command typed on stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonCommand {
    Next,
    Back,
    Forward,
    Apply,
    Pause,
    Status,
    Quit,
    Help,
}

impl DaemonCommand {
    /// Parses one line of input. Only the first character matters.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let first = line.trim().chars().next()?;
        match first.to_ascii_lowercase() {
            'n' => Some(Self::Next),
            'b' => Some(Self::Back),
            'f' => Some(Self::Forward),
            'a' => Some(Self::Apply),
            'p' => Some(Self::Pause),
            's' => Some(Self::Status),
            'q' => Some(Self::Quit),
            'h' | '?' => Some(Self::Help),
            _ => None,
        }
    }

    /// Controller message for commands that map to one.
    #[must_use]
    pub fn message(self) -> Option<ControlMessage> {
        match self {
            Self::Next => Some(ControlMessage::Next),
            Self::Back => Some(ControlMessage::PreviewBack),
            Self::Forward => Some(ControlMessage::PreviewForward),
            Self::Apply => Some(ControlMessage::ApplyPreview),
            Self::Pause => Some(ControlMessage::TogglePause),
            Self::Quit => Some(ControlMessage::Shutdown),
            Self::Status | Self::Help => None,
        }
    }
}

/// Runs the daemon until it is told to stop.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or the runtime
/// cannot be started.
pub fn execute_run(config_path: Option<&Path>) -> Result<(), WallspanError> {
    let loaded = config::load(config_path)?;
    let services = system_services(&loaded)?;
    let custom_path = config_path.map(Path::to_path_buf);

    tracing::info!(
        mode = %loaded.config.mode,
        interval = loaded.config.interval,
        "Starting WallSpan"
    );

    let runtime = runtime()?;
    let result = runtime.block_on(async move {
        let (controller, handle) =
            Controller::new(services, loaded.config.clone(), RotationFiles::in_data_dir());
        let controller =
            controller.with_reloader(Box::new(move || reload(custom_path.as_deref())));
        let mut task = controller.spawn();

        if let Some(path) = loaded.path {
            watch_config(path, handle.clone());
        }
        spawn_stdin_reader(handle.clone());

        tokio::select! {
            result = &mut task => {
                result.map_err(|err| WallspanError::CommandError(err.to_string()))
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(err) = signal {
                    tracing::warn!(error = %err, "Failed to listen for Ctrl-C");
                }
                tracing::info!("Shutting down");
                if handle.send_async(ControlMessage::Shutdown).await.is_ok() {
                    if let Err(err) = task.await {
                        tracing::debug!(error = %err, "Controller task ended abnormally");
                    }
                }
                Ok(())
            }
        }
    });

    runtime.shutdown_background();
    result
}

fn reload(
    custom_path: Option<&Path>,
) -> Result<Reconfigured<UnsplashClient, SystemDisplays>, ControllerError> {
    let loaded = config::load(custom_path)?;
    let photos = UnsplashClient::new(loaded.access_key().unwrap_or_default())?;
    Ok(Reconfigured {
        displays: system_displays(&loaded.config),
        photos,
        config: loaded.config,
    })
}

fn watch_config(path: PathBuf, handle: ControllerHandle) {
    tracing::debug!(path = %path.display(), "Watching configuration file");
    config::watch_config_file(path, move || {
        handle.send_blocking(ControlMessage::ConfigChanged).is_ok()
    });
}

fn spawn_stdin_reader(handle: ControllerHandle) {
    spawn_named_thread("stdin", move || {
        eprintln!("{}", HELP.dimmed());

        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            let Some(command) = DaemonCommand::parse(&line) else {
                if !line.trim().is_empty() {
                    eprintln!("{}", HELP.dimmed());
                }
                continue;
            };

            match command {
                DaemonCommand::Help => eprintln!("{}", HELP.dimmed()),
                DaemonCommand::Status => match handle.status_blocking() {
                    Ok(status) => match serde_json::to_value(&status) {
                        Ok(value) => output::print_highlighted_json(&value),
                        Err(err) => eprintln!("{} {err}", "Error:".red()),
                    },
                    Err(err) => {
                        eprintln!("{} {err}", "Error:".red());
                        break;
                    }
                },
                other => {
                    let Some(message) = other.message() else {
                        continue;
                    };
                    if handle.send_blocking(message).is_err() || other == DaemonCommand::Quit {
                        break;
                    }
                }
            }
        }
        tracing::debug!("Stopped reading commands from stdin");
    });
}
