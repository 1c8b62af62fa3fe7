//! Error types for WallSpan.
//!
//! Module errors are converted into [`WallspanError`] at the CLI boundary.

use thiserror::Error;

use crate::config::ConfigError;
use crate::unsplash::PhotoSourceError;
use crate::wallpaper::controller::ControllerError;
use crate::wallpaper::desktop::DesktopError;
use crate::wallpaper::processing::ProcessingError;
use crate::wallpaper::rotation::RotationError;

/// Errors that can occur during application execution.
#[derive(Debug, Error)]
pub enum WallspanError {
    /// Invalid command arguments.
    #[error("{0}")]
    InvalidArguments(String),
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// Photo source error.
    #[error("Unsplash error: {0}")]
    PhotoError(String),
    /// Wallpaper operation failed.
    #[error("Wallpaper error: {0}")]
    WallpaperError(String),
    /// Storage operation failed.
    #[error("Storage error: {0}")]
    StorageError(String),
    /// IO error.
    #[error("IO error: {0}")]
    IoError(String),
    /// Generic command error.
    #[error("{0}")]
    CommandError(String),
}

impl From<std::io::Error> for WallspanError {
    fn from(err: std::io::Error) -> Self { Self::IoError(err.to_string()) }
}

impl From<serde_json::Error> for WallspanError {
    fn from(err: serde_json::Error) -> Self { Self::CommandError(err.to_string()) }
}

impl From<String> for WallspanError {
    fn from(msg: String) -> Self { Self::CommandError(msg) }
}

impl From<&str> for WallspanError {
    fn from(msg: &str) -> Self { Self::CommandError(msg.to_string()) }
}

impl From<ConfigError> for WallspanError {
    fn from(err: ConfigError) -> Self { Self::ConfigError(err.to_string()) }
}

impl From<PhotoSourceError> for WallspanError {
    fn from(err: PhotoSourceError) -> Self { Self::PhotoError(err.to_string()) }
}

impl From<ProcessingError> for WallspanError {
    fn from(err: ProcessingError) -> Self { Self::WallpaperError(err.to_string()) }
}

impl From<DesktopError> for WallspanError {
    fn from(err: DesktopError) -> Self { Self::WallpaperError(err.to_string()) }
}

impl From<RotationError> for WallspanError {
    fn from(err: RotationError) -> Self { Self::StorageError(err.to_string()) }
}

impl From<ControllerError> for WallspanError {
    fn from(err: ControllerError) -> Self {
        match err {
            ControllerError::Config(err) => err.into(),
            ControllerError::PhotoSource(err) => err.into(),
            ControllerError::Rotation(err) => err.into(),
            other => Self::WallpaperError(other.to_string()),
        }
    }
}
