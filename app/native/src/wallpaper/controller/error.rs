use crate::config::ConfigError;
use crate::unsplash::PhotoSourceError;
use crate::wallpaper::desktop::DesktopError;
use crate::wallpaper::processing::ProcessingError;
use crate::wallpaper::rotation::RotationError;

/// Errors reported by the rotation controller.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error(transparent)]
    Processing(#[from] ProcessingError),

    #[error(transparent)]
    PhotoSource(#[from] PhotoSourceError),

    #[error(transparent)]
    Rotation(#[from] RotationError),

    #[error(transparent)]
    Desktop(#[from] DesktopError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Some displays could not be rendered and strict slicing is enabled.
    #[error("{0}")]
    SkippedSlices(String),

    /// A blocking worker panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(String),

    /// The controller task has stopped.
    #[error("Wallpaper controller is not running")]
    ActorClosed,
}

impl From<tokio::task::JoinError> for ControllerError {
    fn from(err: tokio::task::JoinError) -> Self { Self::Task(err.to_string()) }
}
