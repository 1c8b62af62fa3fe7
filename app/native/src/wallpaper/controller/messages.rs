//! Message types for the rotation controller.
//!
//! - `ControlMessage` - commands sent to the controller and completions of
//!   its background work
//! - `ControllerStatus` - snapshot returned for `ControlMessage::Status`

use std::path::PathBuf;

use serde::Serialize;
use tokio::sync::oneshot;

use super::ControllerError;
use crate::config::RotationMode;
use crate::wallpaper::history::PreviewEntry;
use crate::wallpaper::rotation::RotationFiles;

/// Messages sent to the controller.
#[derive(Debug)]
pub enum ControlMessage {
    // ════════════════════════════════════════════════════════════════════════
    // Commands
    // ════════════════════════════════════════════════════════════════════════
    /// Fetch a new photo and apply it.
    Next,

    /// Step back through the preview history.
    PreviewBack,

    /// Step forward through the preview history, fetching at the newest entry.
    PreviewForward,

    /// Apply the photo under the preview cursor.
    ApplyPreview,

    /// Pause or resume automatic rotation.
    TogglePause,

    /// The configuration file changed on disk.
    ConfigChanged,

    /// Report the current state.
    Status { respond_to: oneshot::Sender<ControllerStatus> },

    /// Stop the controller.
    Shutdown,

    // ════════════════════════════════════════════════════════════════════════
    // Completions
    // ════════════════════════════════════════════════════════════════════════
    /// A rotation finished. Hands the rotation files back to the controller.
    RotationFinished(Box<RotationOutcome>),

    /// A preview fetch finished.
    PreviewFetched(Box<Result<PreviewEntry, ControllerError>>),
}

/// Result of a background rotation.
#[derive(Debug)]
pub struct RotationOutcome {
    pub files: RotationFiles,
    pub result: Result<RotationReport, ControllerError>,
}

/// What a successful rotation applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotationReport {
    /// Attribution of the applied photo(s).
    pub credit: Option<String>,
    /// Files that became wallpapers, in display order.
    pub applied: Vec<PathBuf>,
    /// Displays that were skipped, if any.
    pub warning: Option<String>,
}

/// Snapshot of the controller state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerStatus {
    pub busy: bool,
    pub paused: bool,
    pub mode: RotationMode,
    pub credit: Option<String>,
    pub last_error: Option<String>,
    pub history_len: usize,
    pub history_cursor: Option<usize>,
    /// Attribution of the photo under the preview cursor.
    pub preview: Option<String>,
}

impl ControlMessage {
    /// Short name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Next => "Next",
            Self::PreviewBack => "PreviewBack",
            Self::PreviewForward => "PreviewForward",
            Self::ApplyPreview => "ApplyPreview",
            Self::TogglePause => "TogglePause",
            Self::ConfigChanged => "ConfigChanged",
            Self::Status { .. } => "Status",
            Self::Shutdown => "Shutdown",
            Self::RotationFinished(_) => "RotationFinished",
            Self::PreviewFetched(_) => "PreviewFetched",
        }
    }
}
