//! Desktop integration.
//!
//! Makes a local image the wallpaper of one display.

use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::geometry::DisplayInfo;

/// Errors that can occur when setting the wallpaper.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DesktopError {
    #[error("Wallpaper file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to set wallpaper: {0}")]
    SetFailed(String),

    #[error("Setting wallpapers is not supported here: {0}")]
    Unsupported(String),
}

/// How the desktop fits the image to the display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ScalingMode {
    /// Scale proportionally and clip to cover the display.
    #[default]
    Fill,
    /// Scale proportionally so the whole image is visible.
    Fit,
}

/// Something that can change the wallpaper of a display.
pub trait DesktopIntegration: Send + Sync + 'static {
    /// Called once per rotation with every display about to be set.
    fn prepare(&self, _displays: &[DisplayInfo]) {}

    /// Sets `path` as the wallpaper of `display`.
    ///
    /// # Errors
    ///
    /// Returns [`DesktopError::FileNotFound`] if `path` is missing,
    /// [`DesktopError::Unsupported`] when `display` cannot get its own image
    /// and [`DesktopError::SetFailed`] when the platform refuses.
    fn set_wallpaper(
        &self,
        path: &Path,
        display: &DisplayInfo,
        scaling: ScalingMode,
    ) -> Result<(), DesktopError>;
}

/// The running system's desktop.
///
/// On macOS each display is set individually through `NSWorkspace`. Elsewhere
/// the `wallpaper` crate sets one image for every screen, so only the first
/// display of each rotation gets its image and the others report
/// [`DesktopError::Unsupported`].
#[derive(Debug)]
pub struct SystemDesktop {
    /// Display that owns the shared wallpaper, [`NO_OWNER`] when unclaimed.
    #[cfg_attr(target_os = "macos", allow(dead_code))]
    owner: AtomicU32,
}

const NO_OWNER: u32 = u32::MAX;

impl Default for SystemDesktop {
    fn default() -> Self { Self { owner: AtomicU32::new(NO_OWNER) } }
}

impl SystemDesktop {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Claims the shared wallpaper for `display_id`. Returns `false` when
    /// another display already owns it.
    #[cfg_attr(target_os = "macos", allow(dead_code))]
    fn claim(&self, display_id: u32) -> bool {
        match self.owner.compare_exchange(NO_OWNER, display_id, Ordering::AcqRel, Ordering::Acquire) {
            Ok(_) => true,
            Err(owner) => owner == display_id,
        }
    }
}

impl DesktopIntegration for SystemDesktop {
    fn prepare(&self, displays: &[DisplayInfo]) {
        let owner = displays.first().map_or(NO_OWNER, |d| d.id);
        self.owner.store(owner, Ordering::Release);
    }

    fn set_wallpaper(
        &self,
        path: &Path,
        display: &DisplayInfo,
        scaling: ScalingMode,
    ) -> Result<(), DesktopError> {
        if !path.exists() {
            return Err(DesktopError::FileNotFound(path.display().to_string()));
        }

        #[cfg(target_os = "macos")]
        {
            super::macos::set_desktop_image(path, display, scaling)
        }

        #[cfg(not(target_os = "macos"))]
        {
            if !self.claim(display.id) {
                let id = display.id;
                tracing::debug!(display = id, "Shared wallpaper belongs to another display");
                return Err(DesktopError::Unsupported(format!(
                    "display {id} shares the wallpaper of another display"
                )));
            }
            set_shared_wallpaper(path, scaling)
        }
    }
}

#[cfg(not(target_os = "macos"))]
fn set_shared_wallpaper(path: &Path, scaling: ScalingMode) -> Result<(), DesktopError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| DesktopError::SetFailed(format!("non UTF-8 path: {}", path.display())))?;

    wallpaper::set_from_path(path_str).map_err(|e| DesktopError::SetFailed(e.to_string()))?;

    let mode = match scaling {
        ScalingMode::Fill => wallpaper::Mode::Crop,
        ScalingMode::Fit => wallpaper::Mode::Fit,
    };
    if let Err(err) = wallpaper::set_mode(mode) {
        tracing::debug!(error = %err, "Failed to set wallpaper scaling mode");
    }

    Ok(())
}
