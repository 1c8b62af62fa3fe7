//! Display enumeration.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::geometry::{DisplayInfo, VerticalAxis};

/// Reports the connected displays.
pub trait DisplayEnumerator: Send + Sync + 'static {
    /// Snapshot of every display in enumeration order.
    fn list_displays(&self) -> Vec<DisplayInfo>;

    /// Y convention of the frames returned by [`Self::list_displays`].
    fn vertical_axis(&self) -> VerticalAxis;
}

/// A display declared in the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DisplayLayout {
    /// Display identifier passed to the desktop integration. Must be unique.
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Density factor, defaults to 1.0.
    #[serde(default = "default_scale")]
    pub scale: f64,
}

const fn default_scale() -> f64 { 1.0 }

impl From<&DisplayLayout> for DisplayInfo {
    fn from(layout: &DisplayLayout) -> Self {
        Self::new(layout.id, layout.x, layout.y, layout.width, layout.height, layout.scale)
    }
}

/// Displays declared in the configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredDisplays {
    displays: Vec<DisplayInfo>,
    axis: VerticalAxis,
}

impl ConfiguredDisplays {
    #[must_use]
    pub fn new(layouts: &[DisplayLayout], axis: VerticalAxis) -> Self {
        Self {
            displays: layouts.iter().map(DisplayInfo::from).collect(),
            axis,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.displays.is_empty() }
}

impl DisplayEnumerator for ConfiguredDisplays {
    fn list_displays(&self) -> Vec<DisplayInfo> { self.displays.clone() }

    fn vertical_axis(&self) -> VerticalAxis { self.axis }
}

/// Displays reported by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeDisplays;

impl DisplayEnumerator for NativeDisplays {
    fn list_displays(&self) -> Vec<DisplayInfo> {
        #[cfg(target_os = "macos")]
        {
            super::macos::native_displays()
        }

        #[cfg(not(target_os = "macos"))]
        {
            tracing::warn!("Display enumeration is unavailable here; declare `displays` in the config");
            Vec::new()
        }
    }

    fn vertical_axis(&self) -> VerticalAxis { VerticalAxis::Up }
}

/// The configured layout when one is declared, otherwise the native displays.
#[derive(Debug, Clone, Default)]
pub struct SystemDisplays {
    configured: ConfiguredDisplays,
}

impl SystemDisplays {
    #[must_use]
    pub fn new(layouts: &[DisplayLayout], axis: VerticalAxis) -> Self {
        Self { configured: ConfiguredDisplays::new(layouts, axis) }
    }

    /// Returns whether the configured layout is in use.
    #[must_use]
    pub fn uses_configured(&self) -> bool { !self.configured.is_empty() }
}

impl DisplayEnumerator for SystemDisplays {
    fn list_displays(&self) -> Vec<DisplayInfo> {
        if self.uses_configured() {
            self.configured.list_displays()
        } else {
            NativeDisplays.list_displays()
        }
    }

    fn vertical_axis(&self) -> VerticalAxis {
        if self.uses_configured() {
            self.configured.vertical_axis()
        } else {
            NativeDisplays.vertical_axis()
        }
    }
}
