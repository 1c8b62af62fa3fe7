//! Multi-display wallpaper spanning.
//!
//! - `geometry` - display rectangles, virtual desktop bounds, aspect classes
//! - `processing` - compositing one image across every display
//! - `history` - preview history with back/forward navigation
//! - `rotation` - tagged wallpaper files on disk
//! - `screens` / `desktop` - display enumeration and wallpaper setting
//! - `controller` - the actor that ties it all together

pub mod controller;
pub mod desktop;
pub mod geometry;
pub mod history;
#[cfg(target_os = "macos")]
mod macos;
pub mod processing;
pub mod rotation;
pub mod screens;

pub use controller::{ControlMessage, Controller, ControllerError, ControllerHandle, Services};
pub use desktop::{DesktopIntegration, ScalingMode, SystemDesktop};
pub use geometry::{AspectClass, DisplayInfo, VerticalAxis, VirtualDesktopBounds};
pub use screens::{DisplayEnumerator, SystemDisplays};
