//! macOS display enumeration and wallpaper setting.
//!
//! Thin wrappers over `NSScreen` and `NSWorkspace`. Screen frames are
//! reported exactly as AppKit returns them, with a bottom-left origin.

use std::ffi::CStr;
use std::path::Path;

use objc::runtime::{BOOL, Class, NO, Object, YES};
use objc::{msg_send, sel, sel_impl};

use super::desktop::{DesktopError, ScalingMode};
use super::geometry::DisplayInfo;

/// `NSImageScaleProportionallyUpOrDown`.
const SCALE_PROPORTIONALLY_UP_OR_DOWN: u64 = 3;

/// `NSUTF8StringEncoding`.
const UTF8_ENCODING: u64 = 4;

#[link(name = "AppKit", kind = "framework")]
unsafe extern "C" {
    static NSWorkspaceDesktopImageScalingKey: *mut Object;
    static NSWorkspaceDesktopImageAllowClippingKey: *mut Object;
}

// ============================================================================
// Objective-C Type Definitions
// ============================================================================

#[repr(C)]
#[derive(Debug, Copy, Clone)]
struct NSRect {
    origin: NSPoint,
    size: NSSize,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
struct NSPoint {
    x: f64,
    y: f64,
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
struct NSSize {
    width: f64,
    height: f64,
}

// ============================================================================
// Screens
// ============================================================================

/// Returns every connected screen in `NSScreen.screens` order.
///
/// The first entry is the screen with the menu bar. Returns an empty vector
/// if AppKit is unavailable.
#[must_use]
pub fn native_displays() -> Vec<DisplayInfo> {
    unsafe {
        let mut displays = Vec::new();

        for screen in screen_objects() {
            let frame: NSRect = msg_send![screen, frame];
            let scale: f64 = msg_send![screen, backingScaleFactor];

            displays.push(DisplayInfo::new(
                display_id(screen),
                frame.origin.x,
                frame.origin.y,
                frame.size.width,
                frame.size.height,
                scale,
            ));
        }

        displays
    }
}

/// Returns the raw `NSScreen` pointers.
unsafe fn screen_objects() -> Vec<*mut Object> {
    let Some(screen_class) = Class::get("NSScreen") else {
        tracing::warn!("NSScreen class unavailable");
        return Vec::new();
    };

    unsafe {
        let screens: *mut Object = msg_send![screen_class, screens];
        if screens.is_null() {
            return Vec::new();
        }

        let count: usize = msg_send![screens, count];
        (0..count)
            .map(|i| -> *mut Object { msg_send![screens, objectAtIndex: i] })
            .filter(|screen| !screen.is_null())
            .collect()
    }
}

/// Reads `NSScreenNumber` from the screen's device description.
///
/// # Safety
///
/// `screen` must be a valid `NSScreen` pointer.
unsafe fn display_id(screen: *mut Object) -> u32 {
    unsafe {
        let description: *mut Object = msg_send![screen, deviceDescription];
        if description.is_null() {
            return 0;
        }

        let key = nsstring("NSScreenNumber");
        if key.is_null() {
            return 0;
        }

        let number: *mut Object = msg_send![description, objectForKey: key];
        if number.is_null() {
            return 0;
        }

        msg_send![number, unsignedIntValue]
    }
}

unsafe fn nsstring(s: &str) -> *mut Object {
    let Some(string_class) = Class::get("NSString") else {
        return std::ptr::null_mut();
    };

    unsafe {
        let alloc: *mut Object = msg_send![string_class, alloc];
        let string: *mut Object =
            msg_send![alloc, initWithBytes:s.as_ptr() length:s.len() encoding:UTF8_ENCODING];
        if string.is_null() {
            return string;
        }
        msg_send![string, autorelease]
    }
}

// ============================================================================
// Wallpaper
// ============================================================================

/// Sets `path` as the desktop image of the screen with `display.id`.
///
/// # Errors
///
/// Returns [`DesktopError::SetFailed`] if the screen is gone or AppKit
/// rejects the image.
pub fn set_desktop_image(
    path: &Path,
    display: &DisplayInfo,
    scaling: ScalingMode,
) -> Result<(), DesktopError> {
    unsafe {
        let Some(screen) = screen_objects().into_iter().find(|s| display_id(*s) == display.id)
        else {
            return Err(DesktopError::SetFailed(format!(
                "display {} is not connected",
                display.id
            )));
        };

        let workspace_class = class("NSWorkspace")?;
        let workspace: *mut Object = msg_send![workspace_class, sharedWorkspace];
        if workspace.is_null() {
            return Err(DesktopError::SetFailed("no shared workspace".to_string()));
        }

        let url_class = class("NSURL")?;
        let path_ns = nsstring(&path.display().to_string());
        let url: *mut Object = msg_send![url_class, fileURLWithPath: path_ns];
        if url.is_null() {
            return Err(DesktopError::SetFailed("failed to create file URL".to_string()));
        }

        let options = desktop_options(scaling)?;
        let mut error: *mut Object = std::ptr::null_mut();

        let success: bool = msg_send![workspace, setDesktopImageURL:url forScreen:screen options:options error:&mut error];
        if success {
            Ok(())
        } else {
            Err(DesktopError::SetFailed(describe_error(error)))
        }
    }
}

fn class(name: &str) -> Result<&'static Class, DesktopError> {
    Class::get(name).ok_or_else(|| DesktopError::SetFailed(format!("{name} class unavailable")))
}

/// Builds the options dictionary for `setDesktopImageURL:forScreen:options:error:`.
unsafe fn desktop_options(scaling: ScalingMode) -> Result<*mut Object, DesktopError> {
    let number_class = class("NSNumber")?;
    let dictionary_class = class("NSDictionary")?;
    let allow_clipping: BOOL = match scaling {
        ScalingMode::Fill => YES,
        ScalingMode::Fit => NO,
    };

    unsafe {
        let scale_value: *mut Object =
            msg_send![number_class, numberWithUnsignedLongLong: SCALE_PROPORTIONALLY_UP_OR_DOWN];
        let clip_value: *mut Object = msg_send![number_class, numberWithBool: allow_clipping];

        let keys = [NSWorkspaceDesktopImageScalingKey, NSWorkspaceDesktopImageAllowClippingKey];
        let values = [scale_value, clip_value];

        let dictionary: *mut Object = msg_send![
            dictionary_class,
            dictionaryWithObjects: values.as_ptr()
            forKeys: keys.as_ptr()
            count: values.len()
        ];
        if dictionary.is_null() {
            return Err(DesktopError::SetFailed("failed to build options".to_string()));
        }
        Ok(dictionary)
    }
}

unsafe fn describe_error(error: *mut Object) -> String {
    if error.is_null() {
        return "Unknown error".to_string();
    }
    unsafe {
        let description: *mut Object = msg_send![error, localizedDescription];
        if description.is_null() {
            return "Unknown error".to_string();
        }
        let bytes: *const u8 = msg_send![description, UTF8String];
        if bytes.is_null() {
            return "Unknown error".to_string();
        }
        CStr::from_ptr(bytes.cast()).to_string_lossy().into_owned()
    }
}
