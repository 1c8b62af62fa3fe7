//! Virtual desktop geometry.
//!
//! Display placements, the bounding box that encloses them, aspect
//! classification, and the mapping from a display's footprint to a pixel
//! rectangle on the composite canvas.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::processing::ProcessingError;

/// Width/height ratio above which a desktop is considered landscape.
pub const LANDSCAPE_RATIO: f64 = 1.2;

/// Width/height ratio below which a desktop is considered portrait.
pub const PORTRAIT_RATIO: f64 = 0.833;

// ============================================================================
// Displays
// ============================================================================

/// Snapshot of one connected display.
///
/// Position and size are in virtual desktop points. `scale` is the density
/// factor (native pixels per point) and is never below 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayInfo {
    /// Platform display identifier.
    pub id: u32,
    /// X coordinate of the display origin.
    pub x: f64,
    /// Y coordinate of the display origin.
    pub y: f64,
    /// Width in points.
    pub width: f64,
    /// Height in points.
    pub height: f64,
    /// Density factor.
    pub scale: f64,
}

impl DisplayInfo {
    /// Creates a display snapshot, clamping the density factor to at least 1.0.
    #[must_use]
    pub fn new(id: u32, x: f64, y: f64, width: f64, height: f64, scale: f64) -> Self {
        Self {
            id,
            x,
            y,
            width,
            height,
            scale: if scale.is_finite() { scale.max(1.0) } else { 1.0 },
        }
    }

    /// Right edge in desktop points.
    #[must_use]
    pub fn max_x(&self) -> f64 { self.x + self.width }

    /// Far vertical edge in desktop points.
    #[must_use]
    pub fn max_y(&self) -> f64 { self.y + self.height }

    /// Native pixel dimensions (`size × scale`, rounded down).
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn native_size(&self) -> (u32, u32) {
        (
            (self.width * self.scale).floor().max(0.0) as u32,
            (self.height * self.scale).floor().max(0.0) as u32,
        )
    }
}

/// Direction in which display `y` coordinates grow.
///
/// Canvas rows are always stored top-down. When an enumerator reports
/// bottom-left origin frames (`Up`, as `NSScreen` does) the crop math flips
/// the vertical offset; when it reports top-left origin frames (`Down`) the
/// offset is used directly. Getting this wrong produces a mis-offset slice
/// with no error, so every enumerator must state its convention.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAxis {
    /// Bottom-left origin, y grows upward.
    Up,
    /// Top-left origin, y grows downward.
    #[default]
    Down,
}

// ============================================================================
// Bounds
// ============================================================================

/// Union rectangle of every display, in desktop points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualDesktopBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl VirtualDesktopBounds {
    #[must_use]
    pub fn width(&self) -> f64 { self.max_x - self.min_x }

    #[must_use]
    pub fn height(&self) -> f64 { self.max_y - self.min_y }

    /// Returns whether the display lies entirely inside these bounds.
    #[must_use]
    pub fn contains(&self, display: &DisplayInfo) -> bool {
        display.x >= self.min_x
            && display.y >= self.min_y
            && display.max_x() <= self.max_x
            && display.max_y() <= self.max_y
    }
}

/// Computes the bounding box of all displays.
///
/// # Errors
///
/// Returns [`ProcessingError::NoDisplays`] when `displays` is empty.
pub fn compute_bounds(displays: &[DisplayInfo]) -> Result<VirtualDesktopBounds, ProcessingError> {
    let (first, rest) = displays.split_first().ok_or(ProcessingError::NoDisplays)?;

    let initial = VirtualDesktopBounds {
        min_x: first.x,
        min_y: first.y,
        max_x: first.max_x(),
        max_y: first.max_y(),
    };

    Ok(rest.iter().fold(initial, |acc, d| VirtualDesktopBounds {
        min_x: acc.min_x.min(d.x),
        min_y: acc.min_y.min(d.y),
        max_x: acc.max_x.max(d.max_x()),
        max_y: acc.max_y.max(d.max_y()),
    }))
}

// ============================================================================
// Aspect
// ============================================================================

/// Framing requested from the photo source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AspectClass {
    Landscape,
    Portrait,
    NearSquare,
}

impl AspectClass {
    /// Classifies a width/height pair.
    ///
    /// A zero or negative height is treated as infinitely wide.
    #[must_use]
    pub fn from_dimensions(width: f64, height: f64) -> Self {
        if height <= 0.0 {
            return Self::Landscape;
        }
        let ratio = width / height;
        if ratio > LANDSCAPE_RATIO {
            Self::Landscape
        } else if ratio < PORTRAIT_RATIO {
            Self::Portrait
        } else {
            Self::NearSquare
        }
    }

    /// Value of the Unsplash `orientation` query parameter.
    #[must_use]
    pub const fn orientation_param(self) -> &'static str {
        match self {
            Self::Landscape => "landscape",
            Self::Portrait => "portrait",
            Self::NearSquare => "squarish",
        }
    }
}

impl std::fmt::Display for AspectClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Landscape => write!(f, "landscape"),
            Self::Portrait => write!(f, "portrait"),
            Self::NearSquare => write!(f, "near-square"),
        }
    }
}

/// Classifies the desktop described by `bounds`.
#[must_use]
pub fn classify_aspect(bounds: &VirtualDesktopBounds) -> AspectClass {
    AspectClass::from_dimensions(bounds.width(), bounds.height())
}

// ============================================================================
// Canvas rectangles
// ============================================================================

/// A display footprint in canvas pixel space, before clipping.
///
/// The origin may be negative or the rectangle may extend past the canvas
/// when the display set is inconsistent with the bounds it was measured
/// against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CanvasRect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

/// A rectangle guaranteed to lie inside a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CanvasRect {
    /// Intersects the rectangle with a `canvas_width × canvas_height` canvas.
    ///
    /// Returns `None` when nothing of the rectangle is on the canvas.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_possible_wrap)]
    pub fn clip(&self, canvas_width: u32, canvas_height: u32) -> Option<PixelRect> {
        let left = self.x.max(0);
        let top = self.y.max(0);
        let right = (self.x + i64::from(self.width)).min(i64::from(canvas_width));
        let bottom = (self.y + i64::from(self.height)).min(i64::from(canvas_height));

        if right <= left || bottom <= top {
            return None;
        }

        Some(PixelRect {
            x: left as u32,
            y: top as u32,
            width: (right - left) as u32,
            height: (bottom - top) as u32,
        })
    }
}

/// Maps a display to its rectangle on a canvas of `bounds × multiplier` pixels.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn canvas_rect(
    display: &DisplayInfo,
    bounds: &VirtualDesktopBounds,
    axis: VerticalAxis,
    multiplier: f64,
) -> CanvasRect {
    let offset_y = match axis {
        VerticalAxis::Up => bounds.height() - (display.y - bounds.min_y) - display.height,
        VerticalAxis::Down => display.y - bounds.min_y,
    };

    CanvasRect {
        x: ((display.x - bounds.min_x) * multiplier).floor() as i64,
        y: (offset_y * multiplier).floor() as i64,
        width: (display.width * multiplier).floor().max(0.0) as u32,
        height: (display.height * multiplier).floor().max(0.0) as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn display(x: f64, y: f64, w: f64, h: f64) -> DisplayInfo { DisplayInfo::new(1, x, y, w, h, 1.0) }

    // ========================================================================
    // DisplayInfo tests
    // ========================================================================

    #[test]
    fn test_display_scale_is_clamped_to_one() {
        let d = DisplayInfo::new(1, 0.0, 0.0, 100.0, 100.0, 0.5);
        assert!((d.scale - 1.0).abs() < f64::EPSILON);

        let d = DisplayInfo::new(1, 0.0, 0.0, 100.0, 100.0, f64::NAN);
        assert!((d.scale - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_native_size_multiplies_by_scale() {
        let d = DisplayInfo::new(1, 0.0, 0.0, 1920.0, 1080.0, 2.0);
        assert_eq!(d.native_size(), (3840, 2160));

        let d = DisplayInfo::new(1, 0.0, 0.0, 1512.0, 982.0, 1.5);
        assert_eq!(d.native_size(), (2268, 1473));
    }

    // ========================================================================
    // compute_bounds tests
    // ========================================================================

    #[test]
    fn test_compute_bounds_empty_fails() {
        let result = compute_bounds(&[]);
        assert!(matches!(result, Err(ProcessingError::NoDisplays)));
    }

    #[test]
    fn test_compute_bounds_single_display() {
        let bounds = compute_bounds(&[display(0.0, 0.0, 1920.0, 1080.0)]).unwrap();
        assert_eq!(
            bounds,
            VirtualDesktopBounds { min_x: 0.0, min_y: 0.0, max_x: 1920.0, max_y: 1080.0 }
        );
    }

    #[test]
    fn test_compute_bounds_side_by_side() {
        let displays = [
            display(0.0, 0.0, 1920.0, 1080.0),
            DisplayInfo::new(2, 1920.0, 0.0, 1920.0, 1080.0, 2.0),
        ];
        let bounds = compute_bounds(&displays).unwrap();
        assert!((bounds.width() - 3840.0).abs() < f64::EPSILON);
        assert!((bounds.height() - 1080.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_compute_bounds_contains_every_display() {
        let layouts: [&[DisplayInfo]; 3] = [
            &[display(0.0, 0.0, 1920.0, 1080.0), display(-1440.0, 200.0, 1440.0, 900.0)],
            &[display(0.0, 0.0, 2560.0, 1440.0), display(320.0, -1080.0, 1920.0, 1080.0)],
            &[
                display(0.0, 0.0, 1080.0, 1920.0),
                display(1080.0, 420.0, 2560.0, 1080.0),
                display(3640.0, -300.0, 1200.0, 1920.0),
            ],
        ];

        for layout in layouts {
            let bounds = compute_bounds(layout).unwrap();
            for d in layout {
                assert!(bounds.contains(d), "{d:?} should lie inside {bounds:?}");
            }
        }
    }

    #[test]
    fn test_compute_bounds_negative_origin() {
        let bounds =
            compute_bounds(&[display(0.0, 0.0, 100.0, 100.0), display(-50.0, -25.0, 10.0, 10.0)])
                .unwrap();
        assert!((bounds.min_x + 50.0).abs() < f64::EPSILON);
        assert!((bounds.min_y + 25.0).abs() < f64::EPSILON);
        assert!((bounds.max_x - 100.0).abs() < f64::EPSILON);
    }

    // ========================================================================
    // Aspect tests
    // ========================================================================

    #[test]
    fn test_classify_aspect_thresholds() {
        assert_eq!(AspectClass::from_dimensions(1.21, 1.0), AspectClass::Landscape);
        assert_eq!(AspectClass::from_dimensions(1.2, 1.0), AspectClass::NearSquare);
        assert_eq!(AspectClass::from_dimensions(1.0, 1.0), AspectClass::NearSquare);
        assert_eq!(AspectClass::from_dimensions(0.833, 1.0), AspectClass::NearSquare);
        assert_eq!(AspectClass::from_dimensions(0.832, 1.0), AspectClass::Portrait);
    }

    #[test]
    fn test_classify_aspect_of_bounds() {
        let wide = compute_bounds(&[display(0.0, 0.0, 3840.0, 1080.0)]).unwrap();
        assert_eq!(classify_aspect(&wide), AspectClass::Landscape);

        let tall = compute_bounds(&[display(0.0, 0.0, 1080.0, 1920.0)]).unwrap();
        assert_eq!(classify_aspect(&tall), AspectClass::Portrait);

        let square = compute_bounds(&[display(0.0, 0.0, 1920.0, 1920.0)]).unwrap();
        assert_eq!(classify_aspect(&square), AspectClass::NearSquare);
    }

    #[test]
    fn test_classify_aspect_zero_height_is_landscape() {
        assert_eq!(AspectClass::from_dimensions(100.0, 0.0), AspectClass::Landscape);
    }

    #[test]
    fn test_orientation_param_matches_unsplash() {
        assert_eq!(AspectClass::Landscape.orientation_param(), "landscape");
        assert_eq!(AspectClass::Portrait.orientation_param(), "portrait");
        assert_eq!(AspectClass::NearSquare.orientation_param(), "squarish");
        assert_eq!(AspectClass::NearSquare.to_string(), "near-square");
    }

    // ========================================================================
    // canvas_rect tests
    // ========================================================================

    #[test]
    fn test_canvas_rect_side_by_side() {
        let displays = [display(0.0, 0.0, 1920.0, 1080.0), display(1920.0, 0.0, 1920.0, 1080.0)];
        let bounds = compute_bounds(&displays).unwrap();

        let right = canvas_rect(&displays[1], &bounds, VerticalAxis::Up, 2.0);
        assert_eq!(right, CanvasRect { x: 3840, y: 0, width: 3840, height: 2160 });
    }

    #[test]
    fn test_canvas_rect_vertical_stack_upward_axis() {
        // Bottom-left origin: the smaller display sits above the main one.
        let main = display(0.0, 0.0, 1920.0, 1080.0);
        let above = display(320.0, 1080.0, 1280.0, 720.0);
        let bounds = compute_bounds(&[main, above]).unwrap();

        let top = canvas_rect(&above, &bounds, VerticalAxis::Up, 2.0);
        let bottom = canvas_rect(&main, &bounds, VerticalAxis::Up, 2.0);

        assert_eq!(top, CanvasRect { x: 640, y: 0, width: 2560, height: 1440 });
        assert_eq!(bottom, CanvasRect { x: 0, y: 1440, width: 3840, height: 2160 });
    }

    #[test]
    fn test_canvas_rect_vertical_stack_downward_axis() {
        // Same physical arrangement expressed with a top-left origin.
        let main = display(0.0, 0.0, 1920.0, 1080.0);
        let above = display(320.0, -720.0, 1280.0, 720.0);
        let bounds = compute_bounds(&[main, above]).unwrap();

        let top = canvas_rect(&above, &bounds, VerticalAxis::Down, 2.0);
        let bottom = canvas_rect(&main, &bounds, VerticalAxis::Down, 2.0);

        assert_eq!(top, CanvasRect { x: 640, y: 0, width: 2560, height: 1440 });
        assert_eq!(bottom, CanvasRect { x: 0, y: 1440, width: 3840, height: 2160 });
    }

    #[test]
    fn test_clip_inside_is_unchanged() {
        let rect = CanvasRect { x: 10, y: 20, width: 30, height: 40 };
        assert_eq!(rect.clip(100, 100), Some(PixelRect { x: 10, y: 20, width: 30, height: 40 }));
    }

    #[test]
    fn test_clip_partial_overlap() {
        let rect = CanvasRect { x: -10, y: 90, width: 30, height: 40 };
        assert_eq!(rect.clip(100, 100), Some(PixelRect { x: 0, y: 90, width: 20, height: 10 }));
    }

    #[test]
    fn test_clip_fully_outside() {
        assert_eq!(CanvasRect { x: 100, y: 0, width: 10, height: 10 }.clip(100, 100), None);
        assert_eq!(CanvasRect { x: -20, y: 0, width: 10, height: 10 }.clip(100, 100), None);
        assert_eq!(CanvasRect { x: 0, y: 0, width: 0, height: 10 }.clip(100, 100), None);
    }
}
