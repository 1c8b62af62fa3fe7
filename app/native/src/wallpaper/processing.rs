//! Image spanning.
//!
//! Turns one source photo into a set of per-display rasters: the photo is
//! aspect-filled onto a canvas covering the whole virtual desktop, then each
//! display's footprint is cut out and resampled to the display's native
//! resolution.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use rayon::prelude::*;

use super::geometry::{
    DisplayInfo, PixelRect, VerticalAxis, VirtualDesktopBounds, canvas_rect, compute_bounds,
};

/// Canvas pixels per desktop point.
pub const RENDER_MULTIPLIER: f64 = 2.0;

/// JPEG quality used for rendered slices.
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// Resampling filter for the fill scale and the native resize.
const RESAMPLE_FILTER: FilterType = FilterType::CatmullRom;

/// Errors that can occur while spanning an image.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProcessingError {
    /// No display was supplied.
    #[error("No displays connected")]
    NoDisplays,

    /// The desktop has no area to render into.
    #[error("Virtual desktop has zero area")]
    EmptyDesktop,

    /// The source bytes could not be decoded.
    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    /// A raster could not be encoded.
    #[error("Failed to encode image: {0}")]
    EncodeFailed(String),

    /// A display's footprint does not intersect the canvas.
    #[error("Display {index} lies outside the canvas")]
    SliceOutsideCanvas { index: usize },
}

/// Tunables for a span operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpanOptions {
    /// Canvas pixels per desktop point.
    pub render_multiplier: f64,
    /// JPEG quality of the encoded slices.
    pub jpeg_quality: u8,
    /// Y convention of the display snapshot.
    pub axis: VerticalAxis,
}

impl Default for SpanOptions {
    fn default() -> Self {
        Self {
            render_multiplier: RENDER_MULTIPLIER,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            axis: VerticalAxis::default(),
        }
    }
}

// ============================================================================
// Planning
// ============================================================================

/// Where one display's slice comes from and how large it ends up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlicePlan {
    /// Position of the display in enumeration order.
    pub index: usize,
    pub display: DisplayInfo,
    /// Crop rectangle on the canvas, `None` when it misses the canvas entirely.
    pub crop: Option<PixelRect>,
    pub native_width: u32,
    pub native_height: u32,
}

impl SlicePlan {
    /// Returns whether the crop must be resampled to reach native size.
    #[must_use]
    pub fn needs_resize(&self) -> bool {
        self.crop
            .is_some_and(|c| (c.width, c.height) != (self.native_width, self.native_height))
    }
}

/// Geometry of a multi-display span, computed without touching pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanPlan {
    pub bounds: VirtualDesktopBounds,
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Uniform fill factor applied to the source.
    pub scale: f64,
    pub scaled_width: u32,
    pub scaled_height: u32,
    /// Top-left corner of the centered canvas inside the scaled source.
    pub offset_x: u32,
    pub offset_y: u32,
    pub slices: Vec<SlicePlan>,
}

impl SpanPlan {
    /// Longest canvas edge, used as the download width for span mode.
    #[must_use]
    pub fn max_canvas_dimension(&self) -> u32 { self.canvas_width.max(self.canvas_height) }
}

/// Computes the canvas size for a set of displays.
///
/// # Errors
///
/// Returns [`ProcessingError::NoDisplays`] for an empty set and
/// [`ProcessingError::EmptyDesktop`] when the bounds have no area.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn canvas_size(
    displays: &[DisplayInfo],
    multiplier: f64,
) -> Result<(VirtualDesktopBounds, u32, u32), ProcessingError> {
    let bounds = compute_bounds(displays)?;
    let width = (bounds.width() * multiplier).floor().max(0.0) as u32;
    let height = (bounds.height() * multiplier).floor().max(0.0) as u32;

    if width == 0 || height == 0 {
        return Err(ProcessingError::EmptyDesktop);
    }

    Ok((bounds, width, height))
}

/// Plans a span of a `source_width × source_height` image over `displays`.
///
/// # Errors
///
/// Fails when there are no displays, the desktop has no area, or the source
/// has a zero dimension.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn plan_span(
    source_width: u32,
    source_height: u32,
    displays: &[DisplayInfo],
    options: &SpanOptions,
) -> Result<SpanPlan, ProcessingError> {
    if source_width == 0 || source_height == 0 {
        return Err(ProcessingError::DecodeFailed("source image is empty".to_string()));
    }

    let multiplier = options.render_multiplier;
    let (bounds, canvas_width, canvas_height) = canvas_size(displays, multiplier)?;

    let scale_x = f64::from(canvas_width) / f64::from(source_width);
    let scale_y = f64::from(canvas_height) / f64::from(source_height);
    let scale = scale_x.max(scale_y);

    let scaled_width = ((f64::from(source_width) * scale).ceil() as u32).max(canvas_width);
    let scaled_height = ((f64::from(source_height) * scale).ceil() as u32).max(canvas_height);

    let slices = displays
        .iter()
        .enumerate()
        .map(|(index, display)| {
            let (native_width, native_height) = display.native_size();
            SlicePlan {
                index,
                display: *display,
                crop: canvas_rect(display, &bounds, options.axis, multiplier)
                    .clip(canvas_width, canvas_height),
                native_width,
                native_height,
            }
        })
        .collect();

    Ok(SpanPlan {
        bounds,
        canvas_width,
        canvas_height,
        scale,
        scaled_width,
        scaled_height,
        offset_x: (scaled_width - canvas_width) / 2,
        offset_y: (scaled_height - canvas_height) / 2,
        slices,
    })
}

// ============================================================================
// Rendering
// ============================================================================

/// An encoded slice ready to be written to disk.
#[derive(Debug, Clone)]
pub struct RenderedSlice {
    pub index: usize,
    pub display: DisplayInfo,
    pub width: u32,
    pub height: u32,
    /// JPEG bytes.
    pub bytes: Vec<u8>,
}

/// A display that received no slice, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSlice {
    pub index: usize,
    pub display: DisplayInfo,
    pub reason: ProcessingError,
}

/// Result of a span operation.
#[derive(Debug, Clone, Default)]
pub struct SpanOutput {
    /// Slices in display enumeration order.
    pub rendered: Vec<RenderedSlice>,
    pub skipped: Vec<SkippedSlice>,
}

impl SpanOutput {
    /// Returns whether every display received a slice.
    #[must_use]
    pub fn is_complete(&self) -> bool { self.skipped.is_empty() }

    /// One-line summary of the skipped displays, if any.
    #[must_use]
    pub fn skipped_summary(&self) -> Option<String> {
        if self.skipped.is_empty() {
            return None;
        }
        let parts: Vec<String> = self
            .skipped
            .iter()
            .map(|s| format!("display {} ({})", s.display.id, s.reason))
            .collect();
        Some(format!("Skipped {}", parts.join(", ")))
    }
}

/// Decodes an encoded image.
///
/// # Errors
///
/// Returns [`ProcessingError::DecodeFailed`] when the format is unknown or
/// the data is corrupt.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, ProcessingError> {
    image::load_from_memory(bytes).map_err(|e| ProcessingError::DecodeFailed(e.to_string()))
}

/// Encodes an image as JPEG.
///
/// # Errors
///
/// Returns [`ProcessingError::EncodeFailed`] if the encoder rejects the image.
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, ProcessingError> {
    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
    img.to_rgb8()
        .write_with_encoder(encoder)
        .map_err(|e| ProcessingError::EncodeFailed(e.to_string()))?;
    Ok(buffer)
}

/// Aspect-fills the source onto the planned canvas.
fn compose_canvas(source: &DynamicImage, plan: &SpanPlan) -> DynamicImage {
    let scaled = if source.dimensions() == (plan.scaled_width, plan.scaled_height) {
        source.clone()
    } else {
        source.resize_exact(plan.scaled_width, plan.scaled_height, RESAMPLE_FILTER)
    };

    scaled.crop_imm(plan.offset_x, plan.offset_y, plan.canvas_width, plan.canvas_height)
}

fn render_slice(
    canvas: &DynamicImage,
    slice: &SlicePlan,
    quality: u8,
) -> Result<RenderedSlice, ProcessingError> {
    let crop = slice.crop.ok_or(ProcessingError::SliceOutsideCanvas { index: slice.index })?;

    let mut raster = canvas.crop_imm(crop.x, crop.y, crop.width, crop.height);
    if slice.needs_resize() && slice.native_width > 0 && slice.native_height > 0 {
        raster = raster.resize_exact(slice.native_width, slice.native_height, RESAMPLE_FILTER);
    }

    let (width, height) = raster.dimensions();
    Ok(RenderedSlice {
        index: slice.index,
        display: slice.display,
        width,
        height,
        bytes: encode_jpeg(&raster, quality)?,
    })
}

/// Produces one encoded raster per display from a single source image.
///
/// A single display receives the source re-encoded at its own dimensions.
/// With several displays the source is composited onto a desktop-wide canvas
/// and sliced. Slices that cannot be produced are reported in
/// [`SpanOutput::skipped`] and the other displays are still rendered.
///
/// # Errors
///
/// Returns an error when there are no displays or the plan cannot be built.
pub fn span_across_displays(
    source: &DynamicImage,
    displays: &[DisplayInfo],
    options: &SpanOptions,
) -> Result<SpanOutput, ProcessingError> {
    let Some(first) = displays.first() else {
        return Err(ProcessingError::NoDisplays);
    };

    if displays.len() == 1 {
        let (width, height) = source.dimensions();
        let mut output = SpanOutput::default();
        match encode_jpeg(source, options.jpeg_quality) {
            Ok(bytes) => output.rendered.push(RenderedSlice {
                index: 0,
                display: *first,
                width,
                height,
                bytes,
            }),
            Err(reason) => output.skipped.push(SkippedSlice { index: 0, display: *first, reason }),
        }
        return Ok(output);
    }

    let (source_width, source_height) = source.dimensions();
    let plan = plan_span(source_width, source_height, displays, options)?;

    tracing::debug!(
        canvas_width = plan.canvas_width,
        canvas_height = plan.canvas_height,
        scale = plan.scale,
        displays = displays.len(),
        "Compositing span canvas"
    );

    let canvas = compose_canvas(source, &plan);

    let results: Vec<(SlicePlan, Result<RenderedSlice, ProcessingError>)> = plan
        .slices
        .par_iter()
        .map(|slice| (*slice, render_slice(&canvas, slice, options.jpeg_quality)))
        .collect();

    let mut output = SpanOutput::default();
    for (slice, result) in results {
        match result {
            Ok(rendered) => output.rendered.push(rendered),
            Err(reason) => {
                tracing::warn!(
                    index = slice.index,
                    display = slice.display.id,
                    error = %reason,
                    "Skipping display slice"
                );
                output.skipped.push(SkippedSlice {
                    index: slice.index,
                    display: slice.display,
                    reason,
                });
            }
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};

    use super::*;

    fn solid(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
    }

    fn two_side_by_side() -> Vec<DisplayInfo> {
        vec![
            DisplayInfo::new(1, 0.0, 0.0, 1920.0, 1080.0, 1.0),
            DisplayInfo::new(2, 1920.0, 0.0, 1920.0, 1080.0, 2.0),
        ]
    }

    // ========================================================================
    // plan_span tests
    // ========================================================================

    #[test]
    fn test_plan_span_two_displays_mixed_density() {
        let plan = plan_span(3840, 2160, &two_side_by_side(), &SpanOptions::default()).unwrap();

        assert_eq!(
            plan.bounds,
            VirtualDesktopBounds { min_x: 0.0, min_y: 0.0, max_x: 3840.0, max_y: 1080.0 }
        );
        assert_eq!((plan.canvas_width, plan.canvas_height), (7680, 2160));
        assert!((plan.scale - 2.0).abs() < 1e-9);
        assert_eq!((plan.scaled_width, plan.scaled_height), (7680, 4320));
        assert_eq!((plan.offset_x, plan.offset_y), (0, 1080));

        let second = plan.slices[1];
        assert_eq!(second.crop, Some(PixelRect { x: 3840, y: 0, width: 3840, height: 2160 }));
        assert_eq!((second.native_width, second.native_height), (3840, 2160));
        assert!(!second.needs_resize(), "Retina slice already matches native size");

        let first = plan.slices[0];
        assert_eq!(first.crop, Some(PixelRect { x: 0, y: 0, width: 3840, height: 2160 }));
        assert!(first.needs_resize(), "1x slice must be downsampled");
    }

    #[test]
    fn test_plan_span_scaled_source_covers_canvas() {
        let sources = [(1000, 3000), (5000, 200), (7679, 2159), (1, 1)];
        for (w, h) in sources {
            let plan = plan_span(w, h, &two_side_by_side(), &SpanOptions::default()).unwrap();
            assert!(plan.scaled_width >= plan.canvas_width, "{w}x{h} too narrow");
            assert!(plan.scaled_height >= plan.canvas_height, "{w}x{h} too short");
            assert!(plan.offset_x + plan.canvas_width <= plan.scaled_width);
            assert!(plan.offset_y + plan.canvas_height <= plan.scaled_height);
        }
    }

    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn test_plan_span_crops_reconstruct_display_footprints() {
        let displays = vec![
            DisplayInfo::new(1, 0.0, 0.0, 2560.0, 1440.0, 2.0),
            DisplayInfo::new(2, -1080.0, -300.0, 1080.0, 1920.0, 1.0),
            DisplayInfo::new(3, 2560.0, 360.0, 1920.0, 1080.0, 1.0),
        ];
        let options = SpanOptions { axis: VerticalAxis::Down, ..SpanOptions::default() };
        let plan = plan_span(4000, 3000, &displays, &options).unwrap();
        let m = options.render_multiplier;

        for slice in &plan.slices {
            let crop = slice.crop.unwrap();
            let x = f64::from(crop.x) / m + plan.bounds.min_x;
            let y = f64::from(crop.y) / m + plan.bounds.min_y;
            assert!((x - slice.display.x).abs() < 1.0, "x of display {}", slice.display.id);
            assert!((y - slice.display.y).abs() < 1.0, "y of display {}", slice.display.id);
            assert!((f64::from(crop.width) / m - slice.display.width).abs() < 1.0);
            assert!((f64::from(crop.height) / m - slice.display.height).abs() < 1.0);
        }
    }

    #[test]
    fn test_plan_span_rejects_empty_inputs() {
        let opts = SpanOptions::default();
        assert_eq!(plan_span(100, 100, &[], &opts), Err(ProcessingError::NoDisplays));
        assert!(matches!(
            plan_span(0, 100, &two_side_by_side(), &opts),
            Err(ProcessingError::DecodeFailed(_))
        ));

        let flat = [DisplayInfo::new(1, 0.0, 0.0, 0.0, 0.0, 1.0); 2];
        assert_eq!(plan_span(100, 100, &flat, &opts), Err(ProcessingError::EmptyDesktop));
    }

    #[test]
    fn test_max_canvas_dimension() {
        let plan = plan_span(3840, 2160, &two_side_by_side(), &SpanOptions::default()).unwrap();
        assert_eq!(plan.max_canvas_dimension(), 7680);
    }

    // ========================================================================
    // span_across_displays tests
    // ========================================================================

    #[test]
    fn test_span_no_displays_fails() {
        let result = span_across_displays(&solid(4, 4, [0, 0, 0]), &[], &SpanOptions::default());
        assert!(matches!(result, Err(ProcessingError::NoDisplays)));
    }

    #[test]
    fn test_span_single_display_keeps_source_dimensions() {
        let source = solid(40, 30, [10, 200, 30]);
        let displays = [DisplayInfo::new(7, 0.0, 0.0, 1920.0, 1080.0, 2.0)];

        let output = span_across_displays(&source, &displays, &SpanOptions::default()).unwrap();

        assert!(output.is_complete());
        assert_eq!(output.rendered.len(), 1);
        let slice = &output.rendered[0];
        assert_eq!((slice.width, slice.height), (40, 30));
        assert_eq!(slice.display.id, 7);

        let decoded = decode_image(&slice.bytes).unwrap();
        assert_eq!(decoded.dimensions(), (40, 30), "No compositing for a single display");
    }

    #[test]
    fn test_span_stacked_displays_get_their_own_half() {
        // Bottom-left origin: display 2 sits directly above display 1.
        let displays = [
            DisplayInfo::new(1, 0.0, 0.0, 4.0, 2.0, 2.0),
            DisplayInfo::new(2, 0.0, 2.0, 4.0, 2.0, 2.0),
        ];
        let options = SpanOptions { axis: VerticalAxis::Up, jpeg_quality: 100, ..Default::default() };

        // 8x8 canvas: top half red, bottom half blue.
        let source = DynamicImage::ImageRgb8(RgbImage::from_fn(8, 8, |_, y| {
            if y < 4 { Rgb([255, 0, 0]) } else { Rgb([0, 0, 255]) }
        }));

        let output = span_across_displays(&source, &displays, &options).unwrap();
        assert!(output.is_complete());
        assert_eq!(output.rendered.len(), 2);

        let bottom = decode_image(&output.rendered[0].bytes).unwrap().to_rgb8();
        let top = decode_image(&output.rendered[1].bytes).unwrap().to_rgb8();
        assert_eq!(top.dimensions(), (8, 4));

        let top_px = top.get_pixel(4, 2);
        let bottom_px = bottom.get_pixel(4, 2);
        assert!(top_px[0] > 200 && top_px[2] < 60, "Upper display should be red: {top_px:?}");
        assert!(
            bottom_px[2] > 200 && bottom_px[0] < 60,
            "Lower display should be blue: {bottom_px:?}"
        );
    }

    #[test]
    fn test_span_resamples_to_native_size() {
        let displays = [
            DisplayInfo::new(1, 0.0, 0.0, 8.0, 4.0, 1.0),
            DisplayInfo::new(2, 8.0, 0.0, 8.0, 4.0, 2.0),
        ];
        let output =
            span_across_displays(&solid(64, 16, [90, 90, 90]), &displays, &SpanOptions::default())
                .unwrap();

        assert_eq!((output.rendered[0].width, output.rendered[0].height), (8, 4));
        assert_eq!((output.rendered[1].width, output.rendered[1].height), (16, 8));
    }

    #[test]
    fn test_span_keeps_enumeration_order() {
        let displays: Vec<DisplayInfo> = (0..4u32)
            .map(|i| DisplayInfo::new(i + 10, f64::from(i) * 4.0, 0.0, 4.0, 4.0, 1.0))
            .collect();
        let output =
            span_across_displays(&solid(32, 8, [1, 2, 3]), &displays, &SpanOptions::default())
                .unwrap();

        let ids: Vec<u32> = output.rendered.iter().map(|s| s.display.id).collect();
        assert_eq!(ids, vec![10, 11, 12, 13]);
        let indices: Vec<usize> = output.rendered.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_skipped_summary_lists_displays() {
        let display = DisplayInfo::new(5, 0.0, 0.0, 1.0, 1.0, 1.0);
        let output = SpanOutput {
            rendered: Vec::new(),
            skipped: vec![SkippedSlice {
                index: 1,
                display,
                reason: ProcessingError::SliceOutsideCanvas { index: 1 },
            }],
        };
        let summary = output.skipped_summary().unwrap();
        assert!(summary.contains("display 5"));
        assert!(summary.contains("outside the canvas"));
        assert!(SpanOutput::default().skipped_summary().is_none());
    }

    // ========================================================================
    // Codec tests
    // ========================================================================

    #[test]
    fn test_decode_garbage_fails() {
        let result = decode_image(b"definitely not an image");
        assert!(matches!(result, Err(ProcessingError::DecodeFailed(_))));
    }

    #[test]
    fn test_encode_jpeg_produces_jpeg_magic() {
        let bytes = encode_jpeg(&solid(16, 16, [255, 255, 255]), DEFAULT_JPEG_QUALITY).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_processing_error_display() {
        assert_eq!(ProcessingError::NoDisplays.to_string(), "No displays connected");
        assert!(
            ProcessingError::DecodeFailed("bad header".to_string())
                .to_string()
                .contains("bad header")
        );
    }
}
