//! End-to-end tests for spanning one image across several displays.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use wallspan_lib::wallpaper::geometry::{
    AspectClass, DisplayInfo, PixelRect, VerticalAxis, classify_aspect,
};
use wallspan_lib::wallpaper::processing::{SpanOptions, decode_image, plan_span, span_across_displays};

fn png_bytes(image: &DynamicImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
    bytes
}

/// Left half red, right half blue.
fn split_image(width: u32, height: u32) -> DynamicImage {
    let image = RgbImage::from_fn(width, height, |x, _| {
        if x < width / 2 { Rgb([255, 0, 0]) } else { Rgb([0, 0, 255]) }
    });
    DynamicImage::ImageRgb8(image)
}

fn at_one_x() -> SpanOptions { SpanOptions { render_multiplier: 1.0, ..SpanOptions::default() } }

// ============================================================================
// Planning
// ============================================================================

#[test]
fn test_mixed_density_pair_plan() {
    let displays = [
        DisplayInfo::new(1, 0.0, 0.0, 1920.0, 1080.0, 1.0),
        DisplayInfo::new(2, 1920.0, 0.0, 1920.0, 1080.0, 2.0),
    ];

    let plan = plan_span(3840, 2160, &displays, &SpanOptions::default()).unwrap();

    assert!((plan.bounds.min_x).abs() < f64::EPSILON);
    assert!((plan.bounds.max_x - 3840.0).abs() < f64::EPSILON);
    assert!((plan.bounds.max_y - 1080.0).abs() < f64::EPSILON);
    assert_eq!((plan.canvas_width, plan.canvas_height), (7680, 2160));
    assert_eq!(classify_aspect(&plan.bounds), AspectClass::Landscape);

    let second = &plan.slices[1];
    assert_eq!(second.crop, Some(PixelRect { x: 3840, y: 0, width: 3840, height: 2160 }));
    assert_eq!((second.native_width, second.native_height), (3840, 2160));
    assert!(!second.needs_resize(), "A 2x display takes its crop unscaled");

    let first = &plan.slices[0];
    assert_eq!(first.crop, Some(PixelRect { x: 0, y: 0, width: 3840, height: 2160 }));
    assert!(first.needs_resize(), "A 1x display is resampled down to its native size");
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn test_side_by_side_displays_get_their_half() {
    let source = decode_image(&png_bytes(&split_image(16, 4))).unwrap();
    let displays = [
        DisplayInfo::new(1, 0.0, 0.0, 8.0, 4.0, 1.0),
        DisplayInfo::new(2, 8.0, 0.0, 8.0, 4.0, 1.0),
    ];

    let output = span_across_displays(&source, &displays, &at_one_x()).unwrap();

    assert!(output.is_complete(), "Nothing should be skipped: {:?}", output.skipped_summary());
    assert_eq!(output.rendered.len(), 2);

    let left = decode_image(&output.rendered[0].bytes).unwrap().to_rgb8();
    let right = decode_image(&output.rendered[1].bytes).unwrap().to_rgb8();
    assert_eq!(left.dimensions(), (8, 4));
    assert_eq!(right.dimensions(), (8, 4));

    let Rgb([r, _, b]) = *left.get_pixel(4, 2);
    assert!(r > 200 && b < 60, "Left display should be red, got {r}/{b}");
    let Rgb([r, _, b]) = *right.get_pixel(4, 2);
    assert!(b > 200 && r < 60, "Right display should be blue, got {r}/{b}");
}

#[test]
fn test_vertical_stack_respects_axis() {
    // Top half red, bottom half blue, exactly canvas sized.
    let source = DynamicImage::ImageRgb8(RgbImage::from_fn(10, 8, |_, y| {
        if y < 4 { Rgb([255, 0, 0]) } else { Rgb([0, 0, 255]) }
    }));
    let displays = [
        DisplayInfo::new(1, 0.0, 0.0, 8.0, 4.0, 1.0),
        DisplayInfo::new(2, 2.0, 4.0, 8.0, 4.0, 1.0),
    ];

    let red_share = |axis: VerticalAxis| -> Vec<bool> {
        let options = SpanOptions { axis, ..at_one_x() };
        let output = span_across_displays(&source, &displays, &options).unwrap();
        output
            .rendered
            .iter()
            .map(|slice| {
                let Rgb([r, _, b]) = *decode_image(&slice.bytes).unwrap().to_rgb8().get_pixel(4, 2);
                r > b
            })
            .collect()
    };

    assert_eq!(red_share(VerticalAxis::Down), vec![true, false], "Down: display 2 sits below");
    assert_eq!(red_share(VerticalAxis::Up), vec![false, true], "Up: display 2 sits above");
}
