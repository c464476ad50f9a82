#![allow(dead_code)]

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use surface_inspect::BoundingRect;
use tempfile::NamedTempFile;

/// Side and position of the bright square in [`square_on_gray`].
pub const SQUARE_X: u32 = 85;
pub const SQUARE_Y: u32 = 85;
pub const SQUARE_SIDE: u32 = 30;

/// Creates a single-colour RGB image.
pub fn uniform_image(width: u32, height: u32, value: u8) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([value, value, value])))
}

/// Paints an axis-aligned filled rectangle.
pub fn fill_rect(img: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    for yy in y..(y + height).min(img.height()) {
        for xx in x..(x + width).min(img.width()) {
            img.put_pixel(xx, yy, color);
        }
    }
}

/// 200x200 dark gray frame with one 30x30 bright square at (85, 85).
pub fn square_on_gray() -> DynamicImage {
    let mut img = RgbImage::from_pixel(200, 200, Rgb([64, 64, 64]));
    fill_rect(&mut img, SQUARE_X, SQUARE_Y, SQUARE_SIDE, SQUARE_SIDE, Rgb([255, 255, 255]));
    DynamicImage::ImageRgb8(img)
}

/// Location of the dark spot in [`plate_with_spot`].
pub const SPOT: BoundingRect = BoundingRect {
    x: 90,
    y: 90,
    width: 20,
    height: 20,
};

/// 200x200 black background, a 140x140 light plate at (30, 30) and a 20x20
/// dark spot on the plate.
pub fn plate_with_spot() -> DynamicImage {
    let mut img = RgbImage::from_pixel(200, 200, Rgb([0, 0, 0]));
    fill_rect(&mut img, 30, 30, 140, 140, Rgb([200, 200, 200]));
    fill_rect(&mut img, SPOT.x, SPOT.y, SPOT.width, SPOT.height, Rgb([20, 20, 20]));
    DynamicImage::ImageRgb8(img)
}

/// True when `actual` matches `expected` edge by edge within `tolerance` pixels.
pub fn roughly_matches(actual: &BoundingRect, expected: &BoundingRect, tolerance: u32) -> bool {
    let close = |a: u32, b: u32| a.abs_diff(b) <= tolerance;
    close(actual.x, expected.x)
        && close(actual.y, expected.y)
        && close(actual.max_x(), expected.max_x())
        && close(actual.max_y(), expected.max_y())
}

/// Encodes an image into memory.
pub fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format)
        .expect("Failed to encode test image");
    buf
}

/// Writes bytes to a temp file with the given suffix.
/// The file will be automatically cleaned up when dropped.
pub fn temp_file_with(bytes: &[u8], suffix: &str) -> NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("Failed to create temp file");
    std::fs::write(file.path(), bytes).expect("Failed to write temp file");
    file
}

/// Saves an image as PNG in a temp file.
pub fn temp_png(img: &DynamicImage) -> NamedTempFile {
    temp_file_with(&encode(img, ImageFormat::Png), ".png")
}
