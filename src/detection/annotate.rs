use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::config::AnnotationStyle;
use crate::models::{BoundingRect, DefectCandidate};

const LABEL: &str = "DEFECT";
const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
const LABEL_SCALE: u32 = 2;
const LABEL_GAP: u32 = 4;

/// 5x7 bitmaps, one byte per row, most significant of the low five bits on
/// the left.
fn glyph(c: char) -> Option<[u8; 7]> {
    match c {
        'D' => Some([0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110]),
        'E' => Some([0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111]),
        'F' => Some([0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000]),
        'C' => Some([0b01111, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b01111]),
        'T' => Some([0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100]),
        _ => None,
    }
}

/// Draw every defect's bounding box onto a fresh RGB copy of `source`.
///
/// `source` is never modified and the copy always has its dimensions.
pub fn annotate(source: &DynamicImage, defects: &[DefectCandidate], style: &AnnotationStyle) -> RgbImage {
    let mut canvas = source.to_rgb8();
    let color = Rgb(style.color);

    for defect in defects {
        draw_box(&mut canvas, &defect.bounds, style.line_width, color);
        if style.draw_labels {
            draw_label(&mut canvas, &defect.bounds, style.line_width, color);
        }
    }

    canvas
}

/// Thickness grows outward from the rectangle; out-of-frame pixels are clipped.
fn draw_box(canvas: &mut RgbImage, bounds: &BoundingRect, line_width: u32, color: Rgb<u8>) {
    for i in 0..line_width.max(1) {
        let rect = Rect::at(bounds.x as i32 - i as i32, bounds.y as i32 - i as i32)
            .of_size(bounds.width + 2 * i, bounds.height + 2 * i);
        draw_hollow_rect_mut(canvas, rect, color);
    }
}

/// Place the label just above the box, or inside its top edge when there is
/// no room above.
fn draw_label(canvas: &mut RgbImage, bounds: &BoundingRect, line_width: u32, color: Rgb<u8>) {
    let label_height = GLYPH_HEIGHT * LABEL_SCALE;
    let above = bounds.y as i64 - line_width as i64 - LABEL_GAP as i64 - label_height as i64;
    let top = if above >= 0 {
        above
    } else {
        (bounds.y + line_width + LABEL_GAP) as i64
    };
    let left = bounds.x as i64;

    for (i, c) in LABEL.chars().enumerate() {
        let Some(rows) = glyph(c) else { continue };
        let glyph_left = left + (i as u32 * (GLYPH_WIDTH + 1) * LABEL_SCALE) as i64;
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                    continue;
                }
                for dy in 0..LABEL_SCALE {
                    for dx in 0..LABEL_SCALE {
                        let x = glyph_left + (col * LABEL_SCALE + dx) as i64;
                        let y = top + (row as u32 * LABEL_SCALE + dy) as i64;
                        put_clipped(canvas, x, y, color);
                    }
                }
            }
        }
    }
}

fn put_clipped(canvas: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < canvas.width() && (y as u32) < canvas.height() {
        canvas.put_pixel(x as u32, y as u32, color);
    }
}
