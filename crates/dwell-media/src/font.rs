//! 5x7 bitmap font for frame labels.
//!
//! Covers the glyphs a dwell label can contain (`ID 12 | 3.4s`) plus a few
//! extras. Anything else renders as a hollow box.

use image::{Rgb, RgbImage};

/// Glyph cell width in pixels.
pub const GLYPH_WIDTH: i32 = 5;
/// Glyph cell height in pixels.
pub const GLYPH_HEIGHT: i32 = 7;
/// Horizontal advance per character, including one column of spacing.
pub const GLYPH_ADVANCE: i32 = GLYPH_WIDTH + 1;

/// Rows of a glyph, most significant of the low five bits is the left column.
fn glyph(ch: char) -> [u8; 7] {
    match ch {
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        's' => [0b00000, 0b00000, 0b01111, 0b10000, 0b01110, 0b00001, 0b11110],
        '|' => [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        ':' => [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000],
        ' ' => [0; 7],
        _ => [0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111],
    }
}

/// Pixel width of `text` when rendered.
pub fn text_width(text: &str) -> i32 {
    text.chars().count() as i32 * GLYPH_ADVANCE
}

/// Draw `text` with its top-left corner at `(x, y)`.
///
/// Pixels falling outside the image are skipped.
pub fn draw_text(img: &mut RgbImage, text: &str, x: i32, y: i32, color: Rgb<u8>) {
    let (width, height) = (img.width() as i32, img.height() as i32);

    for (i, ch) in text.chars().enumerate() {
        let origin_x = x + i as i32 * GLYPH_ADVANCE;

        for (row, bits) in glyph(ch).iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if (bits >> (GLYPH_WIDTH - 1 - col)) & 1 == 0 {
                    continue;
                }
                let px = origin_x + col;
                let py = y + row as i32;
                if px >= 0 && py >= 0 && px < width && py < height {
                    img.put_pixel(px as u32, py as u32, color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    #[test]
    fn test_text_width() {
        assert_eq!(text_width("ID 1"), 4 * GLYPH_ADVANCE);
        assert_eq!(text_width(""), 0);
    }

    #[test]
    fn test_draw_text_sets_glyph_pixels() {
        let mut img = RgbImage::new(20, 10);
        draw_text(&mut img, "1", 0, 0, WHITE);
        // Top row of '1' is the single center column
        assert_eq!(img.get_pixel(2, 0), &WHITE);
        assert_eq!(img.get_pixel(0, 0), &Rgb([0, 0, 0]));
        // Bottom row spans three columns
        assert_eq!(img.get_pixel(1, 6), &WHITE);
        assert_eq!(img.get_pixel(3, 6), &WHITE);
    }

    #[test]
    fn test_draw_text_clips_at_edges() {
        let mut img = RgbImage::new(4, 4);
        draw_text(&mut img, "88", -3, -3, WHITE);
        draw_text(&mut img, "88", 2, 2, WHITE);
    }

    #[test]
    fn test_space_draws_nothing() {
        let mut img = RgbImage::new(10, 10);
        draw_text(&mut img, "  ", 0, 0, WHITE);
        assert!(img.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }
}
