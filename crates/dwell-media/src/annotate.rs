//! Box and label drawing.

use image::Rgb;
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use dwell_models::{Detection, PixelRect};

use crate::font::{self, GLYPH_HEIGHT};
use crate::Frame;

/// Color for identities whose dwell reached the threshold.
pub const ALERT_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
/// Color for everything else.
pub const NORMAL_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Draws the render list onto frames.
///
/// All drawing is an opaque overwrite, so annotating the same frame twice with
/// the same detections leaves the pixels unchanged after the first pass.
#[derive(Debug, Clone)]
pub struct FrameAnnotator {
    thickness: u32,
    label_gap: i32,
}

impl Default for FrameAnnotator {
    fn default() -> Self {
        Self {
            thickness: 2,
            label_gap: 8,
        }
    }
}

impl FrameAnnotator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw every detection in `detections` onto `frame`.
    pub fn annotate(&self, frame: &mut Frame, detections: &[Detection]) {
        for detection in detections {
            let color = if detection.is_violating {
                ALERT_COLOR
            } else {
                NORMAL_COLOR
            };
            // Edges beyond the margin are off screen either way
            let rect = detection
                .rect
                .clamped(frame.width(), frame.height(), self.thickness);
            self.draw_box(frame, rect, color);
            self.draw_label(frame, &detection.label(), rect, color);
        }
    }

    /// Annotated copy of `frame`.
    pub fn annotated(&self, frame: &Frame, detections: &[Detection]) -> Frame {
        let mut out = frame.clone();
        self.annotate(&mut out, detections);
        out
    }

    fn draw_box(&self, frame: &mut Frame, rect: PixelRect, color: Rgb<u8>) {
        // Rect::of_size panics on zero, degenerate boxes become a single pixel
        let width = rect.width().max(1);
        let height = rect.height().max(1);

        for inset in 0..self.thickness {
            let w = width.saturating_sub(2 * inset).max(1);
            let h = height.saturating_sub(2 * inset).max(1);
            let inner = Rect::at(rect.x1 + inset as i32, rect.y1 + inset as i32).of_size(w, h);
            draw_hollow_rect_mut(frame, inner, color);
        }
    }

    fn draw_label(&self, frame: &mut Frame, text: &str, rect: PixelRect, color: Rgb<u8>) {
        let (frame_w, frame_h) = (frame.width() as i32, frame.height() as i32);

        // Baseline sits label_gap pixels above the box; keep the text on screen
        let top = rect.y1 - self.label_gap - GLYPH_HEIGHT;
        let top = top.min(frame_h - GLYPH_HEIGHT).max(0);
        let left = rect.x1.min(frame_w - font::text_width(text)).max(0);

        font::draw_text(frame, text, left, top, color);
    }
}
