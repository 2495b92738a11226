use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in integer pixel coordinates.
///
/// Stored as two corners (`x1,y1` top-left, `x2,y2` bottom-right), which is the
/// layout tracking services report boxes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct PixelRect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl PixelRect {
    /// Create a new rectangle from its corners.
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Create a rectangle from floating point corners, truncating toward zero.
    ///
    /// Values outside the `i32` range saturate.
    pub fn from_xyxy(xyxy: [f64; 4]) -> Self {
        Self {
            x1: xyxy[0] as i32,
            y1: xyxy[1] as i32,
            x2: xyxy[2] as i32,
            y2: xyxy[3] as i32,
        }
    }

    /// Width in pixels (zero for degenerate boxes).
    #[inline]
    pub fn width(&self) -> u32 {
        span(self.x1, self.x2)
    }

    /// Height in pixels (zero for degenerate boxes).
    #[inline]
    pub fn height(&self) -> u32 {
        span(self.y1, self.y2)
    }

    /// Whether the rectangle encloses any area.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Copy with every corner moved into `[-margin, size + margin]` on its axis.
    pub fn clamped(&self, width: u32, height: u32, margin: u32) -> Self {
        let clamp = |v: i32, size: u32| -> i32 {
            let lo = -i64::from(margin);
            let hi = i64::from(size) + i64::from(margin);
            i64::from(v).clamp(lo, hi).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
        };
        Self {
            x1: clamp(self.x1, width),
            y1: clamp(self.y1, height),
            x2: clamp(self.x2, width),
            y2: clamp(self.y2, height),
        }
    }
}

fn span(lo: i32, hi: i32) -> u32 {
    (i64::from(hi) - i64::from(lo)).clamp(0, i64::from(u32::MAX)) as u32
}
