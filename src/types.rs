// Core value types shared by the surface, the overlay and the stream.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    /// An all-black frame of the given size.
    /// Visual: this is the "blank canvas" background.
    pub fn blank(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }

    /// Read one pixel; `None` outside the frame.
    #[cfg(test)]
    pub fn pixel(&self, x: i32, y: i32) -> Option<u32> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    /// Mirror the frame left-to-right in place (selfie view).
    pub fn mirror_horizontal(&mut self) {
        if self.width == 0 {
            return;
        }
        for row in self.pixels.chunks_exact_mut(self.width) {
            row.reverse();
        }
    }
}

/// Pixel coordinates in (row, column) order, same space as the video frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Point {
    pub row: i32,
    pub col: i32,
}

impl Point {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Squared Euclidean distance, exact in integers.
    /// Saturates at `i64::MAX`, which is still farther than any `i32` radius reaches.
    pub fn distance_sq(self, other: Point) -> i64 {
        let dr = self.row as i64 - other.row as i64;
        let dc = self.col as i64 - other.col as i64;
        dr.saturating_mul(dr).saturating_add(dc.saturating_mul(dc))
    }

    /// True when `other` lies within `radius` (inclusive) of this point.
    pub fn within(self, other: Point, radius: i32) -> bool {
        if radius < 0 {
            return false;
        }
        let r = radius as i64;
        self.distance_sq(other) <= r * r
    }

    /// Clamps at the `i32` range instead of wrapping.
    pub fn shifted(self, shift: Shift) -> Point {
        Point::new(self.row.saturating_add(shift.d_row), self.col.saturating_add(shift.d_col))
    }
}

impl From<(i32, i32)> for Point {
    fn from((row, col): (i32, i32)) -> Self {
        Point::new(row, col)
    }
}

impl From<Point> for (i32, i32) {
    fn from(p: Point) -> Self {
        (p.row, p.col)
    }
}

/// Displacement applied by a translate gesture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Shift {
    pub d_row: i32,
    pub d_col: i32,
}

impl Shift {
    pub const ZERO: Shift = Shift { d_row: 0, d_col: 0 };

    pub const fn new(d_row: i32, d_col: i32) -> Self {
        Self { d_row, d_col }
    }

    pub fn is_zero(self) -> bool {
        self == Shift::ZERO
    }
}

impl From<(i32, i32)> for Shift {
    fn from((d_row, d_col): (i32, i32)) -> Self {
        Shift::new(d_row, d_col)
    }
}

impl From<Shift> for (i32, i32) {
    fn from(s: Shift) -> Self {
        (s.d_row, s.d_col)
    }
}
