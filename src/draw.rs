// Window + software drawing utilities.
// Visual effects provided here:
// 1) A preview window that shows the composited canvas.
// 2) Lines, discs and circles for strokes and gesture aids.
// 3) A tiny 5x7 bitmap font to render the dashboard text on top of the video.

use crate::error::Error;
use crate::pointer::PointerSnapshot;
use crate::types::{FrameBuffer, Point};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

pub struct Drawer {
    window: Window, // the on-screen window you see
}

impl Drawer {
    /// Create a window sized to the camera feed.
    /// Visual: a new empty window appears with your chosen title.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        // The compositor loop is paced by the camera, not the window.
        window.set_target_fps(0);
        Ok(Self { window })
    }

    /// Push the pixels for this frame to the screen.
    /// Visual: the window immediately displays the new image (live video).
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// True while ESC is held down (we'll exit when this is pressed).
    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// Current mouse position in window pixels; `None` once it leaves the window.
    pub fn mouse_pos(&self) -> Option<(usize, usize)> {
        self.window
            .get_mouse_pos(MouseMode::Discard)
            .map(|(x, y)| (x.max(0.0) as usize, y.max(0.0) as usize))
    }

    // we flip the background mode (camera <-> blank) when this fires.
    pub fn b_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::B, KeyRepeat::No)
    }

    /// Everything the pointer classifier needs for this frame.
    pub fn pointer(&self) -> PointerSnapshot {
        PointerSnapshot {
            position: self.mouse_pos().map(|(x, y)| Point::new(y as i32, x as i32)),
            left: self.window.get_mouse_down(MouseButton::Left),
            right: self.window.get_mouse_down(MouseButton::Right),
            shift: self.window.is_key_down(Key::LeftShift)
                || self.window.is_key_down(Key::RightShift),
        }
    }
}

/* ---------- Software drawing: pixels, lines, circles, tiny bitmap font ---------- */

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
/// Visual: the exact pixel at (x,y) changes color.
#[inline]
pub fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    fb.pixels[idx] = color;
}

/// Walk the Bresenham path from (x0,y0) to (x1,y1), calling `plot` per step.
fn bresenham(x0: i32, y0: i32, x1: i32, y1: i32, mut plot: impl FnMut(i32, i32)) {
    let (mut x0, mut y0) = (x0, y0);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        plot(x0, y0);
        if x0 == x1 && y0 == y1 { break; }
        let e2 = 2 * err;
        if e2 >= dy { err += dy; x0 += sx; }
        if e2 <= dx { err += dx; y0 += sy; }
    }
}

/// Cut the segment down to the part inside the frame grown by `margin` on
/// every side (Liang-Barsky). `None` when nothing of it is left.
/// Endpoints already inside come back unchanged.
fn clip_segment(
    fb: &FrameBuffer,
    margin: i32,
    (x0, y0): (i32, i32),
    (x1, y1): (i32, i32),
) -> Option<((i32, i32), (i32, i32))> {
    let m = margin as f64;
    let (xmax, ymax) = (fb.width as f64 - 1.0 + m, fb.height as f64 - 1.0 + m);
    let (fx, fy) = (x0 as f64, y0 as f64);
    let (dx, dy) = (x1 as f64 - fx, y1 as f64 - fy);

    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (p, q) in [(-dx, fx + m), (dx, xmax - fx), (-dy, fy + m), (dy, ymax - fy)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            if t > t1 {
                return None;
            }
            t0 = t0.max(t);
        } else {
            if t < t0 {
                return None;
            }
            t1 = t1.min(t);
        }
    }

    let at = |t: f64| ((fx + t * dx).round() as i32, (fy + t * dy).round() as i32);
    Some((at(t0), at(t1)))
}

/// Draw a thin line between (x0,y0) and (x1,y1) using Bresenham.
/// Visual: a straight 1-pixel line appears on top of the camera image.
pub fn draw_line(fb: &mut FrameBuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
    if let Some(((x0, y0), (x1, y1))) = clip_segment(fb, 0, (x0, y0), (x1, y1)) {
        bresenham(x0, y0, x1, y1, |x, y| put_pixel(fb, x, y, color));
    }
}

/// Solid disc of radius `r` centered at (cx,cy).
pub fn fill_disc(fb: &mut FrameBuffer, cx: i32, cy: i32, r: i32, color: u32) {
    if r <= 0 {
        put_pixel(fb, cx, cy, color);
        return;
    }
    let r2 = r * r;
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy <= r2 {
                put_pixel(fb, cx + dx, cy + dy, color);
            }
        }
    }
}

/// Line of the given thickness: a disc is stamped at every Bresenham step.
/// Visual: a smooth, round-capped ink line.
pub fn draw_thick_line(
    fb: &mut FrameBuffer,
    x0: i32, y0: i32,
    x1: i32, y1: i32,
    thickness: u32,
    color: u32,
) {
    if thickness <= 1 {
        draw_line(fb, x0, y0, x1, y1, color);
        return;
    }
    let r = (thickness / 2) as i32;
    // Discs centred just outside the frame still reach into it.
    if let Some(((x0, y0), (x1, y1))) = clip_segment(fb, r, (x0, y0), (x1, y1)) {
        bresenham(x0, y0, x1, y1, |x, y| fill_disc(fb, x, y, r, color));
    }
}

/// Circle outline, found per frame row and per frame column so the work
/// stays bounded by the frame size however far away or large the circle is.
/// Visual: a thin ring, used to show the erase / translate reach.
pub fn draw_circle(fb: &mut FrameBuffer, cx: i32, cy: i32, r: i32, color: u32) {
    if r <= 0 {
        put_pixel(fb, cx, cy, color);
        return;
    }
    let (cx, cy, r) = (cx as i64, cy as i64, r as i64);
    let r2 = r * r;
    let (w, h) = (fb.width as i64, fb.height as i64);

    for y in 0..h {
        let dy = y - cy;
        let rem = r2 - dy * dy;
        if rem >= 0 {
            let dx = (rem as f64).sqrt().round() as i64;
            put_pixel_wide(fb, cx - dx, y, color);
            put_pixel_wide(fb, cx + dx, y, color);
        }
    }
    // Columns fill the gaps rows leave where the arc runs nearly horizontal.
    for x in 0..w {
        let dx = x - cx;
        let rem = r2 - dx * dx;
        if rem >= 0 {
            let dy = (rem as f64).sqrt().round() as i64;
            put_pixel_wide(fb, x, cy - dy, color);
            put_pixel_wide(fb, x, cy + dy, color);
        }
    }
}

fn put_pixel_wide(fb: &mut FrameBuffer, x: i64, y: i64, color: u32) {
    if (0..fb.width as i64).contains(&x) && (0..fb.height as i64).contains(&y) {
        fb.pixels[y as usize * fb.width + x as usize] = color;
    }
}

/// Filled axis-aligned rectangle, clipped to the frame.
pub fn fill_rect(fb: &mut FrameBuffer, x: i32, y: i32, w: i32, h: i32, color: u32) {
    for yy in y..y + h {
        for xx in x..x + w {
            put_pixel(fb, xx, yy, color);
        }
    }
}

/// Draw a small crosshair centered at (cx,cy).
/// Visual: a "+" shape (with a tiny gap at the center) marks the fingertip.
pub fn draw_crosshair(fb: &mut FrameBuffer, cx: i32, cy: i32, size: i32, color: u32) {
    let (x, y, s) = (cx as i64, cy as i64, size as i64);
    if x + s < 0 || y + s < 0 || x - s >= fb.width as i64 || y - s >= fb.height as i64 {
        return;
    }
    draw_line(fb, cx - size, cy, cx - 2, cy, color);
    draw_line(fb, cx + 2, cy, cx + size, cy, color);
    draw_line(fb, cx, cy - size, cx, cy - 2, color);
    draw_line(fb, cx, cy + 2, cx, cy + size, color);
    put_pixel(fb, cx, cy, color);
}

/* ---------- 5x7 bitmap font (digits, A-Z, a little punctuation) ---------- */

/// Return a 5x7 glyph bitmap. Lowercase letters render as uppercase.
/// Each u8 is a row; the low 5 bits are the pixels (bit 4 = leftmost).
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch.to_ascii_uppercase() {
        // Digits 0..9
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'H' => g!(0b10001,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'J' => g!(0b00111,0b00010,0b00010,0b00010,0b00010,0b10010,0b01100),
        'K' => g!(0b10001,0b10010,0b10100,0b11000,0b10100,0b10010,0b10001),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b10001,0b11001,0b10101,0b10011,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'Q' => g!(0b01110,0b10001,0b10001,0b10001,0b10101,0b10010,0b01101),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'V' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b10101,0b01010),
        'X' => g!(0b10001,0b10001,0b01010,0b00100,0b01010,0b10001,0b10001),
        'Y' => g!(0b10001,0b10001,0b01010,0b00100,0b00100,0b00100,0b00100),
        'Z' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b10000,0b11111),

        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),
        '-' => g!(0b00000,0b00000,0b00000,0b11111,0b00000,0b00000,0b00000),
        '/' => g!(0b00001,0b00010,0b00010,0b00100,0b01000,0b01000,0b10000),

        _ => None,
    }
}

/// Draw a single 5x7 character at (x,y).
/// Visual: a tiny glyph appears with a 1-pixel black shadow for contrast.
fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, color: u32) {
    if let Some(rows) = glyph5x7(ch) {
        // Shadow pass first, then the glyph itself on top.
        for (offset, c) in [(1, 0x00000000), (0, color)] {
            for (ry, rowbits) in rows.iter().enumerate() {
                for rx in 0..5 {
                    if (rowbits & (1 << (4 - rx))) != 0 {
                        put_pixel(fb, x + rx as i32 + offset, y + ry as i32 + offset, c);
                    }
                }
            }
        }
    }
}

/// Draw a text string using 5x7 glyphs.
/// Visual: a compact HUD string appears; each glyph is 5x7 with 1-pixel spacing.
pub fn draw_text_5x7(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, color: u32) {
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, color);
        x += 6; // 5 pixels glyph width + 1 pixel spacing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_covers_both_endpoints() {
        let mut fb = FrameBuffer::blank(10, 10);
        draw_line(&mut fb, 1, 1, 8, 4, 7);
        assert_eq!(fb.pixel(1, 1), Some(7));
        assert_eq!(fb.pixel(8, 4), Some(7));
    }

    #[test]
    fn drawing_off_frame_is_clipped() {
        let mut fb = FrameBuffer::blank(4, 4);
        draw_thick_line(&mut fb, -10, -10, 20, 20, 3, 9);
        fill_disc(&mut fb, 100, 100, 5, 9);
        assert_eq!(fb.pixels.len(), 16);
        assert_eq!(fb.pixel(2, 2), Some(9));
    }

    #[test]
    fn segment_far_off_frame_is_cut_to_the_frame() {
        let mut fb = FrameBuffer::blank(10, 10);
        let clipped = clip_segment(&fb, 0, (5, 5), (2_000_000_000, 5));
        assert_eq!(clipped, Some(((5, 5), (9, 5))));
        assert_eq!(clip_segment(&fb, 0, (-50, -50), (-20, -40)), None);
        assert_eq!(clip_segment(&fb, 2, (1, 1), (8, 3)), Some(((1, 1), (8, 3))));

        draw_thick_line(&mut fb, 5, 5, i32::MAX, 5, 3, 4);
        draw_line(&mut fb, i32::MIN, 2, i32::MAX, 2, 6);
        assert_eq!(fb.pixel(9, 5), Some(4));
        assert_eq!(fb.pixel(0, 2), Some(6));
        assert_eq!(fb.pixel(9, 2), Some(6));
    }

    #[test]
    fn extreme_rings_and_crosshairs_do_not_overflow() {
        let mut fb = FrameBuffer::blank(20, 20);
        draw_circle(&mut fb, i32::MIN, i32::MAX, i32::MAX, 1);
        draw_crosshair(&mut fb, i32::MAX, i32::MIN, 10, 1);
        assert!(fb.pixels.iter().all(|&p| p == 0));

        // A huge ring whose edge passes through the frame still shows up.
        draw_circle(&mut fb, 10, 1_000_000_010, 1_000_000_000, 2);
        assert_eq!(fb.pixel(10, 10), Some(2));
    }

    #[test]
    fn circle_outline_hits_cardinal_points() {
        let mut fb = FrameBuffer::blank(21, 21);
        draw_circle(&mut fb, 10, 10, 5, 1);
        assert_eq!(fb.pixel(15, 10), Some(1));
        assert_eq!(fb.pixel(5, 10), Some(1));
        assert_eq!(fb.pixel(10, 15), Some(1));
        assert_eq!(fb.pixel(10, 10), Some(0)); // hollow
    }

    #[test]
    fn every_mode_label_has_glyphs() {
        for label in ["DRAW", "ERASE", "HOVER", "TRANSLATE", "IDLE", "CAM", "BLANK", "FPS: 29.9"] {
            assert!(label.chars().all(|c| glyph5x7(c).is_some()), "missing glyph in {label}");
        }
    }

    #[test]
    fn text_leaves_ink_on_frame() {
        let mut fb = FrameBuffer::blank(40, 12);
        draw_text_5x7(&mut fb, 1, 1, "IDLE", 0x00FFFFFF);
        assert!(fb.pixels.iter().any(|&p| p == 0x00FFFFFF));
    }
}
