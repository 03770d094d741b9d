// Dashboard overlay: mode banner, status line and gesture aids.
// Visual: top-left shows the current mode with a coloured swatch; the
// fingertip gets a crosshair; erase/translate show their reach as a ring.

use crate::config::Background;
use crate::draw::{draw_circle, draw_crosshair, draw_text_5x7, fill_rect};
use crate::gesture::GestureKind;
use crate::types::{FrameBuffer, Point};

const TEXT: u32 = 0x00_FF_FF_FF;
const BANNER_BG: u32 = 0x00_20_20_20;
const CROSSHAIR: u32 = 0x00_FF_CC_33;

/// Auxiliary data for this frame's annotations.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayHints {
    pub index: Option<Point>,  // index fingertip
    pub middle: Option<Point>, // middle fingertip (erase)
    pub radius: Option<i32>,   // ring radius in pixels
    pub background: Background,
    pub strokes: Option<usize>,
    pub fps: Option<f32>,
}

impl OverlayHints {
    pub fn new(background: Background) -> Self {
        Self { index: None, middle: None, radius: None, background, strokes: None, fps: None }
    }
}

fn swatch(mode: Option<GestureKind>) -> u32 {
    match mode {
        Some(GestureKind::Draw) => 0x00_3C_DC_3C,
        Some(GestureKind::Erase) => 0x00_DC_3C_3C,
        Some(GestureKind::Hover) => 0x00_3C_8C_DC,
        Some(GestureKind::Translate) => 0x00_DC_B4_3C,
        None => 0x00_80_80_80,
    }
}

/// Annotate a copy of `frame`. The caller's buffer is left untouched.
pub fn draw_dashboard(frame: &FrameBuffer, mode: Option<GestureKind>, hints: &OverlayHints) -> FrameBuffer {
    let mut out = frame.clone();

    let label = mode.map_or("IDLE", GestureKind::label);
    let banner_w = 8 + 10 + 6 * label.len() as i32 + 6;
    fill_rect(&mut out, 4, 4, banner_w, 15, BANNER_BG);
    fill_rect(&mut out, 8, 8, 7, 7, swatch(mode));
    draw_text_5x7(&mut out, 20, 8, label, TEXT);

    let mut status = match hints.background {
        Background::Cam => String::from("CAM"),
        Background::Blank => String::from("BLANK"),
    };
    if let Some(n) = hints.strokes {
        status.push_str(&format!(" | STROKES: {n}"));
    }
    if let Some(fps) = hints.fps {
        status.push_str(&format!(" | FPS: {fps:.1}"));
    }
    draw_text_5x7(&mut out, 8, 24, &status, TEXT);

    match (mode, hints.radius) {
        (Some(GestureKind::Erase), Some(r)) => {
            if let Some(m) = hints.middle {
                draw_circle(&mut out, m.col, m.row, r, swatch(mode));
            }
        }
        (Some(GestureKind::Translate), Some(r)) => {
            if let Some(i) = hints.index {
                draw_circle(&mut out, i.col, i.row, r, swatch(mode));
            }
        }
        _ => {}
    }

    if let Some(i) = hints.index {
        draw_crosshair(&mut out, i.col, i.row, 10, CROSSHAIR);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changed(a: &FrameBuffer, b: &FrameBuffer, x: i32, y: i32) -> bool {
        a.pixel(x, y) != b.pixel(x, y)
    }

    #[test]
    fn idle_banner_without_gesture() {
        let frame = FrameBuffer::blank(200, 100);
        let out = draw_dashboard(&frame, None, &OverlayHints::new(Background::Cam));
        assert!(frame.pixels.iter().all(|&p| p == 0));
        assert_eq!(out.pixel(10, 10), Some(swatch(None)));
        // nothing drawn far from the banner
        assert_eq!(out.pixel(150, 80), Some(0));
    }

    #[test]
    fn erase_ring_centered_on_middle_fingertip() {
        let frame = FrameBuffer::blank(200, 200);
        let hints = OverlayHints {
            index: Some(Point::new(100, 60)),
            middle: Some(Point::new(100, 100)),
            radius: Some(20),
            ..OverlayHints::new(Background::Blank)
        };
        let out = draw_dashboard(&frame, Some(GestureKind::Erase), &hints);
        assert_eq!(out.pixel(120, 100), Some(swatch(Some(GestureKind::Erase))));
        assert_eq!(out.pixel(100, 80), Some(swatch(Some(GestureKind::Erase))));
        assert!(changed(&frame, &out, 60 + 10, 100)); // crosshair arm at the index tip
    }

    #[test]
    fn translate_ring_centered_on_index() {
        let frame = FrameBuffer::blank(200, 200);
        let hints = OverlayHints {
            index: Some(Point::new(150, 150)),
            radius: Some(30),
            ..OverlayHints::new(Background::Cam)
        };
        let out = draw_dashboard(&frame, Some(GestureKind::Translate), &hints);
        assert_eq!(out.pixel(180, 150), Some(swatch(Some(GestureKind::Translate))));
    }

    #[test]
    fn hover_draws_no_ring() {
        let frame = FrameBuffer::blank(200, 200);
        let hints = OverlayHints {
            index: Some(Point::new(150, 150)),
            radius: Some(30),
            ..OverlayHints::new(Background::Cam)
        };
        let out = draw_dashboard(&frame, Some(GestureKind::Hover), &hints);
        assert_eq!(out.pixel(180, 150), Some(0));
    }
}
