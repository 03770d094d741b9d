// The drawing surface: committed strokes plus the one stroke being drawn.
// Strokes live in (row, col) frame space. Only strokes with at least two
// points are ever committed; shorter ones are dropped on close and on
// erase-splits.
// Visual: this is the ink layer painted over the camera image.

use crate::draw::draw_thick_line;
use crate::types::{FrameBuffer, Point, Shift};

/// Ordered sequence of points, drawn as connected segments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stroke {
    points: Vec<Point>,
}

impl Stroke {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Fewer than two points: nothing to draw a segment between.
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 2
    }
}

/// How strokes look when rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StrokeStyle {
    pub color: u32,     // 0x00RRGGBB
    pub thickness: u32, // pixels
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self { color: 0x00_FF_3C_3C, thickness: 4 }
    }
}

pub struct DrawingSurface {
    width: usize,
    height: usize,
    strokes: Vec<Stroke>,
    active: Option<Stroke>,
    style: StrokeStyle,
}

impl DrawingSurface {
    /// A surface for frames of `width` x `height` pixels.
    pub fn new(width: usize, height: usize, style: StrokeStyle) -> Self {
        Self { width, height, strokes: Vec::new(), active: None, style }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Committed strokes, oldest first.
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn active(&self) -> Option<&Stroke> {
        self.active.as_ref()
    }

    /// Total committed points.
    pub fn point_count(&self) -> usize {
        self.strokes.iter().map(Stroke::len).sum()
    }

    /// Strictly inside the frame: the border row/column does not count.
    pub fn in_bounds(&self, p: Point) -> bool {
        p.col > 0 && (p.col as i64) < self.width as i64 && p.row > 0 && (p.row as i64) < self.height as i64
    }

    /// Extend the active stroke, starting one if needed.
    /// Bounds are the caller's business.
    pub fn append_point(&mut self, p: Point) {
        self.active.get_or_insert_with(Stroke::default).points.push(p);
    }

    /// Close the active stroke. Degenerate strokes are discarded.
    pub fn end_stroke(&mut self) {
        if let Some(stroke) = self.active.take() {
            if stroke.is_degenerate() {
                log::trace!("dropping degenerate stroke ({} point)", stroke.len());
            } else {
                log::trace!("committed stroke of {} points", stroke.len());
                self.strokes.push(stroke);
            }
        }
    }

    /// Remove every committed point within `radius` of `center`.
    ///
    /// Each stroke is split at the removed points; every maximal run of
    /// survivors becomes its own stroke in place of the original, and runs
    /// shorter than two points are dropped.
    pub fn erase_near(&mut self, center: Point, radius: i32) {
        if radius < 0 {
            return;
        }
        let before = self.strokes.len();
        let mut kept = Vec::with_capacity(before);
        for stroke in self.strokes.drain(..) {
            if !stroke.points.iter().any(|p| p.within(center, radius)) {
                kept.push(stroke);
                continue;
            }
            let mut run = Vec::new();
            for p in stroke.points {
                if p.within(center, radius) {
                    flush_run(&mut run, &mut kept);
                } else {
                    run.push(p);
                }
            }
            flush_run(&mut run, &mut kept);
        }
        self.strokes = kept;
        if self.strokes.len() != before {
            log::trace!("erase at {:?} r={}: {} -> {} strokes", center, radius, before, self.strokes.len());
        }
    }

    /// Move every committed point within `radius` of `anchor` by `shift`.
    pub fn translate(&mut self, anchor: Point, radius: i32, shift: Shift) {
        if shift.is_zero() {
            return;
        }
        for p in self.strokes.iter_mut().flat_map(|s| s.points.iter_mut()) {
            if p.within(anchor, radius) {
                *p = p.shifted(shift);
            }
        }
    }

    /// Composite all strokes onto a copy of `frame`; the active stroke goes on top.
    pub fn render(&self, frame: &FrameBuffer) -> FrameBuffer {
        let mut out = frame.clone();
        for stroke in self.strokes.iter().chain(self.active.iter()) {
            self.draw_stroke(&mut out, stroke);
        }
        out
    }

    fn draw_stroke(&self, fb: &mut FrameBuffer, stroke: &Stroke) {
        // windows(2) yields nothing for 0/1 points, so degenerate strokes draw nothing.
        for seg in stroke.points.windows(2) {
            let (a, b) = (seg[0], seg[1]);
            draw_thick_line(fb, a.col, a.row, b.col, b.row, self.style.thickness, self.style.color);
        }
    }
}

fn flush_run(run: &mut Vec<Point>, out: &mut Vec<Stroke>) {
    if run.len() >= 2 {
        out.push(Stroke::new(std::mem::take(run)));
    } else {
        run.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(v: &[(i32, i32)]) -> Vec<Point> {
        v.iter().map(|&p| p.into()).collect()
    }

    fn surface() -> DrawingSurface {
        DrawingSurface::new(100, 100, StrokeStyle { color: 0x00FFFFFF, thickness: 1 })
    }

    fn commit(s: &mut DrawingSurface, v: &[(i32, i32)]) {
        for &p in v {
            s.append_point(p.into());
        }
        s.end_stroke();
    }

    #[test]
    fn appends_accumulate_in_call_order() {
        let mut s = surface();
        let input = [(5, 5), (6, 7), (9, 1), (3, 3)];
        for &p in &input {
            s.append_point(p.into());
        }
        assert_eq!(s.active().map(Stroke::points), Some(pts(&input).as_slice()));
        assert!(s.strokes().is_empty());
    }

    #[test]
    fn end_stroke_commits_and_is_idempotent() {
        let mut s = surface();
        commit(&mut s, &[(10, 10), (10, 20)]);
        assert_eq!(s.strokes().len(), 1);
        assert!(s.active().is_none());
        s.end_stroke();
        assert_eq!(s.strokes().len(), 1);
        assert_eq!(s.strokes()[0].points(), pts(&[(10, 10), (10, 20)]).as_slice());
    }

    #[test]
    fn single_point_stroke_is_dropped() {
        let mut s = surface();
        commit(&mut s, &[(4, 4)]);
        assert!(s.strokes().is_empty());
        assert!(s.active().is_none());
    }

    #[test]
    fn erase_drops_stroke_whose_survivors_are_degenerate() {
        let mut s = surface();
        commit(&mut s, &[(0, 0), (0, 1), (0, 2), (0, 3)]);
        s.erase_near(Point::new(0, 1), 1);
        assert!(s.strokes().is_empty());
    }

    #[test]
    fn erase_splits_into_ordered_runs() {
        let mut s = surface();
        commit(&mut s, &[(0, 0), (0, 1), (0, 2), (0, 10), (0, 11), (0, 12), (0, 20), (0, 21)]);
        commit(&mut s, &[(50, 50), (50, 60)]);
        s.erase_near(Point::new(0, 11), 4);

        let got: Vec<_> = s.strokes().iter().map(|st| st.points().to_vec()).collect();
        assert_eq!(
            got,
            vec![
                pts(&[(0, 0), (0, 1), (0, 2)]),
                pts(&[(0, 20), (0, 21)]),
                pts(&[(50, 50), (50, 60)]),
            ]
        );
    }

    #[test]
    fn erase_removes_exactly_points_within_radius() {
        let mut s = surface();
        let line: Vec<(i32, i32)> = (0..30).map(|c| (7, c)).collect();
        commit(&mut s, &line);
        let before = s.point_count();
        let center = Point::new(10, 15);
        s.erase_near(center, 5);

        for p in s.strokes().iter().flat_map(|st| st.points()) {
            assert!(!p.within(center, 5));
        }
        // row 7 is 3 away, so cols 11..=19 are within 5 (dc <= 4)
        assert_eq!(s.point_count(), before - 9);
        assert!(s.strokes().iter().all(|st| !st.is_degenerate()));
    }

    #[test]
    fn erase_far_away_keeps_everything() {
        let mut s = surface();
        commit(&mut s, &[(1, 1), (2, 2), (3, 3)]);
        s.erase_near(Point::new(90, 90), 5);
        assert_eq!(s.strokes().len(), 1);
        assert_eq!(s.point_count(), 3);
    }

    #[test]
    fn erase_does_not_touch_active_stroke() {
        let mut s = surface();
        s.append_point(Point::new(5, 5));
        s.append_point(Point::new(5, 6));
        s.erase_near(Point::new(5, 5), 10);
        assert_eq!(s.active().map(Stroke::len), Some(2));
    }

    #[test]
    fn translate_moves_only_points_in_reach() {
        let mut s = surface();
        commit(&mut s, &[(10, 10), (10, 12), (10, 40)]);
        s.translate(Point::new(10, 11), 2, Shift::new(5, -3));
        assert_eq!(s.strokes().len(), 1);
        assert_eq!(s.strokes()[0].points(), pts(&[(15, 7), (15, 9), (10, 40)]).as_slice());
    }

    #[test]
    fn zero_shift_is_a_noop() {
        let mut s = surface();
        commit(&mut s, &[(10, 10), (10, 12)]);
        let before = s.strokes().to_vec();
        s.translate(Point::new(10, 10), 50, Shift::ZERO);
        assert_eq!(s.strokes(), before.as_slice());
    }

    #[test]
    fn render_draws_segment_without_touching_input() {
        let mut s = surface();
        commit(&mut s, &[(10, 10), (10, 20)]);
        let frame = FrameBuffer::blank(100, 100);
        let out = s.render(&frame);
        assert!(frame.pixels.iter().all(|&p| p == 0));
        for col in 10..=20 {
            assert_eq!(out.pixel(col, 10), Some(0x00FFFFFF));
        }
        assert_eq!(out.pixel(21, 10), Some(0));
    }

    #[test]
    fn render_includes_open_stroke() {
        let mut s = surface();
        commit(&mut s, &[(5, 0), (5, 40)]);
        s.append_point(Point::new(0, 20));
        s.append_point(Point::new(10, 20));
        let out = s.render(&FrameBuffer::blank(100, 100));
        assert_eq!(out.pixel(40, 5), Some(0x00FFFFFF));
        assert_eq!(out.pixel(20, 9), Some(0x00FFFFFF));
    }

    #[test]
    fn far_away_erase_center_leaves_strokes_alone() {
        let mut s = surface();
        commit(&mut s, &[(5, 5), (5, 6), (5, 7)]);
        s.erase_near(Point::new(i32::MIN, 0), 5);
        s.erase_near(Point::new(i32::MAX, i32::MIN), i32::MAX);
        assert_eq!(s.point_count(), 3);
    }

    #[test]
    fn points_pushed_far_off_frame_clamp_and_still_render() {
        let mut s = surface();
        commit(&mut s, &[(50, 10), (50, 20)]);
        s.translate(Point::new(50, 20), 0, Shift::new(0, 2_000_000_000));
        s.translate(Point::new(50, 2_000_000_020), 0, Shift::new(0, i32::MAX));
        assert_eq!(s.strokes()[0].points(), pts(&[(50, 10), (50, i32::MAX)]).as_slice());

        let out = s.render(&FrameBuffer::blank(100, 100));
        assert_eq!(out.pixel(10, 50), Some(0x00FFFFFF));
        assert_eq!(out.pixel(99, 50), Some(0x00FFFFFF));
        assert_eq!(out.pixel(99, 51), Some(0));
    }

    #[test]
    fn lone_active_point_renders_nothing() {
        let mut s = surface();
        s.append_point(Point::new(10, 10));
        let out = s.render(&FrameBuffer::blank(100, 100));
        assert!(out.pixels.iter().all(|&p| p == 0));
    }

    #[test]
    fn bounds_are_strict() {
        let s = surface();
        assert!(s.in_bounds(Point::new(1, 1)));
        assert!(s.in_bounds(Point::new(99, 99)));
        assert!(!s.in_bounds(Point::new(0, 50)));
        assert!(!s.in_bounds(Point::new(50, 100)));
        assert!(!s.in_bounds(Point::new(50, -5)));
    }
}
