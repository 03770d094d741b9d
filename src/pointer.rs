// Mouse-driven stand-in for the hand classifier.
// Left button draws, right button erases, shift + left drags strokes around,
// no button hovers. The pointer leaving the window counts as "no hand".

use crate::gesture::{Gesture, GestureClassifier, GestureRequest};
use crate::types::{FrameBuffer, Point, Shift};

/// Mouse/keyboard state sampled once per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PointerSnapshot {
    pub position: Option<Point>, // (row, col); None when outside the window
    pub left: bool,
    pub right: bool,
    pub shift: bool,
}

pub struct PointerClassifier {
    radius: f32,               // raw landmark spacing reported for erase/translate
    current: PointerSnapshot,
    last_position: Option<Point>,
}

impl PointerClassifier {
    pub fn new(radius: f32) -> Self {
        Self { radius, current: PointerSnapshot::default(), last_position: None }
    }

    /// Feed the latest pointer state; call once before each `classify`.
    pub fn observe(&mut self, snapshot: PointerSnapshot) {
        self.current = snapshot;
    }
}

impl GestureClassifier for PointerClassifier {
    fn classify(&mut self, _raw: &FrameBuffer, _target: &mut FrameBuffer) -> Option<GestureRequest> {
        let snap = self.current;
        let previous = self.last_position;
        self.last_position = snap.position;
        let index = snap.position?;

        let gesture = if snap.left && snap.shift {
            let shift = previous
                .map(|p| Shift::new(index.row - p.row, index.col - p.col))
                .unwrap_or_default();
            Gesture::Translate { shift, radius: self.radius }
        } else if snap.left {
            Gesture::Draw
        } else if snap.right {
            Gesture::Erase { middle: index, radius: self.radius }
        } else {
            Gesture::Hover
        };
        Some(GestureRequest::new(index, gesture))
    }
}
