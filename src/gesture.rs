// Gesture requests: what the hand classifier tells the canvas each frame.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{FrameBuffer, Point, Shift};

/// Recognised hand pose plus the fields that pose needs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "gesture", rename_all = "lowercase")]
pub enum Gesture {
    Draw,
    /// `middle` is the middle fingertip; `radius` the raw index-to-middle spacing.
    Erase { middle: Point, radius: f32 },
    Hover,
    /// `radius` is the raw index-to-pinky spacing.
    Translate { shift: Shift, radius: f32 },
}

impl Gesture {
    pub fn kind(&self) -> GestureKind {
        match self {
            Gesture::Draw => GestureKind::Draw,
            Gesture::Erase { .. } => GestureKind::Erase,
            Gesture::Hover => GestureKind::Hover,
            Gesture::Translate { .. } => GestureKind::Translate,
        }
    }
}

/// Payload-free gesture label, for display and logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GestureKind {
    Draw,
    Erase,
    Hover,
    Translate,
}

impl GestureKind {
    pub fn label(self) -> &'static str {
        match self {
            GestureKind::Draw => "DRAW",
            GestureKind::Erase => "ERASE",
            GestureKind::Hover => "HOVER",
            GestureKind::Translate => "TRANSLATE",
        }
    }
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One classifier result: the index fingertip and the gesture.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GestureRequest {
    pub index: Point,
    #[serde(flatten)]
    pub gesture: Gesture,
}

impl GestureRequest {
    pub fn new(index: Point, gesture: Gesture) -> Self {
        Self { index, gesture }
    }
}

/// Per-frame hand classifier.
///
/// `raw` is the camera image to classify. `target` is the buffer the frame
/// will be drawn on; classifiers may paint debug annotations into it.
pub trait GestureClassifier {
    fn classify(&mut self, raw: &FrameBuffer, target: &mut FrameBuffer) -> Option<GestureRequest>;
}
