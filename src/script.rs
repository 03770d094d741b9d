// Replays a recorded gesture stream, one JSON value per frame.
//
//   null                                              -> no hand this frame
//   {"index":[120,200],"gesture":"draw"}
//   {"index":[120,200],"gesture":"erase","middle":[118,230],"radius":40}
//   {"index":[120,200],"gesture":"translate","shift":[0,4],"radius":90}
//
// Blank lines and lines starting with '#' are ignored.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::Error;
use crate::gesture::{GestureClassifier, GestureRequest};
use crate::types::FrameBuffer;

pub struct ScriptedClassifier {
    frames: VecDeque<Option<GestureRequest>>,
}

impl ScriptedClassifier {
    pub fn open(path: &Path) -> Result<Self, Error> {
        let file = File::open(path)?;
        let script = Self::from_reader(BufReader::new(file))?;
        log::info!("Loaded gesture script {:?} ({} frames)", path, script.remaining());
        Ok(script)
    }

    pub fn from_reader(reader: impl BufRead) -> Result<Self, Error> {
        let mut frames = VecDeque::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let frame: Option<GestureRequest> = serde_json::from_str(trimmed)
                .map_err(|e| Error::Script { line: i + 1, message: e.to_string() })?;
            frames.push_back(frame);
        }
        Ok(Self { frames })
    }

    /// Frames left before the script runs dry.
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl GestureClassifier for ScriptedClassifier {
    fn classify(&mut self, _raw: &FrameBuffer, _target: &mut FrameBuffer) -> Option<GestureRequest> {
        self.frames.pop_front().flatten()
    }
}
