// Per-frame driver: classify, mutate the surface, annotate, render.
// The compositor holds the only long-lived DrawingSurface; each frame is
// fully handled before the next one is pulled from the source.
// Visual: every frame you see went through `process` exactly once.

use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant};

use crate::camera::VideoSource;
use crate::config::{Background, CanvasConfig};
use crate::dashboard::{draw_dashboard, OverlayHints};
use crate::error::Error;
use crate::gesture::{Gesture, GestureClassifier, GestureKind, GestureRequest};
use crate::surface::DrawingSurface;
use crate::types::FrameBuffer;

/// Runtime commands from the preview window or the HTTP side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    ToggleBackground,
    SetBackground(Background),
}

/// Where composited frames go. `Ok(false)` asks the loop to stop.
pub trait FrameSink {
    fn emit(&mut self, frame: &FrameBuffer) -> Result<bool, Error>;
}

/// Turns raw landmark spacing into interaction radii.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadiusPolicy {
    pub erase_scale: f32,
    pub translate_scale: f32,
    pub translate_falloff: f32,
}

impl Default for RadiusPolicy {
    fn default() -> Self {
        Self { erase_scale: 0.5, translate_scale: 0.8, translate_falloff: 0.5 }
    }
}

impl RadiusPolicy {
    pub fn from_config(canvas: &CanvasConfig) -> Self {
        Self {
            erase_scale: canvas.erase_scale,
            translate_scale: canvas.translate_scale,
            translate_falloff: canvas.translate_falloff,
        }
    }

    pub fn erase_radius(&self, raw: f32) -> i32 {
        (raw * self.erase_scale) as i32
    }

    /// (ring radius shown on the dashboard, radius actually moved)
    pub fn translate_radii(&self, raw: f32) -> (i32, i32) {
        let ring = (raw * self.translate_scale) as i32;
        (ring, (ring as f32 * self.translate_falloff) as i32)
    }
}

/// Frames-per-second over one-second windows.
struct FpsCounter {
    window_start: Instant,
    frames: u32,
    last: Option<f32>,
}

impl FpsCounter {
    fn new() -> Self {
        Self { window_start: Instant::now(), frames: 0, last: None }
    }

    fn tick(&mut self) -> Option<f32> {
        self.frames += 1;
        let elapsed = self.window_start.elapsed();
        if elapsed >= Duration::from_secs(1) {
            let fps = self.frames as f32 / elapsed.as_secs_f32();
            log::debug!("FPS: {:.1}", fps);
            self.last = Some(fps);
            self.frames = 0;
            self.window_start = Instant::now();
        }
        self.last
    }
}

pub struct FrameCompositor {
    surface: DrawingSurface,
    policy: RadiusPolicy,
    background: Background,
    controls: Option<Receiver<Control>>,
    last_mode: Option<GestureKind>,
    fps: FpsCounter,
}

impl FrameCompositor {
    pub fn new(surface: DrawingSurface, policy: RadiusPolicy, background: Background) -> Self {
        Self {
            surface,
            policy,
            background,
            controls: None,
            last_mode: None,
            fps: FpsCounter::new(),
        }
    }

    /// Accept `Control` messages, drained once per frame.
    pub fn with_controls(mut self, controls: Receiver<Control>) -> Self {
        self.controls = Some(controls);
        self
    }

    pub fn surface(&self) -> &DrawingSurface {
        &self.surface
    }

    pub fn background(&self) -> Background {
        self.background
    }

    pub fn set_background(&mut self, background: Background) {
        if background != self.background {
            log::info!("Background mode: {:?}", background);
            self.background = background;
        }
    }

    fn drain_controls(&mut self) {
        let Some(rx) = self.controls.as_ref() else { return };
        let mut pending = Vec::new();
        let disconnected = loop {
            match rx.try_recv() {
                Ok(c) => pending.push(c),
                Err(TryRecvError::Empty) => break false,
                Err(TryRecvError::Disconnected) => break true,
            }
        };
        if disconnected {
            log::debug!("Control channel closed");
            self.controls = None;
        }
        for control in pending {
            match control {
                Control::ToggleBackground => self.set_background(self.background.toggled()),
                Control::SetBackground(b) => self.set_background(b),
            }
        }
    }

    /// Apply one classifier result to the surface.
    /// Returns the mode to display and the overlay hints gathered on the way.
    pub fn apply(&mut self, request: Option<GestureRequest>) -> (Option<GestureKind>, OverlayHints) {
        let mut hints = OverlayHints::new(self.background);
        let mode = request.map(|r| r.gesture.kind());
        if mode != self.last_mode {
            log::debug!(
                "Gesture {} -> {}",
                self.last_mode.map_or("none", GestureKind::label),
                mode.map_or("none", GestureKind::label)
            );
            self.last_mode = mode;
        }

        let Some(GestureRequest { index, gesture }) = request else {
            // No hand: behave like HOVER so no stroke dangles across the gap.
            self.surface.end_stroke();
            return (None, hints);
        };
        hints.index = Some(index);

        match gesture {
            Gesture::Hover => self.surface.end_stroke(),
            _ if !self.surface.in_bounds(index) => {
                log::trace!("Ignoring {} outside the frame at {:?}", gesture.kind(), index);
            }
            Gesture::Draw => self.surface.append_point(index),
            Gesture::Erase { middle, radius } => {
                self.surface.end_stroke();
                let r = self.policy.erase_radius(radius);
                self.surface.erase_near(middle, r);
                hints.middle = Some(middle);
                hints.radius = Some(r);
            }
            Gesture::Translate { shift, radius } => {
                self.surface.end_stroke();
                let (ring, reach) = self.policy.translate_radii(radius);
                self.surface.translate(index, reach, shift);
                hints.radius = Some(ring);
            }
        }
        (mode, hints)
    }

    /// Run one frame through classification, the state machine, the overlay
    /// and the stroke renderer.
    pub fn process(&mut self, raw: &FrameBuffer, classifier: &mut dyn GestureClassifier) -> FrameBuffer {
        self.drain_controls();

        let mut target = match self.background {
            Background::Cam => raw.clone(),
            Background::Blank => FrameBuffer::blank(raw.width, raw.height),
        };
        let request = classifier.classify(raw, &mut target);

        let (mode, mut hints) = self.apply(request);
        hints.strokes = Some(self.surface.strokes().len());
        hints.fps = self.fps.tick();

        let annotated = draw_dashboard(&target, mode, &hints);
        self.surface.render(&annotated)
    }

    /// Pull frames until the source runs dry or the frontend asks to stop.
    /// Returns the number of frames processed. Source errors end the loop.
    pub fn run<F>(&mut self, source: &mut dyn VideoSource, frontend: &mut F) -> Result<u64, Error>
    where
        F: GestureClassifier + FrameSink,
    {
        let mut frames = 0u64;
        while let Some(raw) = source.next_frame()? {
            let out = self.process(&raw, frontend);
            frames += 1;
            if !frontend.emit(&out)? {
                log::info!("Frontend closed after {frames} frames");
                return Ok(frames);
            }
        }
        log::info!("Video source ended after {frames} frames");
        Ok(frames)
    }
}
