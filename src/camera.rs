// Video sources for the compositor loop.
// `CameraCapture` opens a webcam and converts frames into 0x00RRGGBB buffers;
// `BlankSource` produces black frames for headless runs and tests.

use std::time::{Duration, Instant};

use crate::error::Error;
use crate::types::FrameBuffer;

// Bring in nokhwa types for camera control.
use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    utils::{
        CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
    },
};

/// Anything that hands out frames one at a time.
pub trait VideoSource {
    /// Next frame; `Ok(None)` once the source is exhausted.
    fn next_frame(&mut self) -> Result<Option<FrameBuffer>, Error>;

    /// The (width, height) every frame will have.
    fn resolution(&self) -> (u32, u32);
}

// A small wrapper around nokhwa::Camera so our main loop stays clean.
pub struct CameraCapture {
    cam: Camera,
    width: u32,
    height: u32,
    mirror: bool, // selfie view: flip left-right so the drawing follows your hand
}

impl CameraCapture {
    /// Try to open camera `index` at a target resolution (falls back if not exact).
    pub fn new(index: u32, width: u32, height: u32, mirror: bool) -> Result<Self, Error> {
        let idx = CameraIndex::Index(index);

        let fmt = CameraFormat::new(
            Resolution::new(width, height),
            FrameFormat::YUYV, // uncompressed; cheap to convert to RGB
            30,                // target FPS
        );

        let req = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(fmt));

        let mut cam = Camera::new(idx, req)
            .map_err(|e| Error::CameraInit(format!("Create camera: {e}")))?;

        cam.open_stream()
            .map_err(|e| Error::CameraInit(format!("Open stream: {e}")))?;

        // The actual stream might choose a slightly different resolution.
        let actual = cam.resolution();
        log::info!(
            "Camera {} streaming at {}x{} (requested {}x{})",
            index, actual.width(), actual.height(), width, height
        );

        Ok(Self {
            cam,
            width: actual.width(),
            height: actual.height(),
            mirror,
        })
    }
}

impl VideoSource for CameraCapture {
    /// Grab one frame (blocks until the camera delivers) and convert it to 0x00RRGGBB.
    fn next_frame(&mut self) -> Result<Option<FrameBuffer>, Error> {
        let frame = self
            .cam
            .frame()
            .map_err(|e| Error::CameraFrame(format!("Fetch frame: {e}")))?;

        let rgb_img = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| Error::CameraFrame(format!("Decode RGB: {e}")))?;

        let (w, h) = rgb_img.dimensions();
        let pixels = rgb_img
            .pixels()
            .map(|p| ((p[0] as u32) << 16) | ((p[1] as u32) << 8) | p[2] as u32)
            .collect();

        let mut fb = FrameBuffer { width: w as usize, height: h as usize, pixels };
        if self.mirror {
            fb.mirror_horizontal();
        }
        Ok(Some(fb))
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Drop for CameraCapture {
    fn drop(&mut self) {
        if let Err(e) = self.cam.stop_stream() {
            log::warn!("Stopping camera stream: {e}");
        }
    }
}

/// Black frames of a fixed size, optionally only `limit` of them.
pub struct BlankSource {
    width: u32,
    height: u32,
    limit: Option<u64>,
    served: u64,
    interval: Option<Duration>,
    last: Option<Instant>,
}

impl BlankSource {
    pub fn new(width: u32, height: u32, limit: Option<u64>) -> Self {
        Self { width, height, limit, served: 0, interval: None, last: None }
    }

    /// Hand out at most `fps` frames per second, like a camera would.
    pub fn paced(mut self, fps: u32) -> Self {
        self.interval = (fps > 0).then(|| Duration::from_secs(1) / fps);
        self
    }
}

impl VideoSource for BlankSource {
    fn next_frame(&mut self) -> Result<Option<FrameBuffer>, Error> {
        if self.limit.is_some_and(|n| self.served >= n) {
            return Ok(None);
        }
        if let (Some(interval), Some(last)) = (self.interval, self.last) {
            let elapsed = last.elapsed();
            if elapsed < interval {
                std::thread::sleep(interval - elapsed);
            }
        }
        self.last = Some(Instant::now());
        self.served += 1;
        Ok(Some(FrameBuffer::blank(self.width as usize, self.height as usize)))
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_source_stops_at_limit() {
        let mut src = BlankSource::new(8, 6, Some(2));
        let first = src.next_frame().unwrap().unwrap();
        assert_eq!((first.width, first.height), (8, 6));
        assert!(src.next_frame().unwrap().is_some());
        assert!(src.next_frame().unwrap().is_none());
        assert!(src.next_frame().unwrap().is_none());
    }

    #[test]
    fn paced_source_waits_between_frames() {
        let mut src = BlankSource::new(2, 2, Some(3)).paced(100);
        let start = Instant::now();
        while src.next_frame().unwrap().is_some() {}
        // two gaps of 10ms between three frames
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn unlimited_blank_source_keeps_going() {
        let mut src = BlankSource::new(2, 2, None);
        for _ in 0..100 {
            assert!(src.next_frame().unwrap().is_some());
        }
        assert_eq!(src.resolution(), (2, 2));
    }
}
