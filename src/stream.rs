// MJPEG streaming of composited frames to the browser.
// The compositor thread encodes each frame and publishes it on a `watch`
// channel; every HTTP client follows the latest part, so slow clients skip
// frames instead of queueing them.
// Visual: http://127.0.0.1:5000/ shows the same picture as the window.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::mpsc::Sender;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use futures::stream::{self, Stream};
use image::{codecs::jpeg::JpegEncoder, ExtendedColorType};
use tokio::sync::watch;

use crate::compositor::Control;
use crate::error::Error;
use crate::types::FrameBuffer;

pub const BOUNDARY: &str = "frame";

/// Encode `frame` as a baseline JPEG.
pub fn encode_jpeg(frame: &FrameBuffer, quality: u8) -> Result<Vec<u8>, Error> {
    let mut rgb = Vec::with_capacity(frame.pixels.len() * 3);
    for &px in &frame.pixels {
        rgb.extend_from_slice(&[(px >> 16) as u8, (px >> 8) as u8, px as u8]);
    }
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .encode(&rgb, frame.width as u32, frame.height as u32, ExtendedColorType::Rgb8)
        .map_err(|e| Error::Encode(e.to_string()))?;
    Ok(out)
}

/// Wrap one JPEG as a `multipart/x-mixed-replace` part.
pub fn multipart_part(jpeg: &[u8]) -> Vec<u8> {
    let head = format!("--{BOUNDARY}\r\nContent-Type: image/jpeg\r\n\r\n");
    let mut part = Vec::with_capacity(head.len() + jpeg.len() + 2);
    part.extend_from_slice(head.as_bytes());
    part.extend_from_slice(jpeg);
    part.extend_from_slice(b"\r\n");
    part
}

/// Compositor-side handle: encodes and publishes frames.
pub struct FramePublisher {
    tx: watch::Sender<Option<Bytes>>,
    quality: u8,
}

impl FramePublisher {
    pub fn new(quality: u8) -> (Self, watch::Receiver<Option<Bytes>>) {
        let (tx, rx) = watch::channel(None);
        (Self { tx, quality }, rx)
    }

    /// Encode and publish. A failed encode skips this frame only.
    pub fn publish(&self, frame: &FrameBuffer) {
        // No subscribers: skip the encode entirely.
        if self.tx.receiver_count() == 0 {
            return;
        }
        match encode_jpeg(frame, self.quality) {
            Ok(jpeg) => {
                self.tx.send_replace(Some(Bytes::from(multipart_part(&jpeg))));
            }
            Err(e) => log::warn!("Skipping frame: {e}"),
        }
    }
}

#[derive(Clone)]
struct AppState {
    frames: watch::Receiver<Option<Bytes>>,
    controls: Sender<Control>,
}

/// Every part published after the subscription, ending when the publisher drops.
pub fn part_stream(
    rx: watch::Receiver<Option<Bytes>>,
) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static {
    stream::unfold(rx, |mut rx| async move {
        loop {
            rx.changed().await.ok()?;
            let part = rx.borrow_and_update().clone();
            if let Some(part) = part {
                return Some((Ok::<_, Infallible>(part), rx));
            }
        }
    })
}

const INDEX_HTML: &str = r#"<!doctype html>
<html>
<head><title>air-canvas</title></head>
<body style="margin:0;background:#111;display:flex;flex-direction:column;align-items:center">
<img src="/video_feed" alt="canvas" style="max-width:100%">
<form method="post" action="/background"><button>Toggle background</button></form>
</body>
</html>
"#;

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn video_feed(State(state): State<AppState>) -> Response {
    log::debug!("Stream client connected");
    (
        [(header::CONTENT_TYPE, format!("multipart/x-mixed-replace; boundary={BOUNDARY}"))],
        Body::from_stream(part_stream(state.frames.clone())),
    )
        .into_response()
}

async fn toggle_background(State(state): State<AppState>) -> StatusCode {
    match state.controls.send(Control::ToggleBackground) {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

async fn health() -> &'static str {
    "ok"
}

pub fn router(frames: watch::Receiver<Option<Bytes>>, controls: Sender<Control>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/video_feed", get(video_feed))
        .route("/background", post(toggle_background))
        .route("/health", get(health))
        .with_state(AppState { frames, controls })
}

/// Bind `addr` and serve until the frame publisher goes away.
pub async fn serve(
    addr: SocketAddr,
    frames: watch::Receiver<Option<Bytes>>,
    controls: Sender<Control>,
) -> Result<(), Error> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Server(format!("bind {addr}: {e}")))?;
    log::info!("Streaming on http://{}/", listener.local_addr()?);

    let mut closed = frames.clone();
    axum::serve(listener, router(frames, controls))
        .with_graceful_shutdown(async move {
            // changed() errors once the publisher is dropped.
            while closed.changed().await.is_ok() {}
            log::info!("Stream server shutting down");
        })
        .await
        .map_err(|e| Error::Server(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn gradient(w: usize, h: usize) -> FrameBuffer {
        let pixels = (0..w * h).map(|i| ((i % 256) as u32) << 8).collect();
        FrameBuffer { width: w, height: h, pixels }
    }

    #[test]
    fn jpeg_decodes_back_to_same_size() {
        let jpeg = encode_jpeg(&gradient(32, 16), 80).unwrap();
        let img = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((img.width(), img.height()), (32, 16));
    }

    #[test]
    fn part_is_framed_with_boundary() {
        let part = multipart_part(b"JPEG");
        assert_eq!(part, b"--frame\r\nContent-Type: image/jpeg\r\n\r\nJPEG\r\n".to_vec());
    }

    #[test]
    fn publish_without_clients_is_skipped() {
        let (publisher, rx) = FramePublisher::new(80);
        drop(rx);
        publisher.publish(&gradient(4, 4));
        assert!(publisher.tx.borrow().is_none());
    }

    #[tokio::test]
    async fn stream_yields_latest_part_and_ends_with_publisher() {
        let (publisher, rx) = FramePublisher::new(80);
        let mut parts = Box::pin(part_stream(rx));

        publisher.publish(&gradient(8, 8));
        let part = parts.next().await.unwrap().unwrap();
        assert!(part.starts_with(b"--frame\r\n"));
        assert!(part.ends_with(b"\r\n"));

        drop(publisher);
        assert!(parts.next().await.is_none());
    }
}
