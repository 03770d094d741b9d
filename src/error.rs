// One error type for the whole app.
// Every variant states *where* things went wrong.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Window init error: {0}")]
    WindowInit(String),   // Creating the preview window failed
    #[error("Window update error: {0}")]
    WindowUpdate(String), // Updating the window buffer failed
    #[error("Camera init error: {0}")]
    CameraInit(String),   // Opening/starting the camera failed
    #[error("Camera frame error: {0}")]
    CameraFrame(String),  // Grabbing/decoding a frame failed
    #[error("Encode error: {0}")]
    Encode(String),       // JPEG encoding of an output frame failed
    #[error("Config error: {0}")]
    Config(String),       // Config file unreadable or invalid
    #[error("Gesture script error at line {line}: {message}")]
    Script { line: usize, message: String },
    #[error("Server error: {0}")]
    Server(String),       // Binding or running the HTTP stream failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
