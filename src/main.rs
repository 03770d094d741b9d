// What you SEE now:
// • The camera feed (or a blank canvas) with your strokes drawn on top.
// • Mouse in the preview window stands in for the hand:
//   LMB draws, RMB erases around the cursor, Shift+LMB drags strokes, no button hovers.
// • B toggles camera <-> blank background. ESC quits.
// • The same composited feed streams to http://127.0.0.1:5000/ as MJPEG.

mod camera;
mod compositor;
mod config;
mod dashboard;
mod draw;
mod error;
mod gesture;
mod logging;
mod pointer;
mod script;
mod stream;
mod surface;
mod types;

use std::path::Path;
use std::sync::mpsc::{self, Sender};
use std::time::Duration;

use clap::{App, Arg, ArgMatches};

use camera::{BlankSource, CameraCapture, VideoSource};
use compositor::{Control, FrameCompositor, FrameSink, RadiusPolicy};
use config::{ClassifierKind, Config, SourceKind};
use draw::Drawer;
use error::Error;
use gesture::{GestureClassifier, GestureRequest};
use logging::{init_logging, LoggingConfig};
use pointer::PointerClassifier;
use script::ScriptedClassifier;
use stream::FramePublisher;
use surface::DrawingSurface;
use types::FrameBuffer;

enum Input {
    Pointer(PointerClassifier),
    Script(ScriptedClassifier),
}

/// Everything outside the compositor: window, gesture input, stream output.
struct Frontend {
    window: Option<Drawer>,
    input: Input,
    publisher: Option<FramePublisher>,
    controls: Sender<Control>,
}

impl GestureClassifier for Frontend {
    fn classify(&mut self, raw: &FrameBuffer, target: &mut FrameBuffer) -> Option<GestureRequest> {
        match &mut self.input {
            Input::Pointer(p) => {
                if let Some(window) = &self.window {
                    p.observe(window.pointer());
                }
                p.classify(raw, target)
            }
            Input::Script(s) => s.classify(raw, target),
        }
    }
}

impl FrameSink for Frontend {
    fn emit(&mut self, frame: &FrameBuffer) -> Result<bool, Error> {
        if let Some(publisher) = &self.publisher {
            publisher.publish(frame);
        }
        if let Some(window) = &mut self.window {
            window.present(frame)?;
            if !window.is_open() || window.esc_pressed() {
                return Ok(false);
            }
            if window.b_pressed_once() {
                // Fails only after the compositor has been dropped.
                self.controls.send(Control::ToggleBackground).ok();
            }
        }
        Ok(true)
    }
}

fn cli() -> App<'static, 'static> {
    App::new("air-canvas")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Draw in the air in front of your webcam and stream the result to a browser.")
        .arg(
            Arg::with_name("config")
                .long("config")
                .short("c")
                .value_name("FILE")
                .help("TOML config file (defaults are used when omitted)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("headless")
                .long("headless")
                .help("Run without the preview window"),
        )
        .arg(
            Arg::with_name("script")
                .long("script")
                .value_name("FILE")
                .help("Replay gestures from a JSON-lines script instead of the mouse")
                .takes_value(true),
        )
}

/// Config file first, then command-line overrides, then validation.
fn configure(matches: &ArgMatches) -> Result<Config, Error> {
    let mut config = Config::load(matches.value_of("config").map(Path::new))?;
    if matches.is_present("headless") {
        config.preview.window = false;
    }
    if let Some(script) = matches.value_of("script") {
        config.input.classifier = ClassifierKind::Script;
        config.input.script = script.into();
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<(), Error> {
    let config = configure(&cli().get_matches())?;

    init_logging(LoggingConfig {
        env_filter: Some(config.logging.filter.clone()),
        ..LoggingConfig::default()
    });

    run(&config)
}

fn run(config: &Config) -> Result<(), Error> {
    /* --- Video source ---
       Visual: nothing yet; the camera light turns on. */
    let mut source: Box<dyn VideoSource> = match config.video.source {
        SourceKind::Camera => Box::new(CameraCapture::new(
            config.video.camera_index,
            config.video.width,
            config.video.height,
            config.video.mirror,
        )?),
        SourceKind::Blank => {
            let limit = (config.video.max_frames > 0).then_some(config.video.max_frames);
            Box::new(BlankSource::new(config.video.width, config.video.height, limit).paced(30))
        }
    };
    let (w, h) = source.resolution();

    /* --- Surface + compositor ---
       Visual: the canvas starts empty, sized to the camera frame. */
    let (control_tx, control_rx) = mpsc::channel();
    let surface = DrawingSurface::new(w as usize, h as usize, config.canvas.style());
    let mut compositor = FrameCompositor::new(
        surface,
        RadiusPolicy::from_config(&config.canvas),
        config.canvas.background,
    )
    .with_controls(control_rx);

    /* --- Stream server on its own runtime ---
       Visual: open the printed URL in a browser to watch the canvas. */
    let runtime = if config.server.enabled {
        Some(tokio::runtime::Runtime::new()?)
    } else {
        None
    };
    let publisher = runtime.as_ref().map(|rt| {
        let (publisher, frames) = FramePublisher::new(config.server.jpeg_quality);
        let addr = config.server.bind;
        let controls = control_tx.clone();
        rt.spawn(async move {
            if let Err(e) = stream::serve(addr, frames, controls).await {
                log::error!("{e}");
            }
        });
        publisher
    });

    /* --- Preview window + gesture input --- */
    let window = if config.preview.window {
        Some(Drawer::new("air-canvas", w as usize, h as usize)?)
    } else {
        None
    };
    let input = match config.input.classifier {
        ClassifierKind::Pointer => Input::Pointer(PointerClassifier::new(config.input.pointer_radius)),
        ClassifierKind::Script => Input::Script(ScriptedClassifier::open(&config.input.script)?),
    };
    let mut frontend = Frontend { window, input, publisher, controls: control_tx };

    let (cw, ch) = compositor.surface().dimensions();
    log::info!("Canvas {}x{}, background {:?}", cw, ch, compositor.background());

    /* ------------------------------ Main loop ------------------------------ */
    let result = compositor.run(source.as_mut(), &mut frontend);

    // Dropping the publisher ends open streams and stops the server.
    drop(frontend);
    if let Some(rt) = runtime {
        rt.shutdown_timeout(Duration::from_secs(2));
    }

    let frames = result?;
    log::info!(
        "Done: {} frames, {} strokes ({} points) on the canvas",
        frames,
        compositor.surface().strokes().len(),
        compositor.surface().point_count()
    );
    Ok(())
}
