// Startup configuration, read from a TOML file.
// Every field has a default, so an empty (or missing) file gives a working
// camera + pointer setup.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::surface::StrokeStyle;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub video: VideoConfig,
    pub canvas: CanvasConfig,
    pub input: InputConfig,
    pub preview: PreviewConfig,
    pub server: ServerConfig,
    pub logging: LogConfig,
}

/// What the canvas is drawn over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Background {
    #[default]
    Cam,
    Blank,
}

impl Background {
    pub fn toggled(self) -> Self {
        match self {
            Background::Cam => Background::Blank,
            Background::Blank => Background::Cam,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Camera,
    Blank,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    #[default]
    Pointer,
    Script,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VideoConfig {
    pub source: SourceKind,
    pub camera_index: u32,
    pub width: u32,
    pub height: u32,
    pub mirror: bool,
    pub max_frames: u64, // blank source only; 0 = unlimited
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::Camera,
            camera_index: 0,
            width: 640,
            height: 480,
            mirror: true,
            max_frames: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasConfig {
    pub background: Background,
    pub stroke_color: u32,
    pub thickness: u32,
    pub erase_scale: f32,
    pub translate_scale: f32,
    pub translate_falloff: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        let style = StrokeStyle::default();
        Self {
            background: Background::Cam,
            stroke_color: style.color,
            thickness: style.thickness,
            erase_scale: 0.5,
            translate_scale: 0.8,
            translate_falloff: 0.5,
        }
    }
}

impl CanvasConfig {
    pub fn style(&self) -> StrokeStyle {
        StrokeStyle { color: self.stroke_color & 0x00FF_FFFF, thickness: self.thickness }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    pub classifier: ClassifierKind,
    pub script: PathBuf,
    pub pointer_radius: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierKind::Pointer,
            script: PathBuf::from("gestures.jsonl"),
            pointer_radius: 40.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreviewConfig {
    pub window: bool,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self { window: true }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub enabled: bool,
    pub bind: SocketAddr,
    pub jpeg_quality: u8,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            jpeg_quality: 80,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// env_logger filter syntax; `RUST_LOG` wins when set.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { filter: String::from("info") }
    }
}

impl Config {
    /// Load from `path`, or use defaults when no path is given.
    /// Call `validate` once command-line overrides are applied.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(p) => {
                let text = std::fs::read_to_string(p)
                    .map_err(|e| Error::Config(format!("read {}: {e}", p.display())))?;
                Self::parse(&text)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn parse(text: &str) -> Result<Self, Error> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.input.classifier == ClassifierKind::Pointer && !self.preview.window {
            return Err(Error::Config("the pointer classifier needs the preview window".into()));
        }
        if self.canvas.thickness == 0 {
            return Err(Error::Config("canvas.thickness must be at least 1".into()));
        }
        if !(1..=100).contains(&self.server.jpeg_quality) {
            return Err(Error::Config("server.jpeg_quality must be in 1..=100".into()));
        }
        if self.video.width == 0 || self.video.height == 0 {
            return Err(Error::Config("video.width and video.height must be non-zero".into()));
        }
        let scales = [
            ("canvas.erase_scale", self.canvas.erase_scale),
            ("canvas.translate_scale", self.canvas.translate_scale),
            ("canvas.translate_falloff", self.canvas.translate_falloff),
            ("input.pointer_radius", self.input.pointer_radius),
        ];
        for (name, v) in scales {
            if !v.is_finite() || v < 0.0 {
                return Err(Error::Config(format!("{name} must be a finite, non-negative number")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let c = Config::parse("").unwrap();
        assert_eq!(c.canvas.erase_scale, 0.5);
        assert_eq!(c.canvas.translate_scale, 0.8);
        assert_eq!(c.canvas.translate_falloff, 0.5);
        assert_eq!(c.canvas.background, Background::Cam);
        assert_eq!(c.server.bind.port(), 5000);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn sections_override_defaults() {
        let c = Config::parse(
            r#"
            [video]
            source = "blank"
            max_frames = 30

            [canvas]
            background = "blank"
            stroke_color = 0x00FF00
            thickness = 2

            [input]
            classifier = "script"
            script = "demo.jsonl"

            [preview]
            window = false
            "#,
        )
        .unwrap();
        assert_eq!(c.video.source, SourceKind::Blank);
        assert_eq!(c.video.max_frames, 30);
        assert_eq!(c.canvas.background, Background::Blank);
        assert_eq!(c.canvas.style(), StrokeStyle { color: 0x00FF00, thickness: 2 });
        assert_eq!(c.input.script, PathBuf::from("demo.jsonl"));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn pointer_without_window_is_rejected() {
        let c = Config::parse("[preview]\nwindow = false\n").unwrap();
        assert!(matches!(c.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::parse("[canvas]\ncolour = 1\n").is_err());
    }

    #[test]
    fn background_toggle_round_trips() {
        assert_eq!(Background::Cam.toggled(), Background::Blank);
        assert_eq!(Background::Cam.toggled().toggled(), Background::Cam);
    }
}
