use crate::draw::model::{Color, StrokeStyle, DEFAULT_STROKE_WIDTH};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8900/calculate";
pub const DEFAULT_COLOR: Color = Color::rgb(0xFD, 0xFF, 0xAB);
/// Widest pen accepted from the settings file.
pub const MAX_STROKE_WIDTH: u32 = 256;

pub const DEFAULT_SWATCHES: [Color; 12] = [
    Color::rgb(0x00, 0x00, 0x00),
    Color::rgb(0xFF, 0xFF, 0xFF),
    Color::rgb(0xEE, 0x33, 0x33),
    Color::rgb(0xE6, 0x49, 0x80),
    Color::rgb(0xBE, 0x4B, 0xDB),
    Color::rgb(0x89, 0x32, 0x00),
    Color::rgb(0x22, 0x8B, 0xE6),
    Color::rgb(0x33, 0x33, 0xEE),
    Color::rgb(0x40, 0xC0, 0x57),
    Color::rgb(0x00, 0xAA, 0x00),
    Color::rgb(0xFA, 0xB0, 0x05),
    Color::rgb(0xFD, 0x7E, 0x14),
];

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// URL the sketch is POSTed to for recognition.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_canvas_width")]
    pub canvas_width: u32,
    #[serde(default = "default_canvas_height")]
    pub canvas_height: u32,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: u32,
    #[serde(default = "default_color")]
    pub default_color: Color,
    #[serde(default = "default_swatches")]
    pub swatches: Vec<Color>,
    /// Oldest annotations are dropped once this many are on screen.
    #[serde(default = "default_max_annotations")]
    pub max_annotations: usize,
    /// Wipe the strokes once a result has been placed over them.
    #[serde(default = "default_clear_after_result")]
    pub clear_after_result: bool,
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    #[serde(default = "default_toast_duration")]
    pub toast_duration: f32,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.into()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_canvas_width() -> u32 {
    1280
}

fn default_canvas_height() -> u32 {
    720
}

fn default_stroke_width() -> u32 {
    DEFAULT_STROKE_WIDTH
}

fn default_color() -> Color {
    DEFAULT_COLOR
}

fn default_swatches() -> Vec<Color> {
    DEFAULT_SWATCHES.to_vec()
}

fn default_max_annotations() -> usize {
    64
}

fn default_clear_after_result() -> bool {
    true
}

fn default_toast_duration() -> f32 {
    4.0
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            request_timeout_secs: default_request_timeout_secs(),
            canvas_width: default_canvas_width(),
            canvas_height: default_canvas_height(),
            stroke_width: default_stroke_width(),
            default_color: default_color(),
            swatches: default_swatches(),
            max_annotations: default_max_annotations(),
            clear_after_result: default_clear_after_result(),
            debug_logging: false,
            log_file: None,
            toast_duration: default_toast_duration(),
        }
    }
}

pub fn settings_path_from_exe_path(exe_path: &Path) -> Result<PathBuf> {
    let parent = exe_path
        .parent()
        .ok_or_else(|| anyhow!("executable path has no parent: {}", exe_path.display()))?;
    Ok(parent.join(SETTINGS_FILE_NAME))
}

pub fn resolve_settings_path() -> Result<PathBuf> {
    let exe_path = std::env::current_exe().context("resolve current executable")?;
    settings_path_from_exe_path(&exe_path)
}

impl Settings {
    /// Loads settings from `path`. A missing or empty file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read settings file {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut loaded: Settings = serde_json::from_str(&content)
            .with_context(|| format!("deserialize settings file {}", path.display()))?;
        loaded.sanitize();
        Ok(loaded)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create settings folder {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("serialize settings")?;
        std::fs::write(path, json)
            .with_context(|| format!("write settings file {}", path.display()))
    }

    fn sanitize(&mut self) {
        if self.stroke_width == 0 {
            tracing::warn!("stroke_width of 0 is invalid; using {DEFAULT_STROKE_WIDTH}");
            self.stroke_width = DEFAULT_STROKE_WIDTH;
        } else if self.stroke_width > MAX_STROKE_WIDTH {
            tracing::warn!(
                "stroke_width of {} is too large; using {MAX_STROKE_WIDTH}",
                self.stroke_width
            );
            self.stroke_width = MAX_STROKE_WIDTH;
        }
        if self.request_timeout_secs == 0 {
            tracing::warn!("request_timeout_secs of 0 would fail every request; using default");
            self.request_timeout_secs = default_request_timeout_secs();
        }
        if self.canvas_width == 0 || self.canvas_height == 0 {
            tracing::warn!(
                "canvas size {}x{} is invalid; using defaults",
                self.canvas_width,
                self.canvas_height
            );
            self.canvas_width = default_canvas_width();
            self.canvas_height = default_canvas_height();
        }
        if self.swatches.is_empty() {
            self.swatches = default_swatches();
        }
        if self.max_annotations == 0 {
            self.max_annotations = default_max_annotations();
        }
    }

    pub fn stroke_style(&self) -> StrokeStyle {
        StrokeStyle {
            width: self.stroke_width,
            color: self.default_color,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_path_is_resolved_next_to_executable() {
        let exe = Path::new("/tmp/sketch/bin/sketch_calc");
        let path = settings_path_from_exe_path(exe).expect("path");
        assert_eq!(path, Path::new("/tmp/sketch/bin").join(SETTINGS_FILE_NAME));
    }

    #[test]
    fn missing_and_empty_files_load_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(SETTINGS_FILE_NAME);
        assert_eq!(Settings::load(&path).expect("missing"), Settings::default());

        std::fs::write(&path, "  \n").expect("write");
        assert_eq!(Settings::load(&path).expect("empty"), Settings::default());
    }

    #[test]
    fn partial_file_fills_defaults_and_parses_hex_colors() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(SETTINGS_FILE_NAME);
        std::fs::write(
            &path,
            r##"{ "endpoint": "http://example.test/calc", "default_color": "#228BE6", "swatches": ["#000000"] }"##,
        )
        .expect("write");

        let loaded = Settings::load(&path).expect("load");
        assert_eq!(loaded.endpoint, "http://example.test/calc");
        assert_eq!(loaded.default_color, Color::rgb(0x22, 0x8B, 0xE6));
        assert_eq!(loaded.swatches, vec![Color::BLACK]);
        assert_eq!(loaded.stroke_width, DEFAULT_STROKE_WIDTH);
        assert!(loaded.clear_after_result);
    }

    #[test]
    fn invalid_values_are_sanitized() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(SETTINGS_FILE_NAME);
        std::fs::write(
            &path,
            r#"{ "stroke_width": 0, "canvas_width": 0, "swatches": [], "max_annotations": 0, "request_timeout_secs": 0 }"#,
        )
        .expect("write");

        let loaded = Settings::load(&path).expect("load");
        assert_eq!(loaded.stroke_width, DEFAULT_STROKE_WIDTH);
        assert_eq!(loaded.request_timeout_secs, 30);
        assert_eq!(loaded.request_timeout(), Duration::from_secs(30));
        assert_eq!(loaded.canvas_width, 1280);
        assert_eq!(loaded.swatches.len(), DEFAULT_SWATCHES.len());
        assert_eq!(loaded.max_annotations, 64);
    }

    #[test]
    fn oversized_stroke_width_is_capped() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(SETTINGS_FILE_NAME);
        std::fs::write(&path, format!(r#"{{ "stroke_width": {} }}"#, u32::MAX)).expect("write");

        let loaded = Settings::load(&path).expect("load");
        assert_eq!(loaded.stroke_width, MAX_STROKE_WIDTH);
        assert_eq!(loaded.stroke_style().width, MAX_STROKE_WIDTH);
    }

    #[test]
    fn bad_color_is_a_load_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(SETTINGS_FILE_NAME);
        std::fs::write(&path, r#"{ "default_color": "yellow" }"#).expect("write");
        assert!(Settings::load(&path).is_err());
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join(SETTINGS_FILE_NAME);
        let mut settings = Settings::default();
        settings.request_timeout_secs = 5;
        settings.log_file = Some(dir.path().join("app.log"));

        settings.save(&path).expect("save");
        assert_eq!(Settings::load(&path).expect("load"), settings);
    }
}
