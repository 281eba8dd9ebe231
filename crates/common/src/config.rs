//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{KaraokeError, KaraokeResult};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory where rendered videos are written.
    pub output_dir: PathBuf,

    /// Renderer invocation defaults.
    pub render: RenderDefaults,

    /// Lyric line layout.
    pub layout: LayoutConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default parameters for the external renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderDefaults {
    /// Renderer executable.
    pub ffmpeg_binary: String,

    /// Probe executable used to read the audio duration.
    pub ffprobe_binary: String,

    /// Output frame size.
    pub width: u32,
    pub height: u32,

    /// Fill color of the synthetic canvas used when no background is supplied.
    pub canvas_color: String,

    /// Lower bound for the synthetic canvas duration.
    pub min_canvas_secs: f64,

    pub video_codec: String,
    pub audio_codec: String,

    /// Color used for lyric lines.
    pub primary_color: String,

    /// Color used for the intro card.
    pub accent_color: String,

    /// Optional font file handed to the text overlays.
    pub font_file: Option<PathBuf>,

    /// Number of renderer diagnostic lines kept for failure reports.
    pub diagnostic_tail_lines: usize,

    /// Upper bound on renderer processes running at once.
    pub max_concurrent_jobs: usize,
}

/// Vertical placement of lyric lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Distance between consecutive lyric lines, in output pixels.
    pub line_spacing: i32,

    /// Wrap the per-line offset after this many lines. `None` keeps
    /// `index * line_spacing` for every line.
    pub max_stacked_lines: Option<usize>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "karaoke=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            render: RenderDefaults::default(),
            layout: LayoutConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for RenderDefaults {
    fn default() -> Self {
        Self {
            ffmpeg_binary: "ffmpeg".to_string(),
            ffprobe_binary: "ffprobe".to_string(),
            width: 1920,
            height: 1080,
            canvas_color: "black".to_string(),
            min_canvas_secs: 10.0,
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            primary_color: "white".to_string(),
            accent_color: "orange".to_string(),
            font_file: None,
            diagnostic_tail_lines: 20,
            max_concurrent_jobs: 2,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            line_spacing: 60,
            max_stacked_lines: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from `path`, falling back to defaults.
    pub fn load_from(config_path: &Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&config_file_path())
    }

    /// Save config to `path`, creating parent directories.
    pub fn save_to(&self, config_path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }

    /// Reject render settings ffmpeg cannot work with.
    pub fn validate(&self) -> KaraokeResult<()> {
        let render = &self.render;
        if render.ffmpeg_binary.trim().is_empty() {
            return Err(KaraokeError::config("render.ffmpeg_binary is empty"));
        }
        // yuv420p output needs even dimensions.
        if render.width == 0 || render.height == 0 || render.width % 2 != 0 || render.height % 2 != 0
        {
            return Err(KaraokeError::config(format!(
                "render size must be even and non-zero, got {}x{}",
                render.width, render.height
            )));
        }
        if !render.min_canvas_secs.is_finite() || render.min_canvas_secs < 0.0 {
            return Err(KaraokeError::config(format!(
                "render.min_canvas_secs must be a non-negative number, got {}",
                render.min_canvas_secs
            )));
        }
        if render.diagnostic_tail_lines == 0 {
            return Err(KaraokeError::config(
                "render.diagnostic_tail_lines must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("karaoke").join("config.json")
}

/// Default directory for rendered videos.
fn default_output_dir() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("karaoke").join("outputs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"render":{"max_concurrent_jobs":4}}"#).unwrap();
        assert_eq!(config.render.max_concurrent_jobs, 4);
        assert_eq!(config.render.ffmpeg_binary, "ffmpeg");
        assert_eq!(config.layout.line_spacing, 60);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_default_render_look() {
        let render = RenderDefaults::default();
        assert_eq!((render.width, render.height), (1920, 1080));
        assert_eq!(render.primary_color, "white");
        assert_eq!(render.accent_color, "orange");
        assert!(render.min_canvas_secs > 0.0);
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("karaoke-config-{}-{name}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_save_then_load() {
        let dir = scratch_dir("roundtrip");
        let path = dir.join("nested").join("config.json");

        let mut config = AppConfig::default();
        config.render.max_concurrent_jobs = 6;
        config.layout.max_stacked_lines = Some(4);
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path);
        assert_eq!(loaded.render.max_concurrent_jobs, 6);
        assert_eq!(loaded.layout.max_stacked_lines, Some(4));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_unparseable_config_falls_back_to_defaults() {
        let dir = scratch_dir("garbage");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let loaded = AppConfig::load_from(&path);
        assert_eq!(loaded.render.max_concurrent_jobs, 2);
        assert_eq!(
            AppConfig::load_from(&dir.join("missing.json")).layout.line_spacing,
            60
        );
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_validate_render_settings() {
        assert!(AppConfig::default().validate().is_ok());

        let mut odd = AppConfig::default();
        odd.render.width = 1279;
        let err = odd.validate().unwrap_err();
        assert!(matches!(err, KaraokeError::Config { .. }));
        assert!(err.to_string().contains("1279x1080"));

        let mut no_binary = AppConfig::default();
        no_binary.render.ffmpeg_binary = "  ".to_string();
        assert!(no_binary.validate().is_err());

        let mut bad_canvas = AppConfig::default();
        bad_canvas.render.min_canvas_secs = f64::NAN;
        assert!(bad_canvas.validate().is_err());

        let mut no_tail = AppConfig::default();
        no_tail.render.diagnostic_tail_lines = 0;
        assert!(no_tail.validate().is_err());
    }
}
