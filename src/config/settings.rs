//! Configuration settings for Slidecast.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub video: VideoSettings,
    pub style: StyleSettings,
    pub script: ScriptSettings,
    pub narration: NarrationSettings,
    pub effects: EffectSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory holding the Markdown posts.
    pub content_dir: String,
    /// Directory where generated scripts are saved.
    pub script_dir: String,
    /// Directory where finished videos are written.
    pub output_dir: String,
    /// Directory for background images referenced by scripts.
    pub assets_dir: String,
    /// Parent directory for per-run scratch directories.
    pub temp_dir: String,
    /// Number of recent posts to process by default.
    pub num_posts: usize,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            content_dir: "./content".to_string(),
            script_dir: "./video_scripts".to_string(),
            output_dir: "./video_output".to_string(),
            assets_dir: "./video_output/assets".to_string(),
            temp_dir: "/tmp/slidecast".to_string(),
            num_posts: 5,
            log_level: "info".to_string(),
        }
    }
}

/// Video encoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Video bitrate passed to the encoder (e.g. "4000k").
    pub bitrate: String,
    pub codec: String,
    pub audio_codec: String,
    pub audio_bitrate: String,
    pub audio_sample_rate: u32,
    pub audio_channels: u32,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            fps: 24,
            bitrate: "4000k".to_string(),
            codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            audio_bitrate: "192k".to_string(),
            audio_sample_rate: 44100,
            audio_channels: 2,
        }
    }
}

/// Font sizes by heading level.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSizes {
    pub h1: u32,
    pub h2: u32,
    pub h3: u32,
    pub text: u32,
}

impl Default for FontSizes {
    fn default() -> Self {
        Self {
            h1: 70,
            h2: 60,
            h3: 50,
            text: 40,
        }
    }
}

impl FontSizes {
    /// Font size for a heading level; 0 and levels below h3 use the body size.
    pub fn for_level(&self, level: u8) -> u32 {
        match level {
            1 => self.h1,
            2 => self.h2,
            3 => self.h3,
            _ => self.text,
        }
    }
}

/// Slide styling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleSettings {
    /// Base background color (hex, `#rrggbb`).
    pub background_color: String,
    pub text_color: String,
    pub shadow_color: String,
    /// TrueType font file; the built-in bitmap font is used if it cannot be loaded.
    pub font_path: String,
    pub font_sizes: FontSizes,
    /// Line height as a multiple of the font size.
    pub line_spacing: f32,
    /// Horizontal margin as a fraction of the canvas width.
    pub margin: f32,
    /// Background image (file name in the assets directory) used when a
    /// section does not name its own.
    pub default_background: Option<String>,
}

impl Default for StyleSettings {
    fn default() -> Self {
        Self {
            background_color: "#291d38".to_string(),
            text_color: "#ffffff".to_string(),
            shadow_color: "#000000".to_string(),
            font_path: "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf".to_string(),
            font_sizes: FontSizes::default(),
            line_spacing: 1.2,
            margin: 0.15,
            default_background: None,
        }
    }
}

/// Fixed texts of the generated scripts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptSettings {
    pub intro_heading: String,
    pub intro_text: String,
    /// Second intro line; `{title}` is replaced by the document title.
    pub title_template: String,
    pub outro_heading: String,
    pub outro_text: String,
    /// Animation stored on every content section (None = renderer default).
    pub animation: Option<String>,
}

impl Default for ScriptSettings {
    fn default() -> Self {
        Self {
            intro_heading: "Introduction".to_string(),
            intro_text: "Hello everyone and welcome back to the channel!".to_string(),
            title_template: "Today we are talking about {title}.".to_string(),
            outro_heading: "Conclusion".to_string(),
            outro_text: "Thanks for watching this video!".to_string(),
            animation: None,
        }
    }
}

/// Narration provider type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Offline engine run as a subprocess (espeak-ng or piper).
    #[default]
    Local,
    /// Google Translate text-to-speech endpoint.
    Gtts,
    /// OpenAI speech API.
    #[serde(rename = "openai")]
    OpenAi,
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" | "espeak" | "piper" => Ok(ProviderKind::Local),
            "gtts" | "google" => Ok(ProviderKind::Gtts),
            "openai" => Ok(ProviderKind::OpenAi),
            _ => Err(format!("Unknown narration provider: {}", s)),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Local => write!(f, "local"),
            ProviderKind::Gtts => write!(f, "gtts"),
            ProviderKind::OpenAi => write!(f, "openai"),
        }
    }
}

/// Narration (text-to-speech) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrationSettings {
    pub provider: ProviderKind,
    /// Provider used when `provider` is misconfigured (e.g. missing API key).
    pub fallback: Option<ProviderKind>,
    /// Language code (e.g. "en", "it-IT").
    pub language: String,
    /// Local engine executable ("espeak-ng" or "piper").
    pub local_command: String,
    /// Voice model for piper.
    pub local_model: Option<String>,
    /// OpenAI speech model.
    pub openai_model: String,
    /// OpenAI voice.
    pub openai_voice: String,
    /// Maximum concurrent slide/narration jobs.
    pub max_concurrent: usize,
    /// Per-unit timeout in seconds (0 disables).
    pub timeout_seconds: u64,
    /// Allowed difference between expected and measured duration, in seconds.
    pub duration_tolerance: f64,
}

impl Default for NarrationSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Local,
            fallback: None,
            language: "en".to_string(),
            local_command: "espeak-ng".to_string(),
            local_model: None,
            openai_model: "tts-1".to_string(),
            openai_voice: "alloy".to_string(),
            max_concurrent: 2,
            timeout_seconds: 120,
            duration_tolerance: 0.01,
        }
    }
}

/// Transition effect settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectSettings {
    /// Effect used when a section names none (or an unknown one).
    pub default_effect: String,
    /// Transition length in seconds.
    pub transition_duration: f64,
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self {
            default_effect: "fade".to_string(),
            transition_duration: 0.5,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::SlidecastError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("slidecast")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    pub fn content_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.content_dir)
    }

    pub fn script_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.script_dir)
    }

    pub fn output_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.output_dir)
    }

    pub fn assets_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.assets_dir)
    }

    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }

    pub fn font_path(&self) -> PathBuf {
        Self::expand_path(&self.style.font_path)
    }

    /// Create every working directory.
    pub fn ensure_directories(&self) -> crate::error::Result<()> {
        for dir in [
            self.content_dir(),
            self.script_dir(),
            self.output_dir(),
            self.assets_dir(),
            self.temp_dir(),
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}
