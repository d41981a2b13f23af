//! Configuration for capture sessions and recording profiles

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::domain::MarkKind;

/// Minimum width and height of a committed region, in pixels
pub const MIN_REGION_SIZE: i32 = 30;
/// Radius of the resize dots drawn on a committed region
pub const HANDLE_DOT_RADIUS: i32 = 7;
/// Caret blink period of a text mark being edited
pub const CARET_BLINK: Duration = Duration::from_millis(500);
/// Thickness of the border drawn around a recording region
pub const RECORD_BORDER_THICKNESS: i32 = 2;
/// Length of the calibration trial run
pub const CALIBRATION_TRIAL: Duration = Duration::from_secs(4);
/// Countdown shown before recording starts
pub const RECORD_COUNTDOWN: Duration = Duration::from_secs(5);
/// Cadence at which observers refresh recorder status text
pub const STATUS_POLL_INTERVAL: Duration = Duration::from_millis(400);

/// Serializable color representation for config storage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Default for ShapeColor {
    fn default() -> Self {
        Self::RED
    }
}

impl ShapeColor {
    pub const RED: Self = Self::rgb8(255, 0, 0);
    pub const YELLOW: Self = Self::rgb8(255, 255, 0);
    pub const GREEN: Self = Self::rgb8(0, 128, 0);
    pub const BLUE: Self = Self::rgb8(0, 0, 255);
    pub const BLACK: Self = Self::rgb8(0, 0, 0);
    pub const GREY: Self = Self::rgb8(190, 190, 190);
    pub const SNOW: Self = Self::rgb8(255, 250, 250);
    pub const LIME: Self = Self::rgb8(0, 255, 0);
    pub const CYAN: Self = Self::rgb8(0, 255, 255);
    pub const ORANGE: Self = Self::rgb8(255, 165, 0);
    pub const HOT_PINK: Self = Self::rgb8(255, 105, 180);

    const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Look up one of the named palette colors (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        let color = match name.to_ascii_lowercase().as_str() {
            "red" => Self::RED,
            "yellow" => Self::YELLOW,
            "green" => Self::GREEN,
            "blue" => Self::BLUE,
            "black" => Self::BLACK,
            "grey" | "gray" => Self::GREY,
            "snow" => Self::SNOW,
            "lime" => Self::LIME,
            "cyan" => Self::CYAN,
            "orange" => Self::ORANGE,
            "hotpink" => Self::HOT_PINK,
            _ => return None,
        };
        Some(color)
    }

    /// Convert to image crate RGBA format (0-255)
    pub fn to_rgba_u8(self) -> [u8; 4] {
        [
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
            255,
        ]
    }
}

/// Interface language of the excluded UI layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "EN")]
    English,
    #[serde(rename = "CN")]
    Chinese,
}

/// Settings persisted between sessions
///
/// The UI layer owns editing; the core reads them once when a session starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Color of the selection outline, handles and recording border
    pub theme_color: ShapeColor,
    /// Whether to dim everything outside the selection
    pub mask_enabled: bool,
    /// Whether the UI shows startup tips
    pub tips_enabled: bool,
    /// Font size of text marks, in points
    pub font_size: u32,
    /// Stroke width of marks, in pixels
    pub stroke_width: u32,
    /// Initial mark color
    pub mark_color: ShapeColor,
    pub language: Language,
    /// Where still exports land (None = Pictures folder)
    pub export_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme_color: ShapeColor::LIME,
            mask_enabled: true,
            tips_enabled: true,
            font_size: 18,
            stroke_width: 4,
            mark_color: ShapeColor::RED,
            language: Language::English,
            export_dir: None,
        }
    }
}

impl Settings {
    /// Default location of the settings file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("snipcast").join("settings.json"))
    }

    /// Load settings from the default location, or return defaults if unavailable
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                log::warn!("No config directory available, using default settings");
                Self::default()
            }
        }
    }

    /// Load settings from `path`, falling back to defaults on any error
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("Settings file {} not found, using defaults", path.display());
            return Self::default();
        }
        match std::fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|json| Ok(serde_json::from_str::<Settings>(&json)?))
        {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!("Error loading settings from {}, using defaults: {:?}", path.display(), err);
                Self::default()
            }
        }
    }

    /// Save settings to the default location
    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::default_path().context("No config directory available")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config dir: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write settings file: {}", path.display()))?;
        Ok(())
    }

    /// Directory still exports are written to
    pub fn export_dir(&self) -> Option<PathBuf> {
        self.export_dir.clone().or_else(|| {
            dirs::picture_dir().or_else(|| dirs::home_dir().map(|h| h.join("Pictures")))
        })
    }

    /// Tool settings a new session starts with
    pub fn tool_settings(&self) -> ToolSettings {
        ToolSettings {
            color: self.mark_color,
            stroke_width: self.stroke_width,
            font_size: self.font_size,
            mask_enabled: self.mask_enabled,
            mark_kind: MarkKind::default(),
        }
    }
}

/// Current tool settings of a session, applied when a mark or region
/// operation starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolSettings {
    pub color: ShapeColor,
    pub stroke_width: u32,
    pub font_size: u32,
    pub mask_enabled: bool,
    pub mark_kind: MarkKind,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Settings::default().tool_settings()
    }
}

/// Color depth frames are stored at in scratch storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    /// Reduced color, quantized to a palette when the animation is assembled
    Palette,
    Rgba,
    Rgb,
}

/// Still-image format frames are stored in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    /// PNG at a zlib level, 0 = fastest
    Png { compression: u8 },
    /// JPEG at a quality from 1 to 100
    Jpeg { quality: u8 },
}

/// Recording profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureMode {
    pub name: &'static str,
    /// Short name accepted on the command line
    pub alias: &'static str,
    pub color: ColorMode,
    pub format: FrameFormat,
    pub target_fps: u32,
    pub max_duration: Duration,
}

impl CaptureMode {
    pub const NORMAL: CaptureMode = CaptureMode {
        name: "Normal",
        alias: "normal",
        color: ColorMode::Palette,
        format: FrameFormat::Png { compression: 0 },
        target_fps: 10,
        max_duration: Duration::from_secs(600),
    };

    pub const HIGH_QUALITY: CaptureMode = CaptureMode {
        name: "High Quality",
        alias: "quality",
        color: ColorMode::Rgba,
        format: FrameFormat::Png { compression: 6 },
        target_fps: 5,
        max_duration: Duration::from_secs(300),
    };

    pub const HIGH_FRAME_RATE: CaptureMode = CaptureMode {
        name: "High Frame Rate",
        alias: "fps",
        color: ColorMode::Rgb,
        format: FrameFormat::Jpeg { quality: 75 },
        target_fps: 25,
        max_duration: Duration::from_secs(120),
    };

    /// All profiles, in the order the UI offers them
    pub const ALL: [CaptureMode; 3] = [
        CaptureMode::NORMAL,
        CaptureMode::HIGH_QUALITY,
        CaptureMode::HIGH_FRAME_RATE,
    ];

    /// Look up a profile by display name or short alias, ignoring case
    pub fn by_name(name: &str) -> Option<CaptureMode> {
        Self::ALL.into_iter().find(|mode| {
            mode.name.eq_ignore_ascii_case(name) || mode.alias.eq_ignore_ascii_case(name)
        })
    }
}

impl Default for CaptureMode {
    fn default() -> Self {
        CaptureMode::NORMAL
    }
}
