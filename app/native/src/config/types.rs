//! Configuration types for WallSpan.
//!
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::constants::APP_NAME;
use crate::wallpaper::desktop::ScalingMode;
use crate::wallpaper::geometry::VerticalAxis;
use crate::wallpaper::history::DEFAULT_HISTORY_CAPACITY;
use crate::wallpaper::processing::{DEFAULT_JPEG_QUALITY, RENDER_MULTIPLIER, SpanOptions};
use crate::wallpaper::screens::DisplayLayout;

/// Seconds between automatic rotations.
pub const DEFAULT_INTERVAL_SECS: u64 = 1800;

/// JPEG quality requested from Unsplash.
pub const DEFAULT_DOWNLOAD_QUALITY: u8 = 100;

/// Search terms used when none are configured.
pub const DEFAULT_SEARCH_TERMS: &[&str] = &[
    "bridge night city lights",
    "nebula astrophotography",
    "night bridge long exposure",
    "galaxy nebula stars",
    "suspension bridge night",
    "milky way astrophotography",
    "bridge cityscape night",
    "deep space nebula hubble",
];

/// Configuration file names, in lookup order.
const CONFIG_FILE_NAMES: &[&str] = &["config.jsonc", "config.json"];

/// Home directory file names checked last.
const HOME_CONFIG_FILE_NAMES: &[&str] = &[".wallspan.jsonc", ".wallspan.json"];

/// How a rotation assigns photos to displays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RotationMode {
    /// One photo stretched across the whole virtual desktop.
    #[default]
    Span,
    /// A separate photo for every display.
    Individual,
}

impl std::fmt::Display for RotationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Span => write!(f, "span"),
            Self::Individual => write!(f, "individual"),
        }
    }
}

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct WallspanConfig {
    /// Unsplash access key. Prefer `apiKeys` to keep the key out of this file.
    pub api_key: String,

    /// Path to a `.env` file defining `UNSPLASH_ACCESS_KEY`.
    /// Relative paths are resolved against the configuration file's directory.
    pub api_keys: String,

    /// Seconds between automatic rotations. `0` disables the timer.
    pub interval: u64,

    /// Search terms; one is picked at random for every fetch.
    pub search_terms: Vec<String>,

    /// `span` stretches one photo across all displays, `individual` fetches one per display.
    pub mode: RotationMode,

    /// How the desktop fits each image: `fill` (crop) or `fit`.
    pub scaling: ScalingMode,

    /// Canvas pixels per desktop point when spanning.
    pub render_scale: f64,

    /// JPEG quality (1-100) of rendered slices.
    pub jpeg_quality: u8,

    /// JPEG quality (1-100) requested from Unsplash.
    pub download_quality: u8,

    /// Number of previews kept for back/forward navigation.
    pub history_capacity: usize,

    /// Fail a rotation when any display slice cannot be produced.
    pub strict_slices: bool,

    /// Explicit display layout. When empty the system displays are used.
    pub displays: Vec<DisplayLayout>,

    /// Y convention of `displays`: `down` (top-left origin) or `up` (bottom-left origin).
    pub vertical_axis: VerticalAxis,
}

impl Default for WallspanConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_keys: String::new(),
            interval: DEFAULT_INTERVAL_SECS,
            search_terms: DEFAULT_SEARCH_TERMS.iter().map(ToString::to_string).collect(),
            mode: RotationMode::default(),
            scaling: ScalingMode::default(),
            render_scale: RENDER_MULTIPLIER,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            download_quality: DEFAULT_DOWNLOAD_QUALITY,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            strict_slices: false,
            displays: Vec::new(),
            vertical_axis: VerticalAxis::default(),
        }
    }
}

impl WallspanConfig {
    /// Rotation period, or `None` when automatic rotation is disabled.
    #[must_use]
    pub const fn rotation_interval(&self) -> Option<Duration> {
        if self.interval == 0 { None } else { Some(Duration::from_secs(self.interval)) }
    }

    /// Render multiplier, falling back to the default for non-positive values.
    #[must_use]
    pub fn render_multiplier(&self) -> f64 {
        if self.render_scale.is_finite() && self.render_scale > 0.0 {
            self.render_scale
        } else {
            RENDER_MULTIPLIER
        }
    }

    /// Span options for displays reported with `axis`.
    #[must_use]
    pub fn span_options(&self, axis: VerticalAxis) -> SpanOptions {
        SpanOptions {
            render_multiplier: self.render_multiplier(),
            jpeg_quality: self.jpeg_quality.clamp(1, 100),
            axis,
        }
    }

    /// Checks values that serde cannot.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first display id declared twice.
    pub fn validate(&self) -> Result<(), String> {
        let mut seen = Vec::with_capacity(self.displays.len());
        for layout in &self.displays {
            if seen.contains(&layout.id) {
                return Err(format!("display id {} is declared more than once", layout.id));
            }
            seen.push(layout.id);
        }
        Ok(())
    }
}

/// Errors that can occur when loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No configuration file was found in any of the expected locations.
    #[error(
        "No configuration file found. Expected at ~/.config/wallspan/config.jsonc, \
        <config dir>/wallspan/config.jsonc, or ~/.wallspan.jsonc"
    )]
    NotFound,

    /// The configuration file exists but could not be read.
    #[error("Failed to read configuration file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file contains invalid JSON.
    #[error("Failed to parse configuration file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The configuration parsed but its values are inconsistent.
    #[error("Invalid configuration file {}: {message}", path.display())]
    Invalid { path: PathBuf, message: String },
}

/// Returns the configuration file locations, in lookup order.
///
/// If `$XDG_CONFIG_HOME` is set, it takes priority over `~/.config`.
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut dirs_to_check = Vec::new();

    if let Some(xdg_config) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        dirs_to_check.push(PathBuf::from(xdg_config).join(APP_NAME));
    }
    if let Some(home) = dirs::home_dir() {
        dirs_to_check.push(home.join(".config").join(APP_NAME));
    }
    if let Some(config_dir) = dirs::config_dir() {
        dirs_to_check.push(config_dir.join(APP_NAME));
    }

    let mut paths: Vec<PathBuf> = Vec::new();
    for dir in dirs_to_check {
        for filename in CONFIG_FILE_NAMES {
            let path = dir.join(filename);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    }

    if let Some(home) = dirs::home_dir() {
        for filename in HOME_CONFIG_FILE_NAMES {
            paths.push(home.join(filename));
        }
    }

    paths
}

/// Parses JSONC configuration text.
///
/// # Errors
///
/// Returns the JSON error if the stripped text is not a valid configuration.
pub fn parse_config(reader: impl Read) -> Result<WallspanConfig, serde_json::Error> {
    serde_json::from_reader(json_comments::StripComments::new(reader))
}

/// Loads the configuration from a specific file.
///
/// # Errors
///
/// Returns `ConfigError::Io` if the file cannot be read,
/// `ConfigError::Parse` if it is not a valid configuration and
/// `ConfigError::Invalid` if two displays share an id.
pub fn load_config_from_path(path: &Path) -> Result<(WallspanConfig, PathBuf), ConfigError> {
    let file =
        fs::File::open(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
    let config = parse_config(file)
        .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
    config
        .validate()
        .map_err(|message| ConfigError::Invalid { path: path.to_path_buf(), message })?;
    Ok((config, path.to_path_buf()))
}

/// Loads the configuration from the first existing file in [`config_paths`].
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if no configuration file exists, or the
/// error of [`load_config_from_path`] for the file that was found.
pub fn load_config() -> Result<(WallspanConfig, PathBuf), ConfigError> {
    config_paths()
        .into_iter()
        .find(|path| path.exists())
        .map_or(Err(ConfigError::NotFound), |path| load_config_from_path(&path))
}
