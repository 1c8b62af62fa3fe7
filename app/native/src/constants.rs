//! Application-wide constants.

/// Binary and configuration directory name.
pub const APP_NAME: &str = "wallspan";

/// Directory under the platform data dir that holds rendered wallpapers.
pub const DATA_DIR_NAME: &str = "WallSpan";

/// Environment variable holding the Unsplash access key.
pub const UNSPLASH_KEY_ENV: &str = "UNSPLASH_ACCESS_KEY";

/// Prefix shared by every generated wallpaper file.
pub const WALLPAPER_FILE_PREFIX: &str = "wallpaper_";

/// Extension of generated wallpaper files.
pub const WALLPAPER_FILE_EXTENSION: &str = "jpg";
