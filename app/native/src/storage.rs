//! Scratch storage locations.
//!
//! Rendered wallpapers live in `<data dir>/WallSpan` (`~/Library/Application
//! Support/WallSpan` on macOS), with a fallback to `/tmp/WallSpan` when the
//! platform data directory cannot be determined.

use std::path::{Path, PathBuf};

use crate::constants::DATA_DIR_NAME;

/// Returns the directory that rendered wallpapers are written to.
#[must_use]
pub fn get_data_dir() -> PathBuf {
    dirs::data_dir().map_or_else(
        || PathBuf::from(format!("/tmp/{DATA_DIR_NAME}")),
        |data| data.join(DATA_DIR_NAME),
    )
}

/// Sums the size of the regular files directly inside `dir` that match `filter`.
///
/// Unreadable entries count as zero bytes.
pub fn files_size(dir: &Path, filter: impl Fn(&str) -> bool) -> std::io::Result<u64> {
    if !dir.is_dir() {
        return Ok(0);
    }

    let mut total = 0u64;
    for entry in std::fs::read_dir(dir)?.flatten() {
        let name = entry.file_name();
        if name.to_str().is_some_and(&filter) {
            total += entry.metadata().map(|m| m.len()).unwrap_or(0);
        }
    }
    Ok(total)
}

/// Formats a byte count as a human-readable string.
#[must_use]
#[allow(clippy::cast_precision_loss)] // Precision loss is acceptable for human-readable output
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} bytes")
    }
}
