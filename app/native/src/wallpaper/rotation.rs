//! Rotation file management.
//!
//! Each rotation writes its slices as `wallpaper_<tag>_<index>.jpg`, where
//! `tag` is a fresh random token. The desktop caches images by path, so a new
//! tag per rotation forces it to pick up the new files. The previous
//! generation is deleted when the next one begins.

use std::fs;
use std::path::{Path, PathBuf};

use rand::Rng;

use crate::constants::{WALLPAPER_FILE_EXTENSION, WALLPAPER_FILE_PREFIX};
use crate::storage::{files_size, get_data_dir};

/// Errors raised while writing rotation files.
#[derive(Debug, thiserror::Error)]
pub enum RotationError {
    /// `begin_rotation` has not been called yet.
    #[error("No rotation in progress")]
    NoRotation,

    /// A filesystem operation failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Tagged generations of rendered wallpapers in one directory.
#[derive(Debug)]
pub struct RotationFiles {
    dir: PathBuf,
    current_tag: Option<String>,
    purged_stale: bool,
}

impl RotationFiles {
    /// Manages files in `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            current_tag: None,
            purged_stale: false,
        }
    }

    /// Manages files in the application data directory.
    #[must_use]
    pub fn in_data_dir() -> Self { Self::new(get_data_dir()) }

    #[must_use]
    pub fn dir(&self) -> &Path { &self.dir }

    /// Tag of the generation being written, if any.
    #[must_use]
    pub fn current_tag(&self) -> Option<&str> { self.current_tag.as_deref() }

    /// Starts a new generation and returns its tag.
    ///
    /// Files of the previous generation are removed. The first call also
    /// removes generated files left behind by an earlier process. Removal
    /// failures are logged and otherwise ignored.
    pub fn begin_rotation(&mut self) -> String {
        let tag = loop {
            let candidate = generate_tag();
            if self.current_tag.as_deref() != Some(candidate.as_str()) {
                break candidate;
            }
        };

        if self.purged_stale {
            if let Some(previous) = self.current_tag.take() {
                let marker = format!("_{previous}_");
                self.remove_matching(|name| name.contains(&marker));
            }
        } else {
            self.remove_matching(|_| true);
            self.purged_stale = true;
        }

        tracing::debug!(tag = %tag, "Beginning wallpaper rotation");
        self.current_tag = Some(tag.clone());
        tag
    }

    /// Path of slice `index` in the current generation.
    ///
    /// # Errors
    ///
    /// Returns [`RotationError::NoRotation`] before the first `begin_rotation`.
    pub fn file_path(&self, index: usize) -> Result<PathBuf, RotationError> {
        let tag = self.current_tag.as_deref().ok_or(RotationError::NoRotation)?;
        Ok(self.dir.join(file_name(tag, index)))
    }

    /// Writes slice `index` of the current generation and returns its path.
    ///
    /// # Errors
    ///
    /// Returns an error if no rotation is active or the file cannot be written.
    pub fn write_slice(&self, index: usize, bytes: &[u8]) -> Result<PathBuf, RotationError> {
        let path = self.file_path(index)?;

        fs::create_dir_all(&self.dir)
            .map_err(|source| RotationError::Io { path: self.dir.clone(), source })?;
        fs::write(&path, bytes).map_err(|source| RotationError::Io { path: path.clone(), source })?;

        Ok(path)
    }

    /// Deletes every generated wallpaper and returns the bytes freed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    pub fn clear(&mut self) -> Result<u64, RotationError> {
        let freed = files_size(&self.dir, is_generated_file)
            .map_err(|source| RotationError::Io { path: self.dir.clone(), source })?;
        self.remove_matching(|_| true);
        self.current_tag = None;
        Ok(freed)
    }

    /// Removes generated files whose name satisfies `filter`.
    fn remove_matching(&self, filter: impl Fn(&str) -> bool) {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return;
        };

        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !is_generated_file(name) || !filter(name) {
                continue;
            }

            let path = entry.path();
            if let Err(err) = fs::remove_file(&path) {
                tracing::warn!(path = %path.display(), error = %err, "Failed to remove old wallpaper");
            }
        }
    }
}

/// Returns whether `name` looks like a file written by [`RotationFiles`].
#[must_use]
pub fn is_generated_file(name: &str) -> bool {
    name.starts_with(WALLPAPER_FILE_PREFIX)
        && Path::new(name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(WALLPAPER_FILE_EXTENSION))
}

fn file_name(tag: &str, index: usize) -> String {
    format!("{WALLPAPER_FILE_PREFIX}{tag}_{index}.{WALLPAPER_FILE_EXTENSION}")
}

/// Eight lowercase hex characters.
fn generate_tag() -> String {
    let value: u32 = rand::rng().random();
    format!("{value:08x}")
}
