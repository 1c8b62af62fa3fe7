//! Environment file parsing.
//!
//! The Unsplash access key can live in a `.env` file referenced from the
//! configuration instead of the configuration file itself.

use std::collections::HashMap;
use std::path::Path;

use crate::constants::UNSPLASH_KEY_ENV;
use crate::platform::path::resolve;

/// Parses an environment file into a map of key-value pairs.
///
/// Comments, quoting and escapes follow `dotenvy`. Returns an empty map if
/// the file is missing or unreadable; a file that exists but fails to parse
/// is logged.
#[must_use]
pub fn parse_env_file(path: &Path) -> HashMap<String, String> {
    match dotenvy::from_path_iter(path) {
        Ok(iter) => iter.filter_map(Result::ok).collect(),
        Err(err) => {
            if path.exists() {
                tracing::warn!(path = %path.display(), error = %err, "failed to read env file");
            }
            HashMap::new()
        }
    }
}

/// Reads `UNSPLASH_ACCESS_KEY` from the env file at `api_keys_path`.
///
/// Relative paths are resolved against `config_dir`. Blank values count as
/// missing.
#[must_use]
pub fn load_access_key(api_keys_path: &str, config_dir: &Path) -> Option<String> {
    if api_keys_path.trim().is_empty() {
        return None;
    }

    let resolved = resolve(api_keys_path, config_dir);
    parse_env_file(&resolved)
        .remove(UNSPLASH_KEY_ENV)
        .filter(|key| !key.trim().is_empty())
}
