// Cache path utilities.
// Resolves the platform cache directory and maps cache keys to files.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

/// Get the base cache directory (~/.cache/ghe-repos on Linux).
pub fn cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "ghe-repos").map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Path of the file backing a cache key.
pub fn entry_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(sanitize_name(key))
}

/// Sanitize a name for use in filesystem paths.
/// Replaces problematic characters with underscores.
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}
