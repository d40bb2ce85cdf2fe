// Cache store for reading and writing cached data.
// Handles JSON serialization, age checks, and atomic filesystem writes.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::error::{FinderError, Result};

use super::paths;

/// Wrapper for cached data with its creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// Seconds since the Unix epoch when the entry was written.
    pub created_at: i64,
    /// The cached data.
    pub data: T,
}

impl<T> CacheEntry<T> {
    /// Create a new entry stamped with the current time.
    pub fn new(data: T) -> Self {
        Self::created_at(data, Utc::now().timestamp())
    }

    /// Create an entry with an explicit creation time.
    pub fn created_at(data: T, created_at: i64) -> Self {
        Self { created_at, data }
    }

    /// Age in seconds relative to `now`. Entries from the future count as zero.
    pub fn age_secs(&self, now: i64) -> u64 {
        u64::try_from(now.saturating_sub(self.created_at)).unwrap_or(0)
    }

    /// Check if this entry is older than `window` at `now`.
    pub fn is_stale(&self, window: Duration, now: i64) -> bool {
        self.age_secs(now) > window.as_secs()
    }
}

/// Flat key-value store of JSON cache entries under one directory.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`.
    pub fn path(&self, key: &str) -> PathBuf {
        paths::entry_path(&self.dir, key)
    }

    /// Read the entry for `key`. Missing entries are `None`; undecodable ones are errors.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<CacheEntry<T>>> {
        let start = Instant::now();
        let entry = read_cached(&self.path(key))?;
        debug!(
            key,
            hit = entry.is_some(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "cache read"
        );
        Ok(entry)
    }

    /// Replace the entry for `key` with `data` stamped now.
    pub fn put<T: Serialize>(&self, key: &str, data: &T) -> Result<()> {
        self.write_entry(key, &CacheEntry::new(data))
    }

    /// Replace the entry for `key` with a prebuilt entry.
    pub fn write_entry<T: Serialize>(&self, key: &str, entry: &CacheEntry<T>) -> Result<()> {
        write_cached(&self.path(key), entry)
    }
}

/// Read a cached JSON entry from a file.
fn read_cached<T: DeserializeOwned>(path: &Path) -> Result<Option<CacheEntry<T>>> {
    let contents = match fs::read(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let cached = serde_json::from_slice(&contents).map_err(|source| FinderError::CacheCorrupt {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(cached))
}

/// Write an entry to cache as JSON.
fn write_cached<T: Serialize>(path: &Path, entry: &CacheEntry<T>) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_vec(entry)?;

    // Write atomically via temp file
    let temp_path = path.with_extension(format!("tmp.{}", std::process::id()));
    let written = write_and_rename(&temp_path, path, &json);
    if written.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    written?;

    Ok(())
}

fn write_and_rename(temp_path: &Path, path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(temp_path)?;
    file.write_all(contents)?;
    file.sync_all()?;
    fs::rename(temp_path, path)
}
