//! Configuration management.
//!
//! This module resolves where shards live, how auto-named shards are named,
//! and how many records go into each shard.
//!
//! # Resolution
//!
//! Every setting follows the same priority: explicit CLI flag, then
//! environment variable, then default.
//!
//! | Setting        | Flag            | Environment        | Default                  |
//! |----------------|-----------------|--------------------|--------------------------|
//! | Shard dir      | `--dir`         | `STBS_DIR`         | current directory        |
//! | Base name      | `--base-name`   | `STBS_BASE_NAME`   | `records-`               |
//! | Shard size     | `--shard-size`  | `STBS_SHARD_SIZE`  | unbounded                |
//!
//! `--global` replaces the current-directory default with
//! `~/.stbstore/shards`.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::shard::shard_file_name;

/// Default prefix for auto-named shards (`records-1.json`, `records-2.json`, ...).
pub const DEFAULT_BASE_NAME: &str = "records-";

/// Library-side store settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory auto-named shards are written to.
    pub shard_dir: PathBuf,
    /// Prefix of auto-named shard files.
    pub base_name: String,
    /// Roll over to a new shard after this many added records.
    pub max_records_per_shard: Option<NonZeroUsize>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            shard_dir: PathBuf::from("."),
            base_name: DEFAULT_BASE_NAME.to_string(),
            max_records_per_shard: None,
        }
    }
}

impl StoreConfig {
    /// Resolve a full config from CLI flags, environment, and defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for an invalid base name or shard size, or
    /// when `global` is requested and no home directory exists.
    pub fn resolve(
        dir: Option<&Path>,
        global: bool,
        base_name: Option<&str>,
        shard_size: Option<usize>,
    ) -> Result<Self> {
        Ok(Self {
            shard_dir: resolve_shard_dir(dir, global)?,
            base_name: resolve_base_name(base_name)?,
            max_records_per_shard: resolve_shard_size(shard_size)?,
        })
    }

    /// Path of the `number`th auto-named shard.
    #[must_use]
    pub fn shard_path(&self, number: usize) -> PathBuf {
        self.shard_dir.join(shard_file_name(&self.base_name, number))
    }
}

/// Get the global stbs directory location (`~/.stbstore/`).
#[must_use]
pub fn global_store_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".stbstore"))
}

/// Resolve the shard directory.
///
/// Priority:
/// 1. If `explicit` is provided, use it directly
/// 2. `STBS_DIR` environment variable
/// 3. `~/.stbstore/shards` when `global` is set
/// 4. Current directory
///
/// # Errors
///
/// Returns an error if the global directory is requested but no home
/// directory can be determined, or the current directory is unavailable.
pub fn resolve_shard_dir(explicit: Option<&Path>, global: bool) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    if let Some(dir) = non_empty_env("STBS_DIR") {
        return Ok(PathBuf::from(dir));
    }

    if global {
        return global_store_dir()
            .map(|dir| dir.join("shards"))
            .ok_or_else(|| Error::Config("cannot determine home directory".to_string()));
    }

    std::env::current_dir()
        .map_err(|e| Error::Config(format!("Failed to get current directory: {e}")))
}

/// Resolve the shard base name.
///
/// # Errors
///
/// Returns an error if the resolved name is empty or contains a path separator.
pub fn resolve_base_name(explicit: Option<&str>) -> Result<String> {
    let name = explicit
        .map(ToString::to_string)
        .or_else(|| non_empty_env("STBS_BASE_NAME"))
        .unwrap_or_else(|| DEFAULT_BASE_NAME.to_string());
    validate_base_name(&name)?;
    Ok(name)
}

/// Check a shard base name.
///
/// # Errors
///
/// Returns an error if the name is empty or contains a path separator.
pub fn validate_base_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Config("base name must not be empty".to_string()));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(Error::Config(format!(
            "base name '{name}' must not contain a path separator"
        )));
    }
    Ok(())
}

/// Resolve the records-per-shard threshold. `None` means unbounded.
///
/// # Errors
///
/// Returns an error if the value is zero or `STBS_SHARD_SIZE` is not a number.
pub fn resolve_shard_size(explicit: Option<usize>) -> Result<Option<NonZeroUsize>> {
    let size = match explicit {
        Some(size) => Some(size),
        None => non_empty_env("STBS_SHARD_SIZE")
            .map(|v| parse_shard_size(&v))
            .transpose()?,
    };

    size.map(|size| {
        NonZeroUsize::new(size)
            .ok_or_else(|| Error::Config("shard size must be at least 1".to_string()))
    })
    .transpose()
}

/// Parse a shard size from text.
///
/// # Errors
///
/// Returns an error if the text is not a non-negative integer.
pub fn parse_shard_size(value: &str) -> Result<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("invalid shard size '{value}'")))
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
