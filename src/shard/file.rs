//! Shard file reading and writing.
//!
//! A shard is a single JSON array document. Writes go through a temp file
//! that is synced to disk and renamed over the target, so a reader never
//! sees a half-written shard.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::shard::types::{ShardError, ShardResult};

/// Write content to a file atomically.
///
/// This function:
/// 1. Writes content to a temporary file (target path plus `.tmp`)
/// 2. Calls `fsync` to ensure data is on disk
/// 3. Atomically renames the temp file to the target path
///
/// If any step fails, the original file (if any) remains untouched.
///
/// # Errors
///
/// Returns an error if any file operation fails.
pub fn atomic_write(path: &Path, content: &str) -> ShardResult<()> {
    let temp_path = temp_path_for(path);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let written = write_synced(&temp_path, content).and_then(|()| fs::rename(&temp_path, path));
    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }

    Ok(())
}

fn write_synced(path: &Path, content: &str) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(content.as_bytes())?;
    writer.flush()?;
    writer.get_ref().sync_all()
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Resolve a shard path to one spelling per file.
///
/// The path is made absolute and its parent directory canonicalized, so
/// `dir/sub/../a.json`, `./a.json` and `/abs/dir/a.json` all name the same
/// shard. The file itself need not exist. If the parent doesn't exist
/// either, `.` and `..` are folded lexically.
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined.
pub fn normalize_path(path: &Path) -> ShardResult<PathBuf> {
    let absolute = std::path::absolute(path)?;

    if let (Some(parent), Some(name)) = (absolute.parent(), absolute.file_name()) {
        if let Ok(parent) = fs::canonicalize(parent) {
            return Ok(parent.join(name));
        }
    }

    Ok(fold_components(&absolute))
}

fn fold_components(path: &Path) -> PathBuf {
    let mut folded = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                folded.pop();
            }
            other => folded.push(other),
        }
    }
    folded
}

/// Serialize a slice of elements as one JSON array and write it atomically.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_shard<T: Serialize>(path: &Path, elements: &[T]) -> ShardResult<()> {
    let mut content = serde_json::to_string_pretty(elements)?;
    content.push('\n');
    atomic_write(path, &content)
}

/// Read a shard file as raw JSON elements.
///
/// # Errors
///
/// Returns:
/// - `FileNotFound` if the path does not exist
/// - `Io` if the file cannot be opened
/// - `Parse` if the content is not a JSON array
pub fn read_shard(path: &Path) -> ShardResult<Vec<Value>> {
    if !path.exists() {
        return Err(ShardError::FileNotFound(path.display().to_string()));
    }

    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let document: Value = serde_json::from_reader(reader).map_err(|e| ShardError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    match document {
        Value::Array(elements) => Ok(elements),
        other => Err(ShardError::Parse {
            path: path.display().to_string(),
            message: format!("expected a JSON array, found {}", json_kind(&other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Count the elements in a shard file.
///
/// Returns 0 if the file doesn't exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be parsed.
pub fn count_records(path: &Path) -> ShardResult<usize> {
    if !path.exists() {
        return Ok(0);
    }
    Ok(read_shard(path)?.len())
}

/// Get the size of a file in bytes.
///
/// Returns 0 if the file doesn't exist.
pub fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

/// Name of the `number`th auto-named shard.
#[must_use]
pub fn shard_file_name(base_name: &str, number: usize) -> String {
    format!("{base_name}{number}.json")
}

/// Shard number encoded in a file name, if it is an auto-named shard.
#[must_use]
pub fn shard_number(base_name: &str, file_name: &str) -> Option<usize> {
    file_name
        .strip_prefix(base_name)?
        .strip_suffix(".json")?
        .parse()
        .ok()
}

/// List auto-named shards in a directory, ordered by shard number.
///
/// Returns an empty list if the directory doesn't exist.
///
/// # Errors
///
/// Returns an error if the directory cannot be read.
pub fn list_shards(dir: &Path, base_name: &str) -> ShardResult<Vec<(usize, PathBuf)>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut shards = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if let Some(number) = shard_number(base_name, name) {
            if entry.file_type()?.is_file() {
                shards.push((number, entry.path()));
            }
        }
    }

    shards.sort();
    Ok(shards)
}
