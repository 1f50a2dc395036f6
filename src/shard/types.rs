//! Shard types for JSON export/import.
//!
//! This module defines the flat element stored in shard files, the
//! statistics reported by store operations, and shard-level errors.

use serde::{Deserialize, Serialize};

use crate::model::{FormatError, Record};

/// One element of a shard file's JSON array.
///
/// Serialized keys are upper-case to match the shard format:
/// `{"KEY":"...","STB":"...","TITLE":"...","PROVIDER":"...","DATE":"YYYY-MM-DD","REV":4.0,"VIEW_TIME":"H:MM"}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ShardRecord {
    /// Composite de-duplication key. Optional on import, always written.
    #[serde(default)]
    pub key: String,
    pub stb: String,
    pub title: String,
    pub provider: String,
    pub date: String,
    pub rev: f64,
    pub view_time: String,
}

impl From<&Record> for ShardRecord {
    fn from(record: &Record) -> Self {
        Self {
            key: record.key(),
            stb: record.stb().to_string(),
            title: record.title().to_string(),
            provider: record.provider().to_string(),
            date: record.date(),
            rev: record.revenue(),
            view_time: record.view_time(),
        }
    }
}

impl TryFrom<ShardRecord> for Record {
    type Error = FormatError;

    fn try_from(rec: ShardRecord) -> Result<Self, Self::Error> {
        Record::new(
            &rec.stb,
            &rec.title,
            &rec.provider,
            &rec.date,
            rec.rev,
            &rec.view_time,
        )
    }
}

/// Statistics for an export operation.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ExportStats {
    /// Records appended to the target shard.
    pub appended: usize,
    /// Records patched at their original location.
    pub updated: usize,
    /// Queued updates whose stored content was already identical.
    pub unchanged: usize,
    /// Distinct shard files rewritten by the update pass.
    pub files_patched: usize,
}

impl ExportStats {
    /// Total number of working-set records handled.
    #[must_use]
    pub fn total(&self) -> usize {
        self.appended + self.updated + self.unchanged
    }

    pub fn merge(&mut self, other: &Self) {
        self.appended += other.appended;
        self.updated += other.updated;
        self.unchanged += other.unchanged;
        self.files_patched += other.files_patched;
    }
}

/// Statistics for an import operation (delimited text or JSON shard).
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ImportStats {
    /// Lines (or array elements) read.
    pub lines: usize,
    /// Records added under a new key.
    pub added: usize,
    /// Records that replaced an existing working-set entry.
    pub replaced: usize,
    /// Malformed lines or elements skipped.
    pub skipped: usize,
    /// Shards written by automatic roll-over during this import.
    pub shards_written: usize,
    /// Export statistics of those roll-overs.
    pub export: ExportStats,
}

impl ImportStats {
    /// Number of well-formed records accepted.
    #[must_use]
    pub fn accepted(&self) -> usize {
        self.added + self.replaced
    }

    pub fn merge(&mut self, other: &Self) {
        self.lines += other.lines;
        self.added += other.added;
        self.replaced += other.replaced;
        self.skipped += other.skipped;
        self.shards_written += other.shards_written;
        self.export.merge(&other.export);
    }
}

/// Information about a shard file.
#[derive(Debug, Clone, Serialize)]
pub struct ShardFileInfo {
    /// File name (e.g., "records-1.json").
    pub name: String,
    /// File size in bytes.
    pub size: u64,
    /// Number of elements in the shard's array, `None` if unreadable.
    pub record_count: Option<usize>,
    /// SHA-256 of the file bytes.
    pub fingerprint: String,
}

/// Shard directory status.
#[derive(Debug, Clone, Serialize)]
pub struct ShardStatus {
    pub dir: String,
    pub base_name: String,
    pub shards: Vec<ShardFileInfo>,
    pub total_records: usize,
    pub total_size: u64,
}

/// Shard-specific errors.
#[derive(Debug, thiserror::Error)]
pub enum ShardError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Shard file exists but is not a JSON array.
    #[error("Cannot parse shard {path}: {message}")]
    Parse {
        /// Shard path.
        path: String,
        /// Parser message.
        message: String,
    },

    /// Shard file not found.
    #[error("Shard file not found: {0}")]
    FileNotFound(String),

    /// An indexed slot no longer exists in its shard.
    #[error("Shard {path} has {len} elements, no slot {index}")]
    StaleLocation {
        path: String,
        index: usize,
        len: usize,
    },
}

/// Result type for shard operations.
pub type ShardResult<T> = std::result::Result<T, ShardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shard_record_uses_upper_case_keys() {
        let record = Record::new("stb1", "the matrix", "warner bros", "2014-04-01", 4.0, "1:30").unwrap();
        let value = serde_json::to_value(ShardRecord::from(&record)).unwrap();

        assert_eq!(value["KEY"], "stb1the matrix2014-04-01");
        assert_eq!(value["STB"], "stb1");
        assert_eq!(value["TITLE"], "the matrix");
        assert_eq!(value["PROVIDER"], "warner bros");
        assert_eq!(value["DATE"], "2014-04-01");
        assert_eq!(value["REV"], 4.0);
        assert_eq!(value["VIEW_TIME"], "1:30");
    }

    #[test]
    fn test_shard_record_round_trip_preserves_fields() {
        let record = Record::parse_line("stb2|the hobbit|warner bros|2014-04-02|8.00|2:45").unwrap();
        let json = serde_json::to_string(&ShardRecord::from(&record)).unwrap();
        let parsed: ShardRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(Record::try_from(parsed).unwrap(), record);
    }

    #[test]
    fn test_shard_record_key_optional_on_import() {
        let json = r#"{"STB":"s","TITLE":"t","PROVIDER":"p","DATE":"2014-04-01","REV":1,"VIEW_TIME":"0:05"}"#;
        let parsed: ShardRecord = serde_json::from_str(json).unwrap();
        assert!(parsed.key.is_empty());

        let record = Record::try_from(parsed).unwrap();
        assert_eq!(record.key(), "st2014-04-01");
    }

    #[test]
    fn test_shard_record_rejects_string_revenue() {
        let json = r#"{"STB":"s","TITLE":"t","PROVIDER":"p","DATE":"2014-04-01","REV":"1","VIEW_TIME":"0:05"}"#;
        assert!(serde_json::from_str::<ShardRecord>(json).is_err());
    }

    #[test]
    fn test_import_stats_merge() {
        let mut total = ImportStats::default();
        let stats = ImportStats {
            lines: 4,
            added: 2,
            replaced: 1,
            skipped: 1,
            shards_written: 1,
            export: ExportStats {
                appended: 2,
                ..ExportStats::default()
            },
        };
        total.merge(&stats);
        total.merge(&stats);

        assert_eq!(total.lines, 8);
        assert_eq!(total.accepted(), 6);
        assert_eq!(total.export.appended, 4);
    }
}
