//! JSON shard storage.
//!
//! This module provides the on-disk side of the record store:
//!
//! - **File**: read/write one JSON array per shard, atomically
//! - **Types**: the flat shard element, statistics, and errors
//! - **Hashing**: SHA-256 content hashing for change detection
//! - **Status**: list shard files with sizes and record counts
//!
//! # File Format
//!
//! Each shard file is a single JSON array, no envelope or header:
//! ```json
//! [
//!   {"KEY":"stb1the matrix2014-04-01","STB":"stb1","TITLE":"the matrix",
//!    "PROVIDER":"warner bros","DATE":"2014-04-01","REV":4.0,"VIEW_TIME":"1:30"}
//! ]
//! ```

mod file;
mod hash;
mod status;
mod types;

pub use file::{
    atomic_write, count_records, file_size, list_shards, normalize_path, read_shard,
    shard_file_name, shard_number, write_shard,
};
pub use hash::{bytes_hash, content_hash, has_changed};
pub use status::{print_status, shard_status};
pub use types::{
    ExportStats, ImportStats, ShardError, ShardFileInfo, ShardRecord, ShardResult, ShardStatus,
};
