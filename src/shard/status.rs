//! Shard directory status display.
//!
//! Lists the auto-named shards in a directory with their sizes, record
//! counts and content fingerprints.

use std::fs;
use std::path::Path;

use colored::Colorize;

use crate::shard::file::{count_records, file_size, list_shards};
use crate::shard::hash::bytes_hash;
use crate::shard::types::{ShardFileInfo, ShardResult, ShardStatus};

/// Get the status of the shards in `dir` named `{base_name}N.json`.
///
/// A shard that exists but cannot be parsed is still listed, with no
/// record count.
///
/// # Errors
///
/// Returns an error if the directory or a shard file cannot be read.
pub fn shard_status(dir: &Path, base_name: &str) -> ShardResult<ShardStatus> {
    let mut shards = Vec::new();
    let mut total_records = 0;
    let mut total_size = 0;

    for (_, path) in list_shards(dir, base_name)? {
        let bytes = fs::read(&path)?;
        let size = file_size(&path);
        let record_count = count_records(&path).ok();

        total_records += record_count.unwrap_or(0);
        total_size += size;

        shards.push(ShardFileInfo {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            size,
            record_count,
            fingerprint: bytes_hash(&bytes),
        });
    }

    Ok(ShardStatus {
        dir: dir.display().to_string(),
        base_name: base_name.to_string(),
        shards,
        total_records,
        total_size,
    })
}

/// Print shard status to stdout in a human-readable format.
pub fn print_status(status: &ShardStatus) {
    println!("{}", "Shard Status".bold().underline());
    println!();
    println!("  Directory: {}", status.dir);
    println!("  Base name: {}", status.base_name);
    println!();

    if status.shards.is_empty() {
        println!("{}", "No shard files found.".dimmed());
        println!(
            "{}",
            "Run 'stbs ingest <file>' to create the first shard.".dimmed()
        );
        return;
    }

    println!("{}", "Shard Files:".blue().bold());
    for shard in &status.shards {
        let count = shard
            .record_count
            .map_or_else(|| "unreadable".red().to_string(), |c| format!("{c} records"));
        println!(
            "  {} ({}, {}) {}",
            shard.name,
            format_size(shard.size),
            count,
            shard.fingerprint[..12].dimmed()
        );
    }
    println!();
    println!(
        "  {}: {} records in {} shards ({})",
        "Total".bold(),
        status.total_records,
        status.shards.len(),
        format_size(status.total_size)
    );
}

/// Format a byte size as a human-readable string.
#[allow(clippy::cast_precision_loss)]
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
