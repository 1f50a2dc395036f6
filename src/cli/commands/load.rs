//! Load command implementation.

use crate::error::{Error, Result};
use crate::shard::{ExportStats, ImportStats};
use crate::store::RecordStore;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct LoadOutput {
    shards: Vec<String>,
    stats: ImportStats,
    distinct_records: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    export: Option<ExportReport>,
}

#[derive(Serialize)]
struct ExportReport {
    path: String,
    stats: ExportStats,
}

/// Execute the load command.
///
/// Every named shard must exist; elements that aren't valid records are
/// skipped with a warning.
///
/// # Errors
///
/// Returns `Error::ShardNotFound` for a missing shard, or an error if a
/// shard is not a JSON array or the export fails.
pub fn execute(shards: &[PathBuf], export: Option<&Path>, json: bool) -> Result<()> {
    let mut store = RecordStore::new();
    let mut stats = ImportStats::default();

    for shard in shards {
        if !shard.exists() {
            return Err(Error::ShardNotFound {
                path: shard.display().to_string(),
            });
        }
        stats.merge(&store.import_from_json(shard)?);
    }

    let distinct_records = store.count();
    let export = export
        .map(|target| {
            store.export_to_json(target).map(|stats| ExportReport {
                path: target.display().to_string(),
                stats,
            })
        })
        .transpose()?;

    if json {
        let output = LoadOutput {
            shards: shards.iter().map(|p| p.display().to_string()).collect(),
            stats,
            distinct_records,
            export,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!(
        "Loaded {} elements from {} shards: {distinct_records} distinct records",
        stats.lines,
        shards.len()
    );
    if stats.skipped > 0 {
        println!("  Skipped: {}", stats.skipped);
    }
    if let Some(report) = export {
        println!(
            "  Exported {} records to {}",
            report.stats.total(),
            report.path
        );
    }

    Ok(())
}
