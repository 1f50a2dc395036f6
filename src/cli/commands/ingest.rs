//! Ingest command implementation.
//!
//! Existing shards in the shard directory are attached first, so a record
//! seen by an earlier run is patched where it already lives instead of
//! being written twice.

use crate::config::StoreConfig;
use crate::error::Result;
use crate::shard::ImportStats;
use crate::store::RecordStore;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Serialize)]
struct InputReport {
    path: String,
    stats: ImportStats,
}

#[derive(Serialize)]
struct IngestOutput {
    shard_dir: String,
    attached: usize,
    indexed: usize,
    inputs: Vec<InputReport>,
    totals: ImportStats,
    last_shard: Option<String>,
}

/// Execute the ingest command.
///
/// # Errors
///
/// Returns an error if an existing shard cannot be attached or an export
/// fails.
pub fn execute(inputs: &[PathBuf], config: StoreConfig, json: bool) -> Result<()> {
    let mut store = RecordStore::with_config(config);
    let shard_dir = store.config().shard_dir.display().to_string();

    let attached = store.attach_existing_shards()?;
    if attached > 0 {
        info!(keys = attached, "Attached existing shards");
    }

    let mut totals = ImportStats::default();
    let mut reports = Vec::with_capacity(inputs.len());
    for input in inputs {
        let stats = store.import_from_file(input)?;
        totals.merge(&stats);
        reports.push(InputReport {
            path: input.display().to_string(),
            stats,
        });
    }

    let last_shard = match store.flush()? {
        Some((path, export)) => {
            totals.shards_written += 1;
            totals.export.merge(&export);
            Some(path.display().to_string())
        }
        None => None,
    };

    if json {
        let output = IngestOutput {
            shard_dir,
            attached,
            indexed: store.indexed_count(),
            inputs: reports,
            totals,
            last_shard,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    for report in &reports {
        println!(
            "{}: {} lines, {} accepted ({} added, {} replaced), {} skipped",
            report.path,
            report.stats.lines,
            report.stats.accepted(),
            report.stats.added,
            report.stats.replaced,
            report.stats.skipped
        );
    }
    println!();
    println!("Export complete for: {shard_dir}");
    println!("  Appended:  {}", totals.export.appended);
    println!("  Updated:   {}", totals.export.updated);
    println!("  Unchanged: {}", totals.export.unchanged);
    if totals.export.files_patched > 0 {
        println!("  Shards patched: {}", totals.export.files_patched);
    }
    println!("  Shards written: {}", totals.shards_written);
    println!("  Records indexed: {}", store.indexed_count());
    if let Some(path) = last_shard {
        println!("  Last shard: {path}");
    }

    Ok(())
}
