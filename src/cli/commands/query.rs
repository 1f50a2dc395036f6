//! Query command implementation.

use crate::config::StoreConfig;
use crate::error::Result;
use crate::query::{run_query, QueryOptions};
use crate::shard::list_shards;
use std::path::PathBuf;

/// Execute the query command.
///
/// With no `--shard`, every auto-named shard in the shard directory is read.
///
/// # Errors
///
/// Returns an error for an unknown field, a malformed filter, or a shard
/// that cannot be read.
pub fn execute(
    shards: &[PathBuf],
    select: Option<&str>,
    order: Option<&str>,
    filter: Option<&str>,
    config: &StoreConfig,
    json: bool,
) -> Result<()> {
    let options = QueryOptions::parse(select, order, filter)?;

    let shards = if shards.is_empty() {
        list_shards(&config.shard_dir, &config.base_name)?
            .into_iter()
            .map(|(_, path)| path)
            .collect()
    } else {
        shards.to_vec()
    };

    let rows = run_query(&shards, &options)?;

    if json {
        let output = serde_json::json!({
            "fields": options.fields(),
            "count": rows.len(),
            "rows": rows,
        });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        for row in &rows {
            println!("{row}");
        }
    }

    Ok(())
}
