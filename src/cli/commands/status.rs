//! Status command implementation.

use crate::config::StoreConfig;
use crate::error::Result;
use crate::shard::{print_status, shard_status};

/// Execute the status command.
///
/// # Errors
///
/// Returns an error if the shard directory cannot be read.
pub fn execute(config: &StoreConfig, json: bool) -> Result<()> {
    let status = shard_status(&config.shard_dir, &config.base_name)?;

    if json {
        println!("{}", serde_json::to_string(&status)?);
    } else {
        print_status(&status);
    }

    Ok(())
}
