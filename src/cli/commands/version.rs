//! Version command implementation.

use crate::config::DEFAULT_BASE_NAME;
use crate::error::Result;
use crate::validate::LINE_FIELD_COUNT;
use serde::Serialize;

#[derive(Serialize)]
struct VersionOutput<'a> {
    name: &'a str,
    version: &'a str,
    build: &'a str,
    line_fields: usize,
    default_base_name: &'a str,
}

/// Execute the version command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(json: bool) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let build = if cfg!(debug_assertions) {
        "dev"
    } else {
        "release"
    };

    if json {
        let output = VersionOutput {
            name: "stbs",
            version,
            build,
            line_fields: LINE_FIELD_COUNT,
            default_base_name: DEFAULT_BASE_NAME,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("stbs version {version} ({build})");
    Ok(())
}
