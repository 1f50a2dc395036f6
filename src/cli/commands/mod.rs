//! Command implementations.

pub mod completions;
pub mod ingest;
pub mod load;
pub mod query;
pub mod status;
pub mod version;
