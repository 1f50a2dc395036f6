//! Data models for the record store.
//!
//! - Record: one immutable usage event
//! - Location: a shard file plus array slot
//! - PendingUpdate: a re-exported record bound for its original slot

pub mod location;
pub mod record;

pub use location::{Location, PendingUpdate};
pub use record::Record;
pub use crate::validate::FormatError;
