//! stbs - a de-duplicating store for set-top box usage records
//!
//! Records arrive as `|`-delimited text lines, are de-duplicated in memory
//! by their `STB + TITLE + DATE` key, and are exported to JSON array shards.
//! A record exported once keeps its shard slot: later exports of the same
//! key patch that slot in place.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - The record and its shard location
//! - [`store`] - Working set, location index, import and export
//! - [`shard`] - JSON shard files, hashing, and status
//! - [`query`] - Select/order/filter over exported shards
//! - [`config`] - Shard directory, naming, and size resolution
//! - [`validate`] - Field parsing and field-name normalization
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod query;
pub mod shard;
pub mod store;
pub mod validate;

pub use error::{Error, Result};
pub use model::{Location, Record};
pub use store::RecordStore;
