//! The record store.
//!
//! Holds the working set of de-duplicated records awaiting export and the
//! location index of everything exported so far. An export routes each
//! working-set record one of two ways:
//!
//! - **Known key**: queued as an update to the shard slot recorded when the
//!   key was first exported
//! - **New key**: appended to the target shard, its slot recorded in the index
//!
//! Updates are grouped by target file (lexicographic order, slots ascending)
//! so every touched shard is read once and written once per export.
//!
//! # Sharding
//!
//! With `max_records_per_shard` set, [`RecordStore::import_from_file`] rolls
//! the working set over into the next auto-named shard each time the
//! cumulative count of added records reaches a multiple of the threshold.
//!
//! # Example
//!
//! ```ignore
//! use stbs::store::RecordStore;
//!
//! let mut store = RecordStore::new();
//! store.import_from_file(Path::new("usage.txt"))?;
//! store.export_to_json(Path::new("data.json"))?;
//! ```

mod index;

pub use index::LocationIndex;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::model::{FormatError, Location, PendingUpdate, Record};
use crate::shard::{
    content_hash, has_changed, list_shards, normalize_path, read_shard, write_shard, ExportStats,
    ImportStats, ShardError, ShardRecord, ShardResult,
};

/// In-memory de-duplicating record store.
#[derive(Debug)]
pub struct RecordStore {
    config: StoreConfig,
    working: BTreeMap<String, Record>,
    index: LocationIndex,
    added_total: usize,
    next_shard: usize,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-file outcome of the update pass.
#[derive(Debug, Default)]
struct PatchOutcome {
    updated: usize,
    unchanged: usize,
}

impl RecordStore {
    /// Create an empty store with the default config.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create an empty store.
    #[must_use]
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            config,
            working: BTreeMap::new(),
            index: LocationIndex::new(),
            added_total: 0,
            next_shard: 1,
        }
    }

    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Number of keys with a known shard location.
    #[must_use]
    pub fn indexed_count(&self) -> usize {
        self.index.len()
    }

    /// Number of distinct keys in the working set.
    #[must_use]
    pub fn count(&self) -> usize {
        self.working.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.working.is_empty()
    }

    /// Working-set records in key order.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.working.values()
    }

    /// Where the record for `key` was first exported, if it has been.
    #[must_use]
    pub fn location_of(&self, key: &str) -> Option<&Location> {
        self.index.get(key)
    }

    /// Insert or replace the working-set entry for the record's key.
    ///
    /// Returns the replaced record, if any.
    pub fn add_record(&mut self, record: Record) -> Option<Record> {
        self.added_total += 1;
        self.working.insert(record.key(), record)
    }

    fn shard_boundary_reached(&self) -> bool {
        self.config
            .max_records_per_shard
            .is_some_and(|max| self.added_total % max.get() == 0)
    }

    /// Import every line of a delimited text file.
    ///
    /// A file that cannot be opened is logged and treated as empty. A line
    /// that fails to parse is logged with its content and skipped. Blank
    /// lines are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error only if an automatic shard roll-over fails to export.
    pub fn import_from_file(&mut self, path: &Path) -> ShardResult<ImportStats> {
        let mut stats = ImportStats::default();

        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not open input file");
                return Ok(stats);
            }
        };

        for (line_num, line) in BufReader::new(file).lines().enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(e) if e.kind() == ErrorKind::InvalidData => {
                    warn!(line = line_num + 1, error = %e, "Skipping undecodable line");
                    stats.lines += 1;
                    stats.skipped += 1;
                    continue;
                }
                Err(e) => {
                    warn!(path = %path.display(), line = line_num + 1, error = %e, "Stopped reading input file");
                    break;
                }
            };

            stats.lines += 1;
            if line.trim().is_empty() {
                continue;
            }

            match Record::parse_line(&line) {
                Ok(record) => {
                    if self.add_record(record).is_some() {
                        stats.replaced += 1;
                    } else {
                        stats.added += 1;
                    }

                    if self.shard_boundary_reached() {
                        let (_, export) = self.export_next_shard()?;
                        stats.shards_written += 1;
                        stats.export.merge(&export);
                    }
                }
                Err(e) => {
                    warn!(line = line_num + 1, content = %line, error = %e, "Skipping malformed record");
                    stats.skipped += 1;
                }
            }
        }

        info!(
            path = %path.display(),
            lines = stats.lines,
            added = stats.added,
            replaced = stats.replaced,
            skipped = stats.skipped,
            shards = stats.shards_written,
            "Imported records"
        );

        Ok(stats)
    }

    /// Import records from a JSON shard.
    ///
    /// A missing file is not an error: a fresh store has nothing to load.
    /// Elements that are not well-formed records are logged and skipped.
    /// Loaded records join the working set; their shard slots are not
    /// indexed (see [`RecordStore::attach_shard`] for that).
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is not a JSON array.
    pub fn import_from_json(&mut self, path: &Path) -> ShardResult<ImportStats> {
        let mut stats = ImportStats::default();

        if !path.exists() {
            info!(path = %path.display(), "No shard to import");
            return Ok(stats);
        }

        for (i, element) in read_shard(path)?.into_iter().enumerate() {
            stats.lines += 1;

            let parsed = serde_json::from_value::<ShardRecord>(element)
                .map_err(|e| FormatError::InvalidElement(e.to_string()))
                .and_then(Record::try_from);

            match parsed {
                Ok(record) => {
                    if self.add_record(record).is_some() {
                        stats.replaced += 1;
                    } else {
                        stats.added += 1;
                    }
                }
                Err(e) => {
                    warn!(path = %path.display(), index = i, error = %e, "Skipping malformed shard element");
                    stats.skipped += 1;
                }
            }
        }

        info!(
            path = %path.display(),
            added = stats.added,
            replaced = stats.replaced,
            skipped = stats.skipped,
            "Loaded shard"
        );

        Ok(stats)
    }

    /// Register the slots of an existing shard in the location index.
    ///
    /// Each element's `KEY` (or, if absent, the key rebuilt from its fields)
    /// is mapped to its array position. Keys already mapped keep their
    /// first location. The working set is not touched.
    ///
    /// Returns the number of newly registered keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the shard cannot be read or is not a JSON array.
    pub fn attach_shard(&mut self, path: &Path) -> ShardResult<usize> {
        let path = normalize_path(path)?;
        let path = path.as_path();
        let mut registered = 0;

        for (index, element) in read_shard(path)?.iter().enumerate() {
            let Some(key) = element_key(element) else {
                warn!(path = %path.display(), index, "Shard element has no usable key");
                continue;
            };
            if self.index.register(key, Location::new(path, index)) {
                registered += 1;
            }
        }

        debug!(path = %path.display(), registered, "Attached shard");
        Ok(registered)
    }

    /// Attach every auto-named shard in the configured shard directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or any shard cannot be read.
    pub fn attach_existing_shards(&mut self) -> ShardResult<usize> {
        let mut registered = 0;
        for (_, path) in list_shards(&self.config.shard_dir, &self.config.base_name)? {
            registered += self.attach_shard(&path)?;
        }
        Ok(registered)
    }

    /// Export the working set to the next auto-named shard, if non-empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the export fails.
    pub fn flush(&mut self) -> ShardResult<Option<(PathBuf, ExportStats)>> {
        if self.working.is_empty() {
            return Ok(None);
        }
        self.export_next_shard().map(Some)
    }

    /// Export to the lowest-numbered auto-named shard that doesn't exist yet.
    fn export_next_shard(&mut self) -> ShardResult<(PathBuf, ExportStats)> {
        while self.config.shard_path(self.next_shard).exists() {
            self.next_shard += 1;
        }

        let path = self.config.shard_path(self.next_shard);
        debug!(path = %path.display(), records = self.working.len(), "Rolling over to new shard");

        let stats = self.export_to_json(&path)?;
        self.next_shard += 1;
        Ok((path, stats))
    }

    /// Export the working set.
    ///
    /// Records whose key was exported before are patched at their original
    /// slot; the rest are appended to `target`, which is written even if
    /// nothing new lands in it. If `target` already holds indexed records
    /// its existing elements are kept and new records follow them.
    ///
    /// Shard paths are normalized first, so the same file reached through
    /// a different spelling is still recognized as indexed.
    ///
    /// The index is extended and the working set cleared only once every
    /// write succeeded. Shards patched before a failure stay patched.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An update target cannot be read or is not a JSON array
    /// - An indexed slot no longer exists in its shard
    /// - Any shard cannot be written
    pub fn export_to_json(&mut self, target: &Path) -> ShardResult<ExportStats> {
        let target = normalize_path(target)?;
        let target = target.as_path();
        let mut stats = ExportStats::default();
        let mut updates: BTreeMap<PathBuf, Vec<PendingUpdate>> = BTreeMap::new();
        let mut fresh: Vec<(&String, ShardRecord)> = Vec::new();

        for (key, record) in &self.working {
            match self.index.get(key) {
                Some(location) => updates
                    .entry(location.file.clone())
                    .or_default()
                    .push(PendingUpdate {
                        location: location.clone(),
                        record: record.clone(),
                    }),
                None => fresh.push((key, ShardRecord::from(record))),
            }
        }

        let mut elements = if self.index.knows_file(target) {
            read_shard(target)?
        } else {
            Vec::new()
        };

        if let Some(mut own) = updates.remove(target) {
            let outcome = patch_elements(target, &mut elements, &mut own)?;
            stats.updated += outcome.updated;
            stats.unchanged += outcome.unchanged;
        }

        for (file, group) in &mut updates {
            let mut patched = read_shard(file)?;
            let outcome = patch_elements(file, &mut patched, group)?;
            debug!(
                path = %file.display(),
                updated = outcome.updated,
                unchanged = outcome.unchanged,
                "Update group"
            );

            if outcome.updated > 0 {
                write_shard(file, &patched)?;
                stats.files_patched += 1;
            }
            stats.updated += outcome.updated;
            stats.unchanged += outcome.unchanged;
        }

        let base = elements.len();
        let mut new_locations = Vec::with_capacity(fresh.len());
        for (offset, (key, rec)) in fresh.into_iter().enumerate() {
            elements.push(serde_json::to_value(&rec)?);
            new_locations.push((key.clone(), Location::new(target, base + offset)));
        }

        write_shard(target, &elements)?;

        stats.appended = new_locations.len();
        for (key, location) in new_locations {
            self.index.register(key, location);
        }
        self.working.clear();

        info!(
            path = %target.display(),
            appended = stats.appended,
            updated = stats.updated,
            unchanged = stats.unchanged,
            files_patched = stats.files_patched,
            "Exported records"
        );

        Ok(stats)
    }
}

/// Apply queued updates to one shard's elements, slots ascending.
fn patch_elements(
    path: &Path,
    elements: &mut [Value],
    group: &mut [PendingUpdate],
) -> ShardResult<PatchOutcome> {
    group.sort_by_key(|u| u.location.index);

    let mut outcome = PatchOutcome::default();
    let len = elements.len();

    for update in group.iter() {
        let slot = elements
            .get_mut(update.location.index)
            .ok_or_else(|| ShardError::StaleLocation {
                path: path.display().to_string(),
                index: update.location.index,
                len,
            })?;

        let replacement = serde_json::to_value(ShardRecord::from(&update.record))?;
        let stored = content_hash(&*slot)?;
        if has_changed(&content_hash(&replacement)?, Some(stored.as_str())) {
            *slot = replacement;
            outcome.updated += 1;
        } else {
            outcome.unchanged += 1;
        }
    }

    Ok(outcome)
}

/// The de-duplication key of a shard element.
fn element_key(element: &Value) -> Option<String> {
    if let Some(key) = element
        .get("KEY")
        .and_then(Value::as_str)
        .filter(|k| !k.is_empty())
    {
        return Some(key.to_string());
    }

    let rec: ShardRecord = serde_json::from_value(element.clone()).ok()?;
    Record::try_from(rec).ok().map(|r| r.key())
}
