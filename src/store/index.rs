//! Location index: record key → shard slot of its first export.
//!
//! Entries are only ever added. Once a key is mapped, later exports of the
//! same key patch that slot instead of relocating the record, so a key has
//! one stable home for the lifetime of the store.
//!
//! Paths are compared as given; the store normalizes them before they get
//! here.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::model::Location;

#[derive(Debug, Default, Clone)]
pub struct LocationIndex {
    entries: HashMap<String, Location>,
    files: HashSet<PathBuf>,
}

impl LocationIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Location> {
        self.entries.get(key)
    }

    /// Map `key` to `location` unless it is already mapped.
    ///
    /// Returns `true` if the entry was added.
    pub fn register(&mut self, key: String, location: Location) -> bool {
        match self.entries.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                if !self.files.contains(&location.file) {
                    self.files.insert(location.file.clone());
                }
                slot.insert(location);
                true
            }
        }
    }

    /// Whether any key is mapped into `file`.
    #[must_use]
    pub fn knows_file(&self, file: &Path) -> bool {
        self.files.contains(file)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_keeps_first_location() {
        let mut index = LocationIndex::new();

        assert!(index.register("k1".to_string(), Location::new("a.json", 0)));
        assert!(!index.register("k1".to_string(), Location::new("b.json", 5)));

        assert_eq!(index.get("k1"), Some(&Location::new("a.json", 0)));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_knows_file() {
        let mut index = LocationIndex::new();
        index.register("k1".to_string(), Location::new("a.json", 0));

        assert!(index.knows_file(Path::new("a.json")));
        assert!(!index.knows_file(Path::new("b.json")));
    }

    #[test]
    fn test_rejected_register_does_not_add_file() {
        let mut index = LocationIndex::new();
        index.register("k1".to_string(), Location::new("a.json", 0));
        index.register("k1".to_string(), Location::new("b.json", 0));

        assert!(!index.knows_file(Path::new("b.json")));
    }

    #[test]
    fn test_empty_index() {
        let index = LocationIndex::new();
        assert!(index.is_empty());
        assert!(index.get("anything").is_none());
        assert!(!index.knows_file(Path::new("a.json")));
    }
}
