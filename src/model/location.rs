//! Shard locations and queued in-place updates.

use std::fmt;
use std::path::PathBuf;

use super::Record;

/// Where a record's export lives: a shard file and its slot in that file's
/// JSON array.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    pub file: PathBuf,
    pub index: usize,
}

impl Location {
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, index: usize) -> Self {
        Self {
            file: file.into(),
            index,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.file.display(), self.index)
    }
}

/// A record already exported once, queued to overwrite its original slot.
#[derive(Debug, Clone)]
pub struct PendingUpdate {
    pub location: Location,
    pub record: Record,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_ordering_groups_by_file_then_index() {
        let mut locations = vec![
            Location::new("b.json", 0),
            Location::new("a.json", 3),
            Location::new("a.json", 1),
        ];
        locations.sort();

        assert_eq!(
            locations,
            vec![
                Location::new("a.json", 1),
                Location::new("a.json", 3),
                Location::new("b.json", 0),
            ]
        );
    }

    #[test]
    fn test_location_display() {
        assert_eq!(Location::new("shard1.json", 4).to_string(), "shard1.json[4]");
    }
}
