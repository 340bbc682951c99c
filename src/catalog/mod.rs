//! Object identifier → element set lookup.
//!
//! Built once from the full element catalog, read-only afterwards. When the
//! catalog lists an identifier more than once, the first entry wins; later
//! duplicates are counted but never consulted.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::domain::{CatalogEntry, ObjectId};

#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    entries: HashMap<ObjectId, CatalogEntry>,
    duplicates: usize,
    unidentified: usize,
}

impl CatalogIndex {
    pub fn build(catalog: Vec<CatalogEntry>) -> Self {
        let mut index = Self {
            entries: HashMap::with_capacity(catalog.len()),
            ..Self::default()
        };

        for entry in catalog {
            let Some(id) = entry.id.clone() else {
                index.unidentified += 1;
                continue;
            };
            match index.entries.entry(id) {
                Entry::Occupied(_) => index.duplicates += 1,
                Entry::Vacant(slot) => {
                    slot.insert(entry);
                }
            }
        }

        index
    }

    /// Absence is a normal outcome, not an error.
    pub fn lookup(&self, id: &ObjectId) -> Option<&CatalogEntry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ignored because their identifier was already indexed.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Entries ignored because they carried no identifier.
    pub fn unidentified(&self) -> usize {
        self.unidentified
    }
}
