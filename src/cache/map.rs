//! Unbounded Lookup Cache
//!
//! Keeps every volume location until it is invalidated. Suited to clusters
//! whose volume placement does not move while the process runs.

use dashmap::DashMap;
use tracing::debug;

use super::LookupCache;
use crate::models::Location;

// == Map Lookup Cache ==
/// Lookup cache with no eviction and no expiry.
///
/// Backed by a sharded concurrent map, so reads and writes for different
/// volumes never wait on a cache-wide lock.
#[derive(Debug, Default)]
pub struct MapLookupCache {
    entries: DashMap<u64, Vec<Location>>,
}

impl MapLookupCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached volumes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl LookupCache for MapLookupCache {
    fn invalidate_all(&self) {
        self.entries.clear();
    }

    fn invalidate(&self, volume_id: u64) {
        self.entries.remove(&volume_id);
    }

    fn lookup(&self, volume_id: u64) -> Option<Vec<Location>> {
        self.entries
            .get(&volume_id)
            .map(|entry| entry.value().clone())
    }

    fn set_location(&self, volume_id: u64, locations: &[Location]) {
        if locations.is_empty() {
            return;
        }

        debug!(volume_id, count = locations.len(), "Caching volume locations");
        self.entries.insert(volume_id, locations.to_vec());
    }
}
