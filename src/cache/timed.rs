//! Timed Lookup Cache
//!
//! Forgets volume locations once they are older than a freshness window,
//! so topology changes in the cluster are picked up on the next lookup.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use dashmap::DashMap;
use tracing::debug;

use super::{Clock, LookupCache, SystemClock};
use crate::models::Location;

// == Timed Lookup Cache ==
/// Lookup cache whose entries go stale after a fixed window.
///
/// Each volume has its locations and the time they were last populated.
/// An entry is fresh while `now - populated_at < window`; an entry exactly
/// `window` old is stale.
///
/// `lookup` checks freshness and evicts stale entries under one cache-wide
/// mutex, so the check and the removal are a single step for every volume.
/// `set_location` does not take that mutex: a populate racing an eviction
/// can only leave the entry fresher than before.
#[derive(Debug)]
pub struct TimedLookupCache {
    /// Cached locations per volume
    locations: DashMap<u64, Vec<Location>>,
    /// Unix milliseconds of the last population per volume
    populated_at: DashMap<u64, u64>,
    /// Freshness window in milliseconds
    window_ms: u64,
    clock: Arc<dyn Clock>,
    lookup_guard: Mutex<()>,
}

impl TimedLookupCache {
    // == Constructor ==
    /// Creates a cache using wall clock time.
    ///
    /// # Arguments
    /// * `window` - How long a populated entry stays fresh
    pub fn new(window: Duration) -> Self {
        Self::with_clock(window, Arc::new(SystemClock))
    }

    /// Creates a cache reading time from `clock`.
    pub fn with_clock(window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            locations: DashMap::new(),
            populated_at: DashMap::new(),
            window_ms: u64::try_from(window.as_millis()).unwrap_or(u64::MAX),
            clock,
            lookup_guard: Mutex::new(()),
        }
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    /// Number of volumes currently held, fresh or not.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    fn cached(&self, volume_id: u64) -> Option<Vec<Location>> {
        self.locations
            .get(&volume_id)
            .map(|entry| entry.value().clone())
    }
}

impl LookupCache for TimedLookupCache {
    fn invalidate_all(&self) {
        self.locations.clear();
        self.populated_at.clear();
    }

    fn invalidate(&self, volume_id: u64) {
        self.locations.remove(&volume_id);
        self.populated_at.remove(&volume_id);
    }

    fn lookup(&self, volume_id: u64) -> Option<Vec<Location>> {
        let _guard = self
            .lookup_guard
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // Copy the timestamp out so no shard lock is held during removal.
        let populated_at = self.populated_at.get(&volume_id).map(|entry| *entry);
        let Some(populated_at) = populated_at else {
            return self.cached(volume_id);
        };

        let elapsed_ms = self.clock.now_ms().saturating_sub(populated_at);
        if elapsed_ms < self.window_ms {
            return self.cached(volume_id);
        }

        debug!(volume_id, elapsed_ms, "Evicting stale volume locations");
        self.locations.remove(&volume_id);
        self.populated_at.remove(&volume_id);
        None
    }

    fn set_location(&self, volume_id: u64, locations: &[Location]) {
        if locations.is_empty() {
            return;
        }

        debug!(volume_id, count = locations.len(), "Caching volume locations");
        self.locations.insert(volume_id, locations.to_vec());
        self.populated_at.insert(volume_id, self.clock.now_ms());
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;

    const WINDOW: Duration = Duration::from_secs(60);

    fn locations() -> Vec<Location> {
        vec![Location::new("localhost:8080", "127.0.0.1:8080")]
    }

    fn cache_with_clock() -> (TimedLookupCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let cache = TimedLookupCache::with_clock(WINDOW, clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_fresh_entry_is_served() {
        let (cache, clock) = cache_with_clock();
        cache.set_location(1, &locations());

        clock.advance(59_999);

        assert_eq!(cache.lookup(1), Some(locations()));
    }

    #[test]
    fn test_stale_entry_is_evicted() {
        let (cache, clock) = cache_with_clock();
        cache.set_location(1, &locations());

        clock.advance(120_000);

        assert!(cache.lookup(1).is_none());
        assert!(!cache.locations.contains_key(&1));
        assert!(!cache.populated_at.contains_key(&1));
    }

    #[test]
    fn test_entry_exactly_window_old_is_stale() {
        let (cache, clock) = cache_with_clock();
        cache.set_location(1, &locations());

        clock.advance(60_000);

        assert!(cache.lookup(1).is_none(), "Entry should be stale at boundary");
        assert!(cache.locations.is_empty());
        assert!(cache.populated_at.is_empty());
    }

    #[test]
    fn test_repopulate_after_eviction() {
        let (cache, clock) = cache_with_clock();
        cache.set_location(1, &locations());
        clock.advance(60_000);
        assert!(cache.lookup(1).is_none());

        cache.set_location(1, &locations());

        assert_eq!(cache.lookup(1), Some(locations()));
    }

    #[test]
    fn test_set_location_refreshes_timestamp() {
        let (cache, clock) = cache_with_clock();
        cache.set_location(1, &locations());

        clock.advance(50_000);
        cache.set_location(1, &locations());
        clock.advance(50_000);

        assert_eq!(cache.lookup(1), Some(locations()));
    }

    #[test]
    fn test_eviction_is_per_volume() {
        let (cache, clock) = cache_with_clock();
        cache.set_location(1, &locations());
        clock.advance(30_000);
        cache.set_location(2, &locations());
        clock.advance(30_000);

        assert!(cache.lookup(1).is_none());
        assert_eq!(cache.lookup(2), Some(locations()));
    }

    #[test]
    fn test_empty_set_is_noop() {
        let (cache, clock) = cache_with_clock();
        cache.set_location(1, &[]);
        assert!(cache.is_empty());
        assert!(cache.populated_at.is_empty());

        cache.set_location(2, &locations());
        clock.advance(10_000);
        cache.set_location(2, &[]);

        assert_eq!(cache.populated_at.get(&2).map(|at| *at), Some(1_000_000));
        assert_eq!(cache.lookup(2), Some(locations()));
    }

    #[test]
    fn test_invalidate_clears_both_maps() {
        let (cache, _clock) = cache_with_clock();
        cache.set_location(1, &locations());
        cache.set_location(2, &locations());

        cache.invalidate(1);
        assert!(!cache.locations.contains_key(&1));
        assert!(!cache.populated_at.contains_key(&1));
        assert!(cache.lookup(2).is_some());

        cache.invalidate_all();
        assert!(cache.locations.is_empty());
        assert!(cache.populated_at.is_empty());
    }

    #[test]
    fn test_window_accessor() {
        let cache = TimedLookupCache::new(Duration::from_secs(5));
        assert_eq!(cache.window(), Duration::from_secs(5));
    }

    #[test]
    fn test_concurrent_lookups_and_populates() {
        let cache = Arc::new(TimedLookupCache::new(Duration::from_secs(60)));

        let handles: Vec<_> = (0..8u64)
            .map(|worker| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    for volume_id in 0..100u64 {
                        if (volume_id + worker) % 2 == 0 {
                            cache.set_location(volume_id, &locations());
                        } else {
                            let _ = cache.lookup(volume_id);
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        for volume_id in 0..100u64 {
            assert_eq!(cache.lookup(volume_id), Some(locations()));
        }
    }
}
