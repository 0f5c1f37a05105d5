//! Lookup Cache Module
//!
//! Caches the volume id → storage node mapping resolved by the master.
//! Two strategies implement [`LookupCache`]: [`MapLookupCache`] keeps
//! entries until they are invalidated, [`TimedLookupCache`] forgets them
//! once a freshness window has passed.

mod clock;
mod map;
mod timed;


// Re-export public types
pub use clock::{current_timestamp_ms, Clock, ManualClock, SystemClock};
pub use map::MapLookupCache;
pub use timed::TimedLookupCache;

use std::fmt::Debug;

use crate::models::Location;

// == Lookup Cache ==
/// Read-through cache of volume locations.
///
/// Implementations only ever hold non-empty location lists: populating a
/// volume with no locations leaves the cache untouched.
pub trait LookupCache: Debug + Send + Sync {
    /// Drops every entry.
    fn invalidate_all(&self);

    /// Drops the entry for one volume.
    fn invalidate(&self, volume_id: u64);

    /// Cached locations for a volume, or `None` if the master must be asked.
    fn lookup(&self, volume_id: u64) -> Option<Vec<Location>>;

    /// Stores or overwrites the locations of a volume. No-op when empty.
    fn set_location(&self, volume_id: u64, locations: &[Location]);
}
