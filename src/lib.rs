//! WeedFS Client - An async client for a master/volume blob store
//!
//! Assigns file ids and resolves volume locations through the master, moves
//! file bytes to and from storage nodes, and caches volume locations with a
//! pluggable strategy.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod models;

pub use cache::{LookupCache, MapLookupCache, TimedLookupCache};
pub use client::{FileStream, WeedClient};
pub use config::{CacheStrategy, ClientConfig};
pub use error::{ClientError, Result};
pub use models::{
    AssignParams, Assignation, FileHandle, Location, MasterStatus, Payload, ReplicationStrategy,
    VolumeStatus,
};
