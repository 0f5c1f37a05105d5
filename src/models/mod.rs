//! Data model for the blob store client
//!
//! Value types for storage node addresses and file handles, the parameters
//! and payloads sent to the cluster, and the DTOs decoded from its answers.

pub mod location;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use location::{FileHandle, Location};
pub use requests::{AssignParams, Payload, ReplicationStrategy};
pub use responses::{
    AssignOutcome, Assignation, InBandError, LookupOutcome, MasterStatus, VolumeStatus,
    WriteOutcome,
};
