//! Response DTOs decoded from master and storage node answers
//!
//! The store signals application errors in-band: a body can decode cleanly
//! under a 200 status and still carry an `error` field. Every DTO exposes
//! that field through [`InBandError`] so callers check it separately from
//! the transport status.

use serde::{Deserialize, Deserializer};

use crate::error::{ClientError, Result};
use crate::models::{FileHandle, Location};

// == In-Band Error ==
/// Access to the `error` field carried inside a decoded body.
pub trait InBandError {
    /// Raw `error` field as decoded.
    fn raw_error(&self) -> Option<&str>;

    /// The error message, if present and non-empty.
    fn in_band_error(&self) -> Option<&str> {
        self.raw_error().filter(|message| !message.is_empty())
    }
}

// == Assign Outcome ==
/// Raw answer of `GET /dir/assign`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssignOutcome {
    #[serde(default)]
    pub fid: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, rename = "publicUrl")]
    pub public_url: String,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub error: Option<String>,
}

impl InBandError for AssignOutcome {
    fn raw_error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

// == Assignation ==
/// A freshly assigned file id and the storage node that should receive it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignation {
    /// Assigned file id
    pub fid: String,
    /// Storage node to upload to
    pub primary_location: Location,
    /// Number of ids reserved under this fid
    pub replica_count: u32,
}

impl Assignation {
    /// Handle addressing the first (unversioned) file of this assignment.
    pub fn file_handle(&self) -> FileHandle {
        FileHandle::new(self.fid.clone())
    }
}

impl TryFrom<AssignOutcome> for Assignation {
    type Error = ClientError;

    fn try_from(outcome: AssignOutcome) -> Result<Self> {
        if let Some(message) = outcome.in_band_error() {
            return Err(ClientError::Assignment(message.to_string()));
        }

        if outcome.fid.is_empty() {
            return Err(ClientError::Assignment(
                "master returned an empty fid".to_string(),
            ));
        }

        Ok(Self {
            fid: outcome.fid,
            primary_location: Location::new(outcome.public_url, outcome.url),
            replica_count: outcome.count,
        })
    }
}

// == Lookup Outcome ==
/// Raw answer of `GET /dir/lookup`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LookupOutcome {
    #[serde(
        default,
        rename = "volumeId",
        alias = "volumeOrFileId",
        deserialize_with = "volume_id_from_number_or_string"
    )]
    pub volume_id: u64,
    #[serde(default)]
    locations: Option<Vec<Location>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl LookupOutcome {
    pub fn locations(&self) -> &[Location] {
        self.locations.as_deref().unwrap_or_default()
    }

    pub fn into_locations(self) -> Vec<Location> {
        self.locations.unwrap_or_default()
    }
}

impl InBandError for LookupOutcome {
    fn raw_error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Masters report the volume id either as a number or as a numeric string.
fn volume_id_from_number_or_string<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawVolumeId {
        Number(u64),
        Text(String),
    }

    match RawVolumeId::deserialize(deserializer)? {
        RawVolumeId::Number(id) => Ok(id),
        RawVolumeId::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

// == Write Outcome ==
/// Raw answer of a multipart upload to a storage node.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WriteOutcome {
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub error: Option<String>,
}

impl InBandError for WriteOutcome {
    fn raw_error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

// == Status Snapshots ==
/// Status document of the master, passed through uninterpreted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct MasterStatus(serde_json::Value);

/// Status document of a storage node, passed through uninterpreted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct VolumeStatus(serde_json::Value);

macro_rules! status_accessors {
    ($($status:ident),*) => {$(
        impl $status {
            /// Top-level field of the status document.
            pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
                self.0.get(key)
            }

            pub fn as_value(&self) -> &serde_json::Value {
                &self.0
            }

            pub fn into_value(self) -> serde_json::Value {
                self.0
            }
        }
    )*};
}

status_accessors!(MasterStatus, VolumeStatus);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_outcome_deserialize() {
        let json = r#"{"fid":"3,01637037d6","url":"127.0.0.1:8080","publicUrl":"localhost:8080","count":1}"#;
        let outcome: AssignOutcome = serde_json::from_str(json).unwrap();
        assert!(outcome.in_band_error().is_none());

        let assignation = Assignation::try_from(outcome).unwrap();
        assert_eq!(assignation.fid, "3,01637037d6");
        assert_eq!(assignation.primary_location.public_url(), "localhost:8080");
        assert_eq!(assignation.primary_location.url(), "127.0.0.1:8080");
        assert_eq!(assignation.replica_count, 1);
        assert_eq!(assignation.file_handle().fid(), "3,01637037d6");
    }

    #[test]
    fn test_assign_error_only_body() {
        let outcome: AssignOutcome =
            serde_json::from_str(r#"{"error":"No free volumes left!"}"#).unwrap();

        let err = Assignation::try_from(outcome).unwrap_err();
        assert!(matches!(err, ClientError::Assignment(ref m) if m == "No free volumes left!"));
    }

    #[test]
    fn test_assign_empty_fid_rejected() {
        let outcome: AssignOutcome = serde_json::from_str(r#"{"count":1}"#).unwrap();
        assert!(matches!(
            Assignation::try_from(outcome),
            Err(ClientError::Assignment(_))
        ));
    }

    #[test]
    fn test_empty_error_is_absent() {
        let outcome: WriteOutcome = serde_json::from_str(r#"{"size":12,"error":""}"#).unwrap();
        assert!(outcome.in_band_error().is_none());
        assert_eq!(outcome.raw_error(), Some(""));
    }

    #[test]
    fn test_lookup_volume_id_variants() {
        let numeric: LookupOutcome =
            serde_json::from_str(r#"{"volumeId":3,"locations":[]}"#).unwrap();
        assert_eq!(numeric.volume_id, 3);

        let text: LookupOutcome =
            serde_json::from_str(r#"{"volumeOrFileId":"7","locations":[]}"#).unwrap();
        assert_eq!(text.volume_id, 7);
    }

    #[test]
    fn test_lookup_locations() {
        let json = r#"{"volumeId":"3","locations":[
            {"url":"127.0.0.1:8080","publicUrl":"localhost:8080"},
            {"url":"127.0.0.1:8081","publicUrl":"localhost:8081"}
        ]}"#;
        let outcome: LookupOutcome = serde_json::from_str(json).unwrap();
        assert_eq!(outcome.locations().len(), 2);
        assert_eq!(outcome.locations()[1].public_url(), "localhost:8081");
    }

    #[test]
    fn test_lookup_null_locations() {
        let outcome: LookupOutcome =
            serde_json::from_str(r#"{"volumeId":3,"locations":null,"error":"volume id 3 not found"}"#)
                .unwrap();
        assert!(outcome.locations().is_empty());
        assert_eq!(outcome.in_band_error(), Some("volume id 3 not found"));
    }

    #[test]
    fn test_write_outcome_in_band_error() {
        let outcome: WriteOutcome = serde_json::from_str(r#"{"error":"out of space"}"#).unwrap();
        assert_eq!(outcome.in_band_error(), Some("out of space"));
        assert_eq!(outcome.size, 0);
    }

    #[test]
    fn test_status_passthrough() {
        let status: MasterStatus =
            serde_json::from_str(r#"{"Version":"0.70","Topology":{"Max":10}}"#).unwrap();
        assert_eq!(status.get("Version").and_then(|v| v.as_str()), Some("0.70"));
        assert!(status.as_value().get("Topology").is_some());
    }
}
