//! Storage node addresses and stored-file handles

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

// == Location ==
/// Addresses of one storage node.
///
/// `public_url` is the externally reachable address used for reads and
/// writes, `url` the address the cluster uses internally. Equality and
/// hashing cover both.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    #[serde(rename = "publicUrl")]
    public_url: String,
    url: String,
}

impl Location {
    /// Creates a location from its public and internal addresses.
    pub fn new(public_url: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            public_url: public_url.into(),
            url: url.into(),
        }
    }

    pub fn public_url(&self) -> &str {
        &self.public_url
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.public_url)
    }
}

// == File Handle ==
/// Handle to one stored file: the master-issued fid plus an optional version.
///
/// A version of 0 means the storage path carries no version suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileHandle {
    fid: String,
    version: u32,
}

impl FileHandle {
    /// Creates an unversioned handle.
    pub fn new(fid: impl Into<String>) -> Self {
        Self::with_version(fid, 0)
    }

    /// Creates a handle addressing a specific version of the file.
    pub fn with_version(fid: impl Into<String>, version: u32) -> Self {
        Self {
            fid: fid.into(),
            version,
        }
    }

    pub fn fid(&self) -> &str {
        &self.fid
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    // == Storage Path ==
    /// Path segment on the storage node: `<fid>` or `<fid>_<version>`.
    pub fn storage_path(&self) -> String {
        if self.version > 0 {
            format!("{}_{}", self.fid, self.version)
        } else {
            self.fid.clone()
        }
    }

    // == Volume Id ==
    /// Parses the volume id out of a `<volume>,<key><cookie>` fid.
    pub fn volume_id(&self) -> Result<u64> {
        let (volume, _) = self
            .fid
            .split_once(',')
            .ok_or_else(|| ClientError::InvalidFid(self.fid.clone()))?;

        volume
            .trim()
            .parse()
            .map_err(|_| ClientError::InvalidFid(self.fid.clone()))
    }
}

impl fmt::Display for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.storage_path())
    }
}
