//! Error types for the blob store client
//!
//! Provides unified error handling using thiserror. Every failure surfaces
//! to the caller with enough context (raw body, status, file identity) to
//! decide whether to retry, invalidate a cache entry, or give up. Nothing is
//! retried inside the client.

use thiserror::Error;

use crate::models::{FileHandle, Location};

// == Client Error Enum ==
/// Unified error type for the blob store client.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Connection or protocol failure reported by the HTTP transport
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Local I/O failure, also used for non-200 answers on status endpoints
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Response body did not match the expected JSON schema
    #[error("unable to parse JSON from server: {body}")]
    Parse {
        /// Raw response body, verbatim
        body: String,
        source: serde_json::Error,
    },

    /// Master answered an assignment with an in-band error
    #[error("assignment failed: {0}")]
    Assignment(String),

    /// Master answered a volume lookup with an in-band error
    #[error("lookup failed: {0}")]
    Lookup(String),

    /// Upload rejected, either locally or through an in-band error
    #[error("write failed: {0}")]
    Write(String),

    /// Storage node has no such file
    #[error("file {file} not found on {location}")]
    NotFound { file: FileHandle, location: Location },

    /// Storage node answered a read with an unexpected status
    #[error("error reading file {fid} on {address}: {status} {reason}")]
    Read {
        fid: String,
        address: String,
        status: u16,
        reason: String,
    },

    /// Storage node answered a delete with a non-2xx status
    #[error("{message}")]
    Delete {
        message: String,
        /// Raw response body, for diagnostics
        body: String,
    },

    /// File id does not start with a numeric volume id
    #[error("invalid file id: {0}")]
    InvalidFid(String),
}

impl ClientError {
    /// Returns true when a read found no file at the requested location.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
    }

    /// Returns true for failures the server signalled inside a decoded body.
    pub fn is_semantic(&self) -> bool {
        matches!(
            self,
            ClientError::Assignment(_) | ClientError::Lookup(_) | ClientError::Write(_)
        )
    }

    /// Raw response body attached to the error, if any.
    pub fn body(&self) -> Option<&str> {
        match self {
            ClientError::Parse { body, .. } | ClientError::Delete { body, .. } => Some(body),
            _ => None,
        }
    }

    /// HTTP status attached to the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Read { status, .. } => Some(*status),
            ClientError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the client.
pub type Result<T> = std::result::Result<T, ClientError>;
