//! Protocol Client
//!
//! Talks to the master to assign file ids and resolve volume locations, and
//! to storage nodes to upload, download and delete file bytes.
//!
//! # Endpoints
//! - `GET /dir/assign` - Reserve file ids (master)
//! - `GET /dir/lookup` - Resolve a volume id to storage nodes (master)
//! - `GET /dir/status` - Master status (master)
//! - `POST /<fid>` - Upload a file (storage node)
//! - `GET /<fid>` - Download a file (storage node)
//! - `DELETE /<fid>` - Delete a file (storage node)
//! - `GET /status` - Storage node status (storage node)

pub mod paths;
mod stream;

pub use stream::FileStream;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Body, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use crate::cache::LookupCache;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::models::{
    AssignOutcome, AssignParams, Assignation, FileHandle, InBandError, Location, LookupOutcome,
    MasterStatus, Payload, VolumeStatus, WriteOutcome,
};
use paths::{file_url, sanitize_file_name, volume_status_url};

/// Content type of the uploaded multipart part
const OCTET_STREAM: &str = "application/octet-stream";

// == Client ==
/// Client for a master and its storage nodes.
///
/// Holds nothing but the master address, the HTTP transport and an optional
/// lookup cache, so clones are cheap and share the connection pool.
#[derive(Clone, Debug)]
pub struct WeedClient {
    master_url: String,
    http: reqwest::Client,
    cache: Option<Arc<dyn LookupCache>>,
}

impl WeedClient {
    // == Constructor ==
    /// Creates a client.
    ///
    /// # Arguments
    /// * `master_url` - Base address of the master, e.g. `http://localhost:9333`
    /// * `http` - Transport shared by all requests
    /// * `cache` - Optional cache consulted before master lookups
    pub fn new(
        master_url: impl Into<String>,
        http: reqwest::Client,
        cache: Option<Arc<dyn LookupCache>>,
    ) -> Self {
        let master_url = master_url.into().trim_end_matches('/').to_string();
        Self {
            master_url,
            http,
            cache,
        }
    }

    /// Creates a client from configuration, building its transport and cache.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self::new(config.master_url.clone(), http, config.build_cache()))
    }

    pub fn master_url(&self) -> &str {
        &self.master_url
    }

    pub fn cache(&self) -> Option<&Arc<dyn LookupCache>> {
        self.cache.as_ref()
    }

    fn master_endpoint(&self, path: &str) -> String {
        format!("{}{}", self.master_url, path)
    }

    // == Assign ==
    /// Reserves file ids on the master.
    ///
    /// Fails with [`ClientError::Assignment`] when the master answers with an
    /// in-band error or without a fid.
    pub async fn assign(&self, params: &AssignParams) -> Result<Assignation> {
        let url = self.master_endpoint("/dir/assign");
        debug!(%url, ?params, "Requesting file id assignment");

        let response = self
            .http
            .get(&url)
            .query(&params.query_pairs())
            .send()
            .await?;
        let outcome: AssignOutcome = decode_body(response).await?;

        if let Some(message) = outcome.in_band_error() {
            warn!(error = message, "Master refused assignment");
        }
        Assignation::try_from(outcome)
    }

    // == Lookup ==
    /// Storage nodes currently hosting a volume.
    ///
    /// Served from the cache when it has the volume. Otherwise the master is
    /// asked, and a non-empty answer is cached before it is returned. Failed
    /// lookups never touch the cache.
    pub async fn lookup(&self, volume_id: u64) -> Result<Vec<Location>> {
        if let Some(cache) = &self.cache {
            if let Some(locations) = cache.lookup(volume_id) {
                debug!(volume_id, "Volume locations served from cache");
                return Ok(locations);
            }
        }

        let url = self.master_endpoint("/dir/lookup");
        debug!(%url, volume_id, "Looking up volume locations");

        let response = self
            .http
            .get(&url)
            .query(&[("volumeId", volume_id)])
            .send()
            .await?;
        let outcome: LookupOutcome = decode_body(response).await?;

        if let Some(message) = outcome.in_band_error() {
            warn!(volume_id, error = message, "Master refused lookup");
            return Err(ClientError::Lookup(message.to_string()));
        }

        let locations = outcome.into_locations();
        if let Some(cache) = &self.cache {
            if !locations.is_empty() {
                cache.set_location(volume_id, &locations);
            }
        }

        Ok(locations)
    }

    /// Storage nodes hosting the volume a file belongs to.
    pub async fn lookup_file(&self, file: &FileHandle) -> Result<Vec<Location>> {
        self.lookup(file.volume_id()?).await
    }

    // == Write ==
    /// Uploads content for `file` to a storage node, returning the size the
    /// node reports.
    ///
    /// For a [`Payload::File`] without an explicit `file_name` the path's file
    /// name is announced. Empty files are rejected before any request is sent.
    pub async fn write(
        &self,
        file: &FileHandle,
        location: &Location,
        payload: Payload,
        file_name: Option<&str>,
    ) -> Result<u64> {
        let part = match payload {
            Payload::File(path) => {
                let handle = tokio::fs::File::open(&path).await?;
                // Length comes from the open handle so it matches what gets streamed.
                let length = handle.metadata().await?.len();
                if length == 0 {
                    return Err(ClientError::Write(
                        "cannot write a zero-length file".to_string(),
                    ));
                }

                let name = file_name.map(str::to_owned).or_else(|| {
                    path.file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                });
                Part::stream_with_length(Body::wrap_stream(ReaderStream::new(handle)), length)
                    .file_name(sanitize_file_name(name.as_deref()))
            }
            Payload::Bytes(data) => Part::bytes(data).file_name(sanitize_file_name(file_name)),
            Payload::Reader(reader) => Part::stream(Body::wrap_stream(ReaderStream::new(reader)))
                .file_name(sanitize_file_name(file_name)),
        };
        let form = Form::new().part("file", part.mime_str(OCTET_STREAM)?);

        let url = file_url(location, file);
        debug!(%url, "Uploading file");

        let response = self.http.post(&url).multipart(form).send().await?;
        let outcome: WriteOutcome = decode_body(response).await?;

        if let Some(message) = outcome.in_band_error() {
            warn!(%url, error = message, "Storage node refused upload");
            return Err(ClientError::Write(message.to_string()));
        }

        Ok(outcome.size)
    }

    // == Read ==
    /// Opens the content of `file` on a storage node.
    ///
    /// A 404 yields [`ClientError::NotFound`], any other non-200 status
    /// [`ClientError::Read`]. On success the body is handed over unread.
    pub async fn read(&self, file: &FileHandle, location: &Location) -> Result<FileStream> {
        let url = file_url(location, file);
        debug!(%url, "Reading file");

        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound {
                file: file.clone(),
                location: location.clone(),
            });
        }

        if status != StatusCode::OK {
            warn!(%url, status = status.as_u16(), "Unexpected status reading file");
            return Err(ClientError::Read {
                fid: file.storage_path(),
                address: location.public_url().to_string(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        Ok(FileStream::new(response))
    }

    // == Delete ==
    /// Deletes `file` from a storage node. Any 2xx status is success.
    pub async fn delete(&self, file: &FileHandle, location: &Location) -> Result<()> {
        let url = file_url(location, file);
        debug!(%url, "Deleting file");

        let response = self.http.delete(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = format!(
                "error deleting file {} on {}: {} {}",
                file.storage_path(),
                location.public_url(),
                status.as_u16(),
                status.canonical_reason().unwrap_or_default()
            );
            warn!(%url, status = status.as_u16(), "Storage node refused delete");
            // A body that cannot be read must not hide the status.
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Delete { message, body });
        }

        Ok(())
    }

    // == Status ==
    /// Status document of the master.
    ///
    /// Unlike the other operations, a non-200 answer is reported as a plain
    /// [`ClientError::Io`] rather than a typed status error.
    pub async fn master_status(&self) -> Result<MasterStatus> {
        let url = self.master_endpoint("/dir/status");
        self.fetch_status(&url).await
    }

    /// Status document of a storage node.
    ///
    /// Like [`WeedClient::master_status`], a non-200 answer is reported as a
    /// plain [`ClientError::Io`].
    pub async fn volume_status(&self, location: &Location) -> Result<VolumeStatus> {
        let url = volume_status_url(location);
        self.fetch_status(&url).await
    }

    async fn fetch_status<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(%url, "Fetching status");

        let response = self.http.get(url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(io::Error::other(format!(
                "non-200 status {} received from status url {}",
                response.status().as_u16(),
                url
            ))
            .into());
        }

        decode_body(response).await
    }
}

// == Decoding ==
/// Reads the whole body and decodes it, keeping the raw text on failure.
async fn decode_body<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|source| ClientError::Parse { body, source })
}
