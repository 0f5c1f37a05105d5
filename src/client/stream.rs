//! Streaming body of a file read

use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::{ClientError, Result};

// == File Stream ==
/// Live body of a successful read.
///
/// Nothing is buffered up front: bytes arrive as the caller pulls them.
/// The connection stays checked out until the body is fully consumed or the
/// stream is dropped.
#[derive(Debug)]
pub struct FileStream {
    response: reqwest::Response,
}

impl FileStream {
    pub(crate) fn new(response: reqwest::Response) -> Self {
        Self { response }
    }

    /// Length announced by the storage node, if any.
    pub fn content_length(&self) -> Option<u64> {
        self.response.content_length()
    }

    /// Content type announced by the storage node, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    /// Next chunk of the body, or `None` once it is exhausted.
    pub async fn chunk(&mut self) -> Result<Option<Bytes>> {
        Ok(self.response.chunk().await?)
    }

    /// Reads the remaining body into memory.
    pub async fn bytes(self) -> Result<Bytes> {
        Ok(self.response.bytes().await?)
    }

    /// Copies the remaining body into `writer`, returning the byte count.
    pub async fn copy_to<W>(mut self, writer: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin,
    {
        let mut copied = 0u64;
        while let Some(chunk) = self.chunk().await? {
            writer.write_all(&chunk).await?;
            copied += chunk.len() as u64;
        }
        writer.flush().await?;
        Ok(copied)
    }

    /// Turns the body into a stream of chunks.
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes>> {
        self.response.bytes_stream().map_err(ClientError::from)
    }
}
