//! Request-side types: assignment parameters and upload payloads

use std::fmt;
use std::path::PathBuf;

use tokio::io::AsyncRead;

// == Replication Strategy ==
/// Replica placement requested for newly assigned files.
///
/// The wire value is the store's three digit code: copies in other data
/// centers, on other racks, and on other servers of the same rack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplicationStrategy {
    /// No replication (`000`)
    None,
    /// One copy on another server of the same rack (`001`)
    OnceOnSameRack,
    /// One copy on another rack (`010`)
    OnceOnDifferentRack,
    /// One copy in another data center (`100`)
    OnceOnDifferentDataCenter,
    /// Two copies in other data centers (`200`)
    TwiceOnDifferentDataCenter,
    /// One copy on another rack and one in another data center (`110`)
    OnceOnDifferentRackAndOnceOnDifferentDataCenter,
}

impl ReplicationStrategy {
    /// Value sent as the `replication` query parameter.
    pub fn as_param(&self) -> &'static str {
        match self {
            ReplicationStrategy::None => "000",
            ReplicationStrategy::OnceOnSameRack => "001",
            ReplicationStrategy::OnceOnDifferentRack => "010",
            ReplicationStrategy::OnceOnDifferentDataCenter => "100",
            ReplicationStrategy::TwiceOnDifferentDataCenter => "200",
            ReplicationStrategy::OnceOnDifferentRackAndOnceOnDifferentDataCenter => "110",
        }
    }
}

// == Assign Params ==
/// Parameters of a file id assignment.
///
/// Defaults to a single id, no replication preference and no collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignParams {
    /// Number of ids to reserve
    pub count: u32,
    /// Replica placement, if the caller cares
    pub replication: Option<ReplicationStrategy>,
    /// Collection to assign into
    pub collection: Option<String>,
}

impl Default for AssignParams {
    fn default() -> Self {
        Self {
            count: 1,
            replication: None,
            collection: None,
        }
    }
}

impl AssignParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn with_replication(mut self, replication: ReplicationStrategy) -> Self {
        self.replication = Some(replication);
        self
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    // == Query Pairs ==
    /// Query parameters for `/dir/assign`.
    ///
    /// Each parameter is only present when it differs from the master's
    /// default, so a default `AssignParams` yields no query string at all.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        if self.count > 1 {
            pairs.push(("count", self.count.to_string()));
        }

        if let Some(replication) = self.replication {
            pairs.push(("replication", replication.as_param().to_string()));
        }

        if let Some(collection) = &self.collection {
            pairs.push(("collection", collection.clone()));
        }

        pairs
    }
}

// == Payload ==
/// Content of an upload. Exactly one source per write.
pub enum Payload {
    /// File on the local disk, streamed from its current contents
    File(PathBuf),
    /// In-memory buffer
    Bytes(Vec<u8>),
    /// Any async byte stream, read until EOF
    Reader(Box<dyn AsyncRead + Send + Unpin>),
}

impl Payload {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Payload::File(path.into())
    }

    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        Payload::Bytes(data.into())
    }

    pub fn reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        Payload::Reader(Box::new(reader))
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::File(path) => f.debug_tuple("File").field(path).finish(),
            Payload::Bytes(data) => f.debug_tuple("Bytes").field(&data.len()).finish(),
            Payload::Reader(_) => f.write_str("Reader(..)"),
        }
    }
}
